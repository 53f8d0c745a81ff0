//! Drives a [`GameSession`] in real time. The clock task owns the session; ticks and commands
//! are serialized through one `select!`, so no two ticks ever overlap and a command never lands
//! in the middle of a tick.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::game::{Direction, GameSession, GameSettings, Lifecycle, SessionRng, TickOutcome};
use crate::{log, log_warn};

#[derive(Clone, Debug, PartialEq)]
pub enum ClockCommand {
    Turn(Direction),
    TurnDelta { dx: i32, dy: i32 },
    Start,
    Pause,
    Resume,
    TogglePause,
    Restart,
    ApplySettings(GameSettings),
    Shutdown,
}

pub trait SessionBroadcaster: Send + Sync + Clone + 'static {
    fn broadcast_outcome(&self, outcome: TickOutcome) -> impl Future<Output = ()> + Send;
}

/// Sending side of the clock's command queue. Cheap to clone; the clock stops once every
/// handle is dropped.
#[derive(Clone)]
pub struct ClockHandle {
    sender: mpsc::UnboundedSender<ClockCommand>,
}

impl ClockHandle {
    /// Returns `false` when the clock has already stopped.
    pub fn send(&self, command: ClockCommand) -> bool {
        self.sender.send(command).is_ok()
    }

    pub fn turn(&self, direction: Direction) -> bool {
        self.send(ClockCommand::Turn(direction))
    }

    pub fn start(&self) -> bool {
        self.send(ClockCommand::Start)
    }

    pub fn toggle_pause(&self) -> bool {
        self.send(ClockCommand::TogglePause)
    }

    pub fn restart(&self) -> bool {
        self.send(ClockCommand::Restart)
    }

    pub fn shutdown(&self) -> bool {
        self.send(ClockCommand::Shutdown)
    }
}

enum Wake {
    Tick,
    Command(ClockCommand),
    Closed,
}

pub struct GameClock {
    session: GameSession,
    rng: SessionRng,
    commands: mpsc::UnboundedReceiver<ClockCommand>,
}

impl GameClock {
    pub fn new(session: GameSession, rng: SessionRng) -> (Self, ClockHandle) {
        let (sender, commands) = mpsc::unbounded_channel();
        (
            Self {
                session,
                rng,
                commands,
            },
            ClockHandle { sender },
        )
    }

    /// Runs until [`ClockCommand::Shutdown`] or until every handle is gone, then hands the
    /// session back. The next tick is due `game_speed_ms` after the previous one finished;
    /// only ticks re-arm the deadline, so commands in between do not delay it.
    pub async fn run(mut self, broadcaster: impl SessionBroadcaster) -> GameSession {
        let mut deadline: Option<Instant> = None;
        broadcaster
            .broadcast_outcome(self.session.take_outcome())
            .await;

        loop {
            let wake = match deadline {
                Some(at) => tokio::select! {
                    _ = sleep_until(at) => Wake::Tick,
                    command = self.commands.recv() => command.map_or(Wake::Closed, Wake::Command),
                },
                None => self
                    .commands
                    .recv()
                    .await
                    .map_or(Wake::Closed, Wake::Command),
            };

            match wake {
                Wake::Tick => {
                    let outcome = self.session.tick(&mut self.rng);
                    deadline = self.next_deadline();
                    broadcaster.broadcast_outcome(outcome).await;
                }
                Wake::Command(ClockCommand::Shutdown) => {
                    log!("Clock shutting down at tick {}", self.session.tick_count());
                    break;
                }
                Wake::Command(command) => {
                    let was_running = self.session.lifecycle() == Lifecycle::Running;
                    let changed = self.apply(command);
                    let running = self.session.lifecycle() == Lifecycle::Running;

                    if !running {
                        deadline = None;
                    } else if !was_running {
                        deadline = self.next_deadline();
                    }

                    let outcome = self.session.take_outcome();
                    if changed || !outcome.events.is_empty() {
                        broadcaster.broadcast_outcome(outcome).await;
                    }
                }
                Wake::Closed => {
                    log!("All clock handles dropped, stopping");
                    break;
                }
            }
        }

        self.session
    }

    fn next_deadline(&self) -> Option<Instant> {
        (self.session.lifecycle() == Lifecycle::Running)
            .then(|| Instant::now() + Duration::from_millis(self.session.game_speed_ms()))
    }

    /// Returns whether the session visibly changed.
    fn apply(&mut self, command: ClockCommand) -> bool {
        match command {
            ClockCommand::Turn(direction) => self.session.request_direction(direction),
            ClockCommand::TurnDelta { dx, dy } => {
                match self.session.request_direction_delta(dx, dy) {
                    Ok(accepted) => accepted,
                    Err(_) => true,
                }
            }
            ClockCommand::Start => self.session.start(),
            ClockCommand::Pause => self.session.pause(),
            ClockCommand::Resume => self.session.resume(),
            ClockCommand::TogglePause => self.session.toggle_pause(),
            ClockCommand::Restart => {
                self.session.restart(&mut self.rng);
                true
            }
            ClockCommand::ApplySettings(settings) => {
                match self.session.apply_settings(settings, &mut self.rng) {
                    Ok(()) => true,
                    Err(e) => {
                        log_warn!("Settings rejected: {}", e);
                        false
                    }
                }
            }
            ClockCommand::Shutdown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Food, SessionLayout};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::time::sleep;

    #[derive(Clone, Default)]
    struct RecordingBroadcaster {
        outcomes: Arc<Mutex<Vec<TickOutcome>>>,
    }

    impl RecordingBroadcaster {
        async fn last_tick(&self) -> u64 {
            self.outcomes
                .lock()
                .await
                .last()
                .map(|o| o.snapshot.tick)
                .unwrap_or_default()
        }
    }

    impl SessionBroadcaster for RecordingBroadcaster {
        async fn broadcast_outcome(&self, outcome: TickOutcome) {
            self.outcomes.lock().await.push(outcome);
        }
    }

    fn session() -> GameSession {
        let settings = GameSettings {
            canvas_width: 300,
            canvas_height: 300,
            enable_obstacles: false,
            powerup_spawn_chance: 0.0,
            special_food_spawn_chance: 0.0,
            ..GameSettings::default()
        };
        let layout = SessionLayout {
            snake: vec![Cell::new(2, 5), Cell::new(1, 5), Cell::new(0, 5)],
            direction: Direction::Right,
            food: Some(Food::normal(Cell::new(0, 9), 0)),
            ..SessionLayout::default()
        };
        GameSession::with_layout(settings, layout, 0).unwrap()
    }

    fn spawn_clock(
        broadcaster: RecordingBroadcaster,
    ) -> (ClockHandle, tokio::task::JoinHandle<GameSession>) {
        let (clock, handle) = GameClock::new(session(), SessionRng::new(42));
        (handle, tokio::spawn(clock.run(broadcaster)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_game_speed() {
        let broadcaster = RecordingBroadcaster::default();
        let (handle, task) = spawn_clock(broadcaster.clone());

        handle.start();
        sleep(Duration::from_millis(3 * 180 + 10)).await;
        assert_eq!(broadcaster.last_tick().await, 3);

        handle.shutdown();
        let session = task.await.unwrap();
        assert_eq!(session.tick_count(), 3);
        assert_eq!(session.snake().head(), Some(Cell::new(5, 5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cancels_pending_tick() {
        let broadcaster = RecordingBroadcaster::default();
        let (handle, task) = spawn_clock(broadcaster.clone());

        handle.start();
        sleep(Duration::from_millis(200)).await;
        handle.toggle_pause();
        handle.send(ClockCommand::Pause);
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(broadcaster.last_tick().await, 1);

        handle.send(ClockCommand::Resume);
        sleep(Duration::from_millis(190)).await;
        assert_eq!(broadcaster.last_tick().await, 2);

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_does_not_delay_next_tick() {
        let broadcaster = RecordingBroadcaster::default();
        let (handle, task) = spawn_clock(broadcaster.clone());

        handle.start();
        sleep(Duration::from_millis(100)).await;
        handle.turn(Direction::Up);
        sleep(Duration::from_millis(90)).await;
        assert_eq!(broadcaster.last_tick().await, 1);

        handle.shutdown();
        let session = task.await.unwrap();
        assert_eq!(session.snake().head(), Some(Cell::new(2, 4)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_stops_ticking() {
        let broadcaster = RecordingBroadcaster::default();
        let (handle, task) = spawn_clock(broadcaster.clone());

        handle.start();
        sleep(Duration::from_millis(200)).await;
        handle.restart();
        sleep(Duration::from_millis(1000)).await;

        handle.shutdown();
        let session = task.await.unwrap();
        assert_eq!(session.lifecycle(), Lifecycle::NotStarted);
        assert_eq!(session.tick_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_turns_end_game_once() {
        let broadcaster = RecordingBroadcaster::default();
        let (handle, task) = spawn_clock(broadcaster.clone());

        handle.start();
        handle.send(ClockCommand::TurnDelta { dx: 1, dy: 1 });
        handle.send(ClockCommand::TurnDelta { dx: 2, dy: 0 });
        sleep(Duration::from_millis(1000)).await;

        handle.shutdown();
        let session = task.await.unwrap();
        assert_eq!(session.lifecycle(), Lifecycle::GameOver);

        let outcomes = broadcaster.outcomes.lock().await;
        let game_overs = outcomes
            .iter()
            .flat_map(|o| o.events.iter())
            .filter(|e| matches!(e, crate::game::GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_stops_when_handles_dropped() {
        let broadcaster = RecordingBroadcaster::default();
        let (handle, task) = spawn_clock(broadcaster.clone());
        drop(handle);

        let session = task.await.unwrap();
        assert_eq!(session.lifecycle(), Lifecycle::NotStarted);
        assert_eq!(broadcaster.outcomes.lock().await.len(), 1);
    }
}
