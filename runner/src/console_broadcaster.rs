use std::sync::Arc;
use tokio::sync::Mutex;

use snake_engine::clock::{ClockHandle, SessionBroadcaster};
use snake_engine::config::{ConfigContentProvider, ConfigManager, FileContentConfigProvider};
use snake_engine::game::{
    GameEvent, HighScoreRecord, Lifecycle, SessionRng, SessionSnapshot, TickOutcome,
};
use snake_engine::{log, log_error, log_warn};

use crate::autopilot::{Autopilot, AutopilotKind};

pub type HighScoreManager<TStore = FileContentConfigProvider> = ConfigManager<TStore, HighScoreRecord>;

#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub games_finished: u32,
    pub best_score: u32,
    pub total_ticks: u64,
    pub saved_high_score: u32,
}

/// Plays the part of every collaborator at once: logs events the way a UI would show them,
/// persists the high score, and steers with the autopilot.
pub struct ConsoleBroadcaster<TStore = FileContentConfigProvider>
where
    TStore: ConfigContentProvider,
{
    handle: ClockHandle,
    autopilot: AutopilotKind,
    rng: Arc<Mutex<SessionRng>>,
    high_scores: Arc<HighScoreManager<TStore>>,
    stats: Arc<Mutex<RunStats>>,
    games: u32,
    max_ticks: u64,
}

impl<TStore: ConfigContentProvider> Clone for ConsoleBroadcaster<TStore> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            autopilot: self.autopilot,
            rng: self.rng.clone(),
            high_scores: self.high_scores.clone(),
            stats: self.stats.clone(),
            games: self.games,
            max_ticks: self.max_ticks,
        }
    }
}

impl<TStore: ConfigContentProvider> ConsoleBroadcaster<TStore> {
    pub fn new(
        handle: ClockHandle,
        autopilot: AutopilotKind,
        rng: SessionRng,
        high_scores: Arc<HighScoreManager<TStore>>,
        saved_high_score: u32,
        games: u32,
        max_ticks: u64,
    ) -> Self {
        Self {
            handle,
            autopilot,
            rng: Arc::new(Mutex::new(rng)),
            high_scores,
            stats: Arc::new(Mutex::new(RunStats {
                saved_high_score,
                ..RunStats::default()
            })),
            games,
            max_ticks,
        }
    }

    pub async fn stats(&self) -> RunStats {
        self.stats.lock().await.clone()
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::AteFood { cell, points } => {
                log!("Ate food at ({}, {}) for {} points", cell.x, cell.y, points)
            }
            GameEvent::AteSpecialFood { name, effect, .. } => {
                log!("Ate {} ({:?} {})", name, effect.kind, effect.value)
            }
            GameEvent::PowerupCollected { .. } => log!("Score multiplier collected"),
            GameEvent::StagePromoted { name, .. } => log!("Stage up: {}", name),
            GameEvent::NewHighScore { score } => log!("New high score: {}", score),
            GameEvent::WallHit { penalty, score } => {
                log!("Wall hit, -{} points (score {})", penalty, score)
            }
            GameEvent::SpecialFoodExpired { type_index } => {
                log!("Special food {} expired", type_index)
            }
            GameEvent::GameOver { reason, score } => {
                log!("Game over: {:?}, final score {}", reason, score)
            }
            GameEvent::SessionError(e) => log_error!("Session error: {}", e),
        }
    }

    async fn persist_high_score(&self, snapshot: &SessionSnapshot) {
        let mut stats = self.stats.lock().await;
        if snapshot.high_score <= stats.saved_high_score {
            return;
        }
        let record = HighScoreRecord {
            high_score: snapshot.high_score,
        };
        match self.high_scores.set_config(&record) {
            Ok(()) => stats.saved_high_score = snapshot.high_score,
            Err(e) => log_warn!("Failed to save high score: {}", e),
        }
    }

    /// Counts a finished game and either queues the next one or stops the clock.
    async fn finish_game(&self, snapshot: &SessionSnapshot) {
        let mut stats = self.stats.lock().await;
        stats.games_finished += 1;
        stats.best_score = stats.best_score.max(snapshot.score);
        stats.total_ticks += snapshot.tick;
        log!(
            "Game {}/{} finished after {} ticks: score {}, length {}, stage {}",
            stats.games_finished,
            self.games,
            snapshot.tick,
            snapshot.score,
            snapshot.snake_length(),
            snapshot.stage_name
        );

        if stats.games_finished >= self.games {
            self.handle.shutdown();
        } else {
            self.handle.restart();
            self.handle.start();
        }
    }
}

impl<TStore> SessionBroadcaster for ConsoleBroadcaster<TStore>
where
    TStore: ConfigContentProvider + Send + Sync + 'static,
{
    async fn broadcast_outcome(&self, outcome: TickOutcome) {
        for event in &outcome.events {
            Self::log_event(event);
        }

        let snapshot = &outcome.snapshot;
        self.persist_high_score(snapshot).await;

        match snapshot.lifecycle {
            Lifecycle::GameOver => self.finish_game(snapshot).await,
            Lifecycle::Running if snapshot.tick >= self.max_ticks => {
                log!("Tick limit {} reached", self.max_ticks);
                self.finish_game(snapshot).await;
            }
            Lifecycle::Running => {
                let mut rng = self.rng.lock().await;
                if let Some(direction) = Autopilot::calculate_move(self.autopilot, snapshot, &mut rng)
                    && direction != snapshot.direction
                {
                    self.handle.turn(direction);
                }
            }
            Lifecycle::NotStarted | Lifecycle::Paused => {}
        }
    }
}
