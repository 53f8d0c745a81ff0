use crate::config::Validate;
use crate::{GameError, log, log_error, log_warn};
use super::events::{GameEvent, GameOverReason};
use super::food::{EffectKind, Food, FoodKind, FoodSpawner};
use super::obstacles::ObstacleField;
use super::placement::{Occupancy, RandomPlacer};
use super::powerup::{MultiplierState, Powerup, PowerupSpawner};
use super::rng::SessionRng;
use super::score::ScoreBoard;
use super::settings::GameSettings;
use super::snake::Snake;
use super::snapshot::{Expression, FoodView, SessionSnapshot, SpecialFoodView};
use super::stage::{StageChange, StageTracker};
use super::timed::ExpiringState;
use super::types::{Cell, Direction, GridSize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// What one tick (or a flushed lifecycle command) produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    pub snapshot: SessionSnapshot,
    pub events: Vec<GameEvent>,
}

/// Explicit starting positions, used instead of the random layout.
#[derive(Clone, Debug, Default)]
pub struct SessionLayout {
    /// Head first.
    pub snake: Vec<Cell>,
    pub direction: Direction,
    pub food: Option<Food>,
    pub obstacles: Vec<Cell>,
    pub powerup: Option<Cell>,
}

/// One game from spawn to game over. Owns every entity on the grid; the clock and the
/// collaborators only talk to it through commands, [`GameSession::tick`] and snapshots.
pub struct GameSession {
    settings: GameSettings,
    grid: GridSize,
    placer: RandomPlacer,
    food_spawner: FoodSpawner,
    powerup_spawner: PowerupSpawner,

    lifecycle: Lifecycle,
    snake: Snake,
    obstacles: ObstacleField,
    food: Option<Food>,
    powerup: Option<Powerup>,
    multiplier: MultiplierState,
    score: ScoreBoard,
    stage: StageTracker,
    game_speed_ms: u64,

    tick: u64,
    elapsed_ms: u64,
    turned_since_tick: bool,
    expression: ExpiringState<Expression>,
    shake: ExpiringState<u32>,

    error: Option<GameError>,
    pending_events: Vec<GameEvent>,
}

impl GameSession {
    /// Random layout: the snake spawns in the grid centre heading right, obstacles are generated
    /// around it and the first food is placed.
    pub fn new(
        settings: GameSettings,
        high_score: u32,
        rng: &mut SessionRng,
    ) -> Result<Self, GameError> {
        settings.validate().map_err(GameError::ConfigurationInvalid)?;
        let mut session = Self::spawn(settings, ScoreBoard::new(high_score));
        session.populate(rng);
        Ok(session)
    }

    pub fn with_layout(
        settings: GameSettings,
        layout: SessionLayout,
        high_score: u32,
    ) -> Result<Self, GameError> {
        settings.validate().map_err(GameError::ConfigurationInvalid)?;
        let grid = settings.grid_size();

        if layout.snake.len() < settings.min_snake_length {
            return Err(GameError::InvalidState(format!(
                "layout snake has {} cells, minimum is {}",
                layout.snake.len(),
                settings.min_snake_length
            )));
        }
        let outside = layout
            .snake
            .iter()
            .chain(layout.obstacles.iter())
            .chain(layout.food.as_ref().map(|f| &f.cell))
            .chain(layout.powerup.as_ref())
            .find(|cell| !grid.contains(**cell));
        if let Some(cell) = outside {
            return Err(GameError::InvalidState(format!(
                "layout cell ({}, {}) is outside the {}x{} grid",
                cell.x, cell.y, grid.width, grid.height
            )));
        }

        let mut session = Self::spawn(settings, ScoreBoard::new(high_score));
        session.snake = Snake::from_cells(layout.snake, layout.direction, session.settings.min_snake_length);
        session.obstacles = ObstacleField::from_cells(layout.obstacles);
        session.food = layout.food;
        session.powerup = layout.powerup.map(|cell| Powerup { cell, spawn_time_ms: 0 });
        session.stage = StageTracker::new(session.snake.len(), &session.settings.stages);
        Ok(session)
    }

    /// Entities in their spawn state, before obstacles and food are placed.
    fn spawn(settings: GameSettings, mut score: ScoreBoard) -> Self {
        let grid = settings.grid_size();
        let snake = Snake::new(
            grid.center(),
            Direction::Right,
            settings.initial_snake_length,
            settings.min_snake_length,
        );
        score.reset();

        Self {
            grid,
            placer: RandomPlacer::new(grid),
            food_spawner: FoodSpawner::new(
                settings.special_food_spawn_chance,
                settings.special_foods.clone(),
            ),
            powerup_spawner: PowerupSpawner::new(
                settings.powerup_spawn_chance,
                settings.powerup_duration_ticks,
            ),
            lifecycle: Lifecycle::NotStarted,
            stage: StageTracker::new(snake.len(), &settings.stages),
            snake,
            obstacles: ObstacleField::default(),
            food: None,
            powerup: None,
            multiplier: MultiplierState::default(),
            score,
            game_speed_ms: settings.initial_game_speed_ms,
            tick: 0,
            elapsed_ms: 0,
            turned_since_tick: false,
            expression: ExpiringState::new(Expression::Normal),
            shake: ExpiringState::new(0),
            error: None,
            pending_events: Vec::new(),
            settings,
        }
    }

    fn populate(&mut self, rng: &mut SessionRng) {
        if self.settings.enable_obstacles {
            let start = self.grid.center();
            let generated = ObstacleField::generate(
                self.settings.obstacle_count,
                self.settings.obstacle_padding,
                self.grid,
                start,
                rng,
            );
            // A long starting snake can reach past a small safe zone.
            self.obstacles =
                ObstacleField::from_cells(generated.iter().copied().filter(|c| !self.snake.contains(*c)));
        }

        let mut events = Vec::new();
        if let Err(err) = self.respawn_food(rng) {
            self.fail(err, &mut events);
        }
        self.pending_events.extend(events);
    }

    /// Rebuilds every entity from the current settings. The high score survives; the session
    /// goes back to `NotStarted`.
    pub fn restart(&mut self, rng: &mut SessionRng) {
        let settings = std::mem::take(&mut self.settings);
        let score = self.score.clone();
        *self = Self::spawn(settings, score);
        self.populate(rng);
        log!("Session restarted, high score {}", self.score.high_score());
    }

    /// Swaps in a new settings snapshot and restarts. Invalid settings leave the session untouched.
    pub fn apply_settings(
        &mut self,
        settings: GameSettings,
        rng: &mut SessionRng,
    ) -> Result<(), GameError> {
        settings.validate().map_err(GameError::ConfigurationInvalid)?;
        self.settings = settings;
        self.restart(rng);
        Ok(())
    }

    /// `NotStarted` or `Paused` to `Running`. Returns whether the state changed.
    pub fn start(&mut self) -> bool {
        match self.lifecycle {
            Lifecycle::NotStarted | Lifecycle::Paused => {
                self.lifecycle = Lifecycle::Running;
                true
            }
            Lifecycle::Running | Lifecycle::GameOver => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Running {
            return false;
        }
        self.lifecycle = Lifecycle::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Paused {
            return false;
        }
        self.lifecycle = Lifecycle::Running;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.lifecycle {
            Lifecycle::Running => self.pause(),
            Lifecycle::Paused => self.resume(),
            Lifecycle::NotStarted | Lifecycle::GameOver => false,
        }
    }

    /// Accepts at most one turn between ticks. Reversals, repeats of the current heading and
    /// turns while not running are ignored.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.lifecycle != Lifecycle::Running || self.turned_since_tick {
            return false;
        }
        let current = self.snake.direction;
        if direction == current || direction.is_opposite(&current) {
            return false;
        }
        self.snake.direction = direction;
        self.turned_since_tick = true;
        true
    }

    /// Raw `(dx, dy)` input. Anything but a unit cardinal step is a broken collaborator and ends
    /// the session.
    pub fn request_direction_delta(&mut self, dx: i32, dy: i32) -> Result<bool, GameError> {
        if self.lifecycle != Lifecycle::Running {
            return Ok(false);
        }
        match Direction::from_delta(dx, dy) {
            Ok(direction) => Ok(self.request_direction(direction)),
            Err(err) => {
                let mut events = Vec::new();
                self.fail(err.clone(), &mut events);
                self.pending_events.extend(events);
                Err(err)
            }
        }
    }

    /// Advances one step when running; otherwise only flushes pending events.
    pub fn tick(&mut self, rng: &mut SessionRng) -> TickOutcome {
        let mut events = std::mem::take(&mut self.pending_events);
        if self.lifecycle == Lifecycle::Running {
            if let Err(err) = self.step(rng, &mut events) {
                self.fail(err, &mut events);
            }
        }
        self.outcome(events)
    }

    /// Snapshot plus whatever events lifecycle commands left behind since the last tick.
    pub fn take_outcome(&mut self) -> TickOutcome {
        let events = std::mem::take(&mut self.pending_events);
        self.outcome(events)
    }

    fn outcome(&self, events: Vec<GameEvent>) -> TickOutcome {
        TickOutcome {
            snapshot: self.snapshot(),
            events,
        }
    }

    fn step(&mut self, rng: &mut SessionRng, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        self.tick += 1;
        self.elapsed_ms += self.game_speed_ms;
        self.turned_since_tick = false;
        self.expression.advance();
        self.shake.advance();

        self.expire_special_food(rng, events)?;

        let direction = self.snake.direction;
        let candidate = self
            .snake
            .advance(direction)
            .ok_or_else(|| GameError::InvalidState("snake has no cells".to_string()))?;

        if !self.grid.contains(candidate) {
            self.hit_wall(events);
            return Ok(());
        }

        if self.settings.enable_obstacles && self.obstacles.contains(candidate) {
            self.game_over(GameOverReason::ObstacleCollision, events);
            return Ok(());
        }

        let grows = self.powerup.is_some_and(|p| p.cell == candidate)
            || self
                .food
                .as_ref()
                .is_some_and(|f| f.cell == candidate && !f.is_special());
        if self.snake.collides_with_body(candidate, !grows) {
            self.game_over(GameOverReason::SelfCollision, events);
            return Ok(());
        }

        self.commit_move(candidate, rng, events)?;

        if let StageChange::Promoted(index) =
            self.stage.recompute(self.snake.len(), &self.settings.stages)
        {
            let name = self.stage_name(index);
            log!("Stage promoted to {}", name);
            events.push(GameEvent::StagePromoted { index, name });
        }

        self.roll_powerup(rng)?;

        if self.multiplier.tick() {
            log!("Score multiplier expired");
        }

        if self.snake.len() < self.snake.min_length() {
            self.game_over(GameOverReason::TooShort, events);
        }
        Ok(())
    }

    fn expire_special_food(
        &mut self,
        rng: &mut SessionRng,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let expired = match &self.food {
            Some(food) => food.is_expired(self.elapsed_ms),
            None => true,
        };
        if !expired {
            return Ok(());
        }
        if let Some(Food { kind: FoodKind::Special(type_index), .. }) = self.food.take() {
            events.push(GameEvent::SpecialFoodExpired { type_index });
        }
        self.respawn_food(rng)
    }

    /// Pops the tail first, then decides between a penalty bounce and game over.
    fn hit_wall(&mut self, events: &mut Vec<GameEvent>) {
        self.snake.pop_tail();
        if self.snake.len() < self.snake.min_length() {
            self.game_over(GameOverReason::WallCollision, events);
            return;
        }

        let penalty = self.settings.wall_hit_penalty;
        self.score.apply_penalty(penalty);
        self.expression.set(Expression::Hurt, self.settings.hurt_expression_ticks);
        self.shake
            .set(self.settings.shake_base_intensity, self.settings.shake_duration_ticks);
        self.stage.recompute(self.snake.len(), &self.settings.stages);
        events.push(GameEvent::WallHit {
            penalty,
            score: self.score.score(),
        });
    }

    fn commit_move(
        &mut self,
        head: Cell,
        rng: &mut SessionRng,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if self.powerup.is_some_and(|p| p.cell == head) {
            self.snake.grow(head);
            self.powerup = None;
            self.multiplier.activate(self.powerup_spawner.duration_ticks());
            log!("Score multiplier active for {} ticks", self.multiplier.remaining_ticks);
            events.push(GameEvent::PowerupCollected { cell: head });
            return Ok(());
        }

        let eaten = match self.food.take() {
            Some(food) if food.cell == head => food,
            other => {
                self.food = other;
                self.snake.move_without_growth(head);
                return Ok(());
            }
        };

        match eaten.kind {
            FoodKind::Normal => {
                self.snake.grow(head);
                let points = self.settings.normal_food_score * self.multiplier.factor();
                self.add_score(points, events);
                events.push(GameEvent::AteFood { cell: head, points });
                self.game_speed_ms = self
                    .game_speed_ms
                    .saturating_sub(self.settings.speed_increment_ms)
                    .max(self.settings.min_game_speed_ms);
            }
            FoodKind::Special(type_index) => {
                self.snake.move_without_growth(head);
                let food_type = self
                    .food_spawner
                    .special_type(type_index)
                    .cloned()
                    .ok_or_else(|| {
                        GameError::InvalidState(format!("unknown special food type {}", type_index))
                    })?;
                self.apply_effect(food_type.effect.kind, food_type.effect.value, events);
                log!("Ate {}", food_type.name);
                events.push(GameEvent::AteSpecialFood {
                    type_index,
                    name: food_type.name,
                    effect: food_type.effect,
                });
            }
        }

        self.expression.set(Expression::Happy, self.settings.happy_expression_ticks);
        self.respawn_food(rng)
    }

    fn apply_effect(&mut self, kind: EffectKind, value: i32, events: &mut Vec<GameEvent>) {
        match kind {
            // Positive values lengthen the delay between ticks.
            EffectKind::Speed => {
                let speed = (self.game_speed_ms as i64 + value as i64).max(0) as u64;
                self.game_speed_ms = speed.max(self.settings.min_game_speed_ms);
            }
            EffectKind::Score => self.add_score(value.max(0) as u32, events),
            EffectKind::Shrink => {
                self.snake.shrink(value.max(0) as usize);
            }
        }
    }

    fn add_score(&mut self, points: u32, events: &mut Vec<GameEvent>) {
        if self.score.add(points) {
            log!("New high score {}", self.score.score());
            events.push(GameEvent::NewHighScore {
                score: self.score.score(),
            });
        }
    }

    fn respawn_food(&mut self, rng: &mut SessionRng) -> Result<(), GameError> {
        self.food = None;
        let occupancy = Occupancy {
            snake: &self.snake,
            obstacles: &self.obstacles,
            powerup: self.powerup.map(|p| p.cell),
            food: None,
        };
        let food = self.food_spawner.spawn(
            &self.placer,
            &occupancy,
            self.settings.enable_obstacles,
            self.elapsed_ms,
            rng,
        )?;
        self.food = Some(food);
        Ok(())
    }

    fn roll_powerup(&mut self, rng: &mut SessionRng) -> Result<(), GameError> {
        let occupancy = Occupancy {
            snake: &self.snake,
            obstacles: &self.obstacles,
            powerup: self.powerup.map(|p| p.cell),
            food: self.food.as_ref().map(|f| f.cell),
        };
        match self.powerup_spawner.maybe_spawn(
            &self.placer,
            &occupancy,
            &self.multiplier,
            self.settings.enable_obstacles,
            self.elapsed_ms,
            rng,
        ) {
            Ok(Some(powerup)) => {
                log!("Powerup spawned at ({}, {})", powerup.cell.x, powerup.cell.y);
                self.powerup = Some(powerup);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) if !err.is_fatal() => {
                log_warn!("Powerup skipped: {}", err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn game_over(&mut self, reason: GameOverReason, events: &mut Vec<GameEvent>) {
        self.lifecycle = Lifecycle::GameOver;
        self.multiplier.clear();
        log!("Game over ({:?}) with score {}", reason, self.score.score());
        events.push(GameEvent::GameOver {
            reason,
            score: self.score.score(),
        });
    }

    fn fail(&mut self, err: GameError, events: &mut Vec<GameEvent>) {
        // An ended session has already reported its outcome.
        if self.lifecycle == Lifecycle::GameOver {
            return;
        }
        log_error!("Session failed: {}", err);
        self.error = Some(err.clone());
        events.push(GameEvent::SessionError(err));
        self.game_over(GameOverReason::Error, events);
    }

    fn stage_name(&self, index: usize) -> String {
        self.settings
            .stages
            .get(index)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let food = self.food.as_ref().map(|food| FoodView {
            cell: food.cell,
            special: match food.kind {
                FoodKind::Normal => None,
                FoodKind::Special(type_index) => {
                    self.food_spawner.special_type(type_index).map(|t| SpecialFoodView {
                        type_index,
                        name: t.name.clone(),
                        shape: t.shape,
                        remaining_fraction: food.remaining_fraction(self.elapsed_ms),
                    })
                }
            },
        });

        SessionSnapshot {
            lifecycle: self.lifecycle,
            tick: self.tick,
            elapsed_ms: self.elapsed_ms,
            grid: self.grid,
            snake: self.snake.cells().copied().collect(),
            direction: self.snake.direction,
            food,
            powerup: self.powerup.map(|p| p.cell),
            obstacles: self.obstacles.sorted_cells(),
            score: self.score.score(),
            high_score: self.score.high_score(),
            new_high_score: self.score.high_score_broken(),
            multiplier: self.multiplier,
            stage_index: self.stage.index(),
            stage_name: self.stage_name(self.stage.index()),
            expression: self.expression.current(),
            shake_intensity: self.shake.current(),
            game_speed_ms: self.game_speed_ms,
            game_over: self.lifecycle == Lifecycle::GameOver,
            error: self.error.clone(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<&Food> {
        self.food.as_ref()
    }

    pub fn powerup(&self) -> Option<Powerup> {
        self.powerup
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    pub fn multiplier(&self) -> MultiplierState {
        self.multiplier
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn high_score(&self) -> u32 {
        self.score.high_score()
    }

    pub fn stage_index(&self) -> usize {
        self.stage.index()
    }

    pub fn game_speed_ms(&self) -> u64 {
        self.game_speed_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn error(&self) -> Option<&GameError> {
        self.error.as_ref()
    }
}
