//! The single-player snake engine: grid rules, entity placement, scoring and the session
//! state machine. Nothing in here renders, plays audio or touches storage; collaborators consume
//! [`TickOutcome`] snapshots and events instead.

mod events;
mod food;
mod obstacles;
mod placement;
mod powerup;
mod rng;
mod score;
mod session;
mod settings;
mod snake;
mod snapshot;
mod stage;
mod timed;
mod types;

pub use events::{GameEvent, GameOverReason};
pub use food::{EffectKind, Food, FoodEffect, FoodKind, FoodShape, FoodSpawner, SpecialFoodType};
pub use obstacles::{ObstacleField, SafeZone};
pub use placement::{Exclusions, Occupancy, RandomPlacer};
pub use powerup::{MultiplierState, Powerup, PowerupSpawner};
pub use rng::SessionRng;
pub use score::{HighScoreRecord, ScoreBoard};
pub use session::{GameSession, Lifecycle, SessionLayout, TickOutcome};
pub use settings::GameSettings;
pub use snake::Snake;
pub use snapshot::{Expression, FoodView, SessionSnapshot, SpecialFoodView};
pub use stage::{StageAttributes, StageChange, StageDefinition, StageTracker};
pub use timed::ExpiringState;
pub use types::{Cell, Direction, GridSize};
