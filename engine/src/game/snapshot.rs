use super::food::FoodShape;
use super::powerup::MultiplierState;
use super::session::Lifecycle;
use super::types::{Cell, Direction, GridSize};
use crate::GameError;

/// Head expression hint for renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expression {
    Normal,
    Happy,
    Hurt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpecialFoodView {
    pub type_index: usize,
    pub name: String,
    pub shape: FoodShape,
    /// `1.0` right after spawning, `0.0` at expiry.
    pub remaining_fraction: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FoodView {
    pub cell: Cell,
    pub special: Option<SpecialFoodView>,
}

/// Read-only copy of everything a collaborator may draw or persist after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub lifecycle: Lifecycle,
    pub tick: u64,
    pub elapsed_ms: u64,
    pub grid: GridSize,
    /// Head first.
    pub snake: Vec<Cell>,
    pub direction: Direction,
    pub food: Option<FoodView>,
    pub powerup: Option<Cell>,
    /// Row-major order.
    pub obstacles: Vec<Cell>,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub multiplier: MultiplierState,
    pub stage_index: usize,
    pub stage_name: String,
    pub expression: Expression,
    pub shake_intensity: u32,
    pub game_speed_ms: u64,
    pub game_over: bool,
    pub error: Option<GameError>,
}

impl SessionSnapshot {
    pub fn head(&self) -> Option<Cell> {
        self.snake.first().copied()
    }

    pub fn snake_length(&self) -> usize {
        self.snake.len()
    }
}
