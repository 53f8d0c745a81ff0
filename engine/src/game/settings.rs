use serde::{Deserialize, Serialize};

use crate::config::Validate;
use crate::log_warn;
use super::food::{EffectKind, SpecialFoodType};
use super::stage::StageDefinition;
use super::types::GridSize;

/// Configuration snapshot read when a session is created. Every field has a default, so a
/// persisted record missing fields still loads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cell_size: u32,

    pub initial_snake_length: usize,
    pub min_snake_length: usize,

    pub initial_game_speed_ms: u64,
    pub min_game_speed_ms: u64,
    pub speed_increment_ms: u64,

    pub normal_food_score: u32,
    pub wall_hit_penalty: u32,

    pub enable_obstacles: bool,
    pub obstacle_count: usize,
    pub obstacle_padding: u32,

    pub powerup_spawn_chance: f64,
    pub powerup_duration_ticks: u32,
    pub special_food_spawn_chance: f64,

    pub happy_expression_ticks: u32,
    pub hurt_expression_ticks: u32,
    pub shake_base_intensity: u32,
    pub shake_duration_ticks: u32,

    pub stages: Vec<StageDefinition>,
    pub special_foods: Vec<SpecialFoodType>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            canvas_width: 450,
            canvas_height: 450,
            cell_size: 30,
            initial_snake_length: 3,
            min_snake_length: 1,
            initial_game_speed_ms: 180,
            min_game_speed_ms: 60,
            speed_increment_ms: 3,
            normal_food_score: 10,
            wall_hit_penalty: 5,
            enable_obstacles: true,
            obstacle_count: 5,
            obstacle_padding: 2,
            powerup_spawn_chance: 0.05,
            powerup_duration_ticks: 300,
            special_food_spawn_chance: 0.15,
            happy_expression_ticks: 5,
            hurt_expression_ticks: 6,
            shake_base_intensity: 3,
            shake_duration_ticks: 6,
            stages: StageDefinition::default_catalog(),
            special_foods: SpecialFoodType::default_catalog(),
        }
    }
}

const MIN_GRID_DIMENSION: u32 = 5;
const MAX_GRID_DIMENSION: u32 = 200;
const MAX_GAME_SPEED_MS: u64 = 5000;
const MAX_OBSTACLE_COUNT: usize = 500;
const MAX_OBSTACLE_PADDING: u32 = 10;
const MIN_SPECIAL_FOOD_DURATION_MS: u64 = 100;

impl GameSettings {
    pub fn grid_size(&self) -> GridSize {
        if self.cell_size == 0 {
            return GridSize::new(0, 0);
        }
        GridSize::new(self.canvas_width / self.cell_size, self.canvas_height / self.cell_size)
    }

    fn validate_grid(&self) -> Result<(), String> {
        if self.cell_size == 0 {
            return Err("cell_size must be greater than 0".to_string());
        }
        let grid = self.grid_size();
        if grid.width < MIN_GRID_DIMENSION || grid.height < MIN_GRID_DIMENSION {
            return Err(format!(
                "grid must be at least {0}x{0} cells, got {1}x{2}",
                MIN_GRID_DIMENSION, grid.width, grid.height
            ));
        }
        if grid.width > MAX_GRID_DIMENSION || grid.height > MAX_GRID_DIMENSION {
            return Err(format!(
                "grid must not exceed {0}x{0} cells, got {1}x{2}",
                MAX_GRID_DIMENSION, grid.width, grid.height
            ));
        }
        Ok(())
    }

    fn validate_lengths(&self) -> Result<(), String> {
        if self.min_snake_length == 0 {
            return Err("min_snake_length must be at least 1".to_string());
        }
        if self.initial_snake_length < self.min_snake_length {
            return Err("initial_snake_length must not be below min_snake_length".to_string());
        }
        // The starting body trails left from the grid centre.
        let room = (self.grid_size().width / 2 + 1) as usize;
        if self.initial_snake_length > room {
            return Err(format!(
                "initial_snake_length must not exceed {} for this grid",
                room
            ));
        }
        Ok(())
    }

    fn validate_speeds(&self) -> Result<(), String> {
        if self.min_game_speed_ms == 0 {
            return Err("min_game_speed_ms must be greater than 0".to_string());
        }
        if self.initial_game_speed_ms < self.min_game_speed_ms {
            return Err("initial_game_speed_ms must not be below min_game_speed_ms".to_string());
        }
        if self.initial_game_speed_ms > MAX_GAME_SPEED_MS {
            return Err(format!("initial_game_speed_ms must not exceed {}", MAX_GAME_SPEED_MS));
        }
        if self.speed_increment_ms > self.initial_game_speed_ms {
            return Err("speed_increment_ms must not exceed initial_game_speed_ms".to_string());
        }
        Ok(())
    }

    fn validate_obstacles(&self) -> Result<(), String> {
        if self.obstacle_count > MAX_OBSTACLE_COUNT {
            return Err(format!("obstacle_count must not exceed {}", MAX_OBSTACLE_COUNT));
        }
        if self.obstacle_padding > MAX_OBSTACLE_PADDING {
            return Err(format!("obstacle_padding must not exceed {}", MAX_OBSTACLE_PADDING));
        }
        Ok(())
    }

    fn validate_chance(name: &str, value: f64) -> Result<(), String> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(format!("{} must be a number between 0 and 1", name));
        }
        Ok(())
    }

    fn validate_stages(&self) -> Result<(), String> {
        let first = self
            .stages
            .first()
            .ok_or_else(|| "stages must not be empty".to_string())?;
        if first.min_length > self.min_snake_length {
            return Err("the first stage must start at or below min_snake_length".to_string());
        }
        if self.stages.windows(2).any(|w| w[0].min_length >= w[1].min_length) {
            return Err("stage min_length values must be strictly increasing".to_string());
        }
        Ok(())
    }

    fn validate_special_foods(&self) -> Result<(), String> {
        for food in &self.special_foods {
            if food.name.is_empty() {
                return Err("special food names must not be empty".to_string());
            }
            if food.duration_ms < MIN_SPECIAL_FOOD_DURATION_MS {
                return Err(format!(
                    "special food {} must last at least {}ms",
                    food.name, MIN_SPECIAL_FOOD_DURATION_MS
                ));
            }
            let value_ok = match food.effect.kind {
                EffectKind::Speed => u64::from(food.effect.value.unsigned_abs()) <= MAX_GAME_SPEED_MS,
                EffectKind::Score | EffectKind::Shrink => food.effect.value >= 0,
            };
            if !value_ok {
                return Err(format!("special food {} has an out-of-range effect value", food.name));
            }
        }
        Ok(())
    }
}

impl Validate for GameSettings {
    fn validate(&self) -> Result<(), String> {
        self.validate_grid()?;
        self.validate_lengths()?;
        self.validate_speeds()?;
        self.validate_obstacles()?;
        Self::validate_chance("powerup_spawn_chance", self.powerup_spawn_chance)?;
        Self::validate_chance("special_food_spawn_chance", self.special_food_spawn_chance)?;
        if self.powerup_duration_ticks == 0 {
            return Err("powerup_duration_ticks must be greater than 0".to_string());
        }
        self.validate_stages()?;
        self.validate_special_foods()?;
        Ok(())
    }

    /// Replaces each invalid group of fields with its defaults and keeps the rest.
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut settings = self;

        if let Err(e) = settings.validate_grid() {
            log_warn!("Resetting grid settings: {}", e);
            settings.canvas_width = defaults.canvas_width;
            settings.canvas_height = defaults.canvas_height;
            settings.cell_size = defaults.cell_size;
        }
        if let Err(e) = settings.validate_lengths() {
            log_warn!("Resetting snake length settings: {}", e);
            settings.initial_snake_length = defaults.initial_snake_length;
            settings.min_snake_length = defaults.min_snake_length;
        }
        if let Err(e) = settings.validate_speeds() {
            log_warn!("Resetting speed settings: {}", e);
            settings.initial_game_speed_ms = defaults.initial_game_speed_ms;
            settings.min_game_speed_ms = defaults.min_game_speed_ms;
            settings.speed_increment_ms = defaults.speed_increment_ms;
        }
        if let Err(e) = settings.validate_obstacles() {
            log_warn!("Resetting obstacle settings: {}", e);
            settings.obstacle_count = defaults.obstacle_count;
            settings.obstacle_padding = defaults.obstacle_padding;
        }
        if let Err(e) = Self::validate_chance("powerup_spawn_chance", settings.powerup_spawn_chance) {
            log_warn!("Resetting powerup_spawn_chance: {}", e);
            settings.powerup_spawn_chance = defaults.powerup_spawn_chance;
        }
        if let Err(e) =
            Self::validate_chance("special_food_spawn_chance", settings.special_food_spawn_chance)
        {
            log_warn!("Resetting special_food_spawn_chance: {}", e);
            settings.special_food_spawn_chance = defaults.special_food_spawn_chance;
        }
        if settings.powerup_duration_ticks == 0 {
            log_warn!("Resetting powerup_duration_ticks: must be greater than 0");
            settings.powerup_duration_ticks = defaults.powerup_duration_ticks;
        }
        if let Err(e) = settings.validate_stages() {
            log_warn!("Resetting stage catalog: {}", e);
            settings.stages = defaults.stages.clone();
        }
        if let Err(e) = settings.validate_special_foods() {
            log_warn!("Resetting special food catalog: {}", e);
            settings.special_foods = defaults.special_foods.clone();
        }

        if settings.validate().is_err() {
            return defaults;
        }
        settings
    }
}
