use serde::{Deserialize, Serialize};

use crate::GameError;
use crate::error::PlacementTarget;
use super::placement::{Exclusions, Occupancy, RandomPlacer};
use super::rng::SessionRng;
use super::types::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Adds `value` milliseconds to the tick interval; positive values slow the game down.
    Speed,
    /// Adds `value` points, not scaled by the multiplier.
    Score,
    /// Removes up to `value` tail segments.
    Shrink,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodEffect {
    pub kind: EffectKind,
    pub value: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodShape {
    Circle,
    Star,
    Diamond,
    Triangle,
    Heart,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecialFoodType {
    pub name: String,
    pub shape: FoodShape,
    pub duration_ms: u64,
    pub effect: FoodEffect,
    pub spawn_weight: u32,
}

impl SpecialFoodType {
    pub fn default_catalog() -> Vec<SpecialFoodType> {
        vec![
            SpecialFoodType {
                name: "Golden Apple".to_string(),
                shape: FoodShape::Star,
                duration_ms: 6000,
                effect: FoodEffect { kind: EffectKind::Score, value: 50 },
                spawn_weight: 4,
            },
            SpecialFoodType {
                name: "Frost Berry".to_string(),
                shape: FoodShape::Diamond,
                duration_ms: 5000,
                effect: FoodEffect { kind: EffectKind::Speed, value: 30 },
                spawn_weight: 3,
            },
            SpecialFoodType {
                name: "Shrink Mushroom".to_string(),
                shape: FoodShape::Triangle,
                duration_ms: 5000,
                effect: FoodEffect { kind: EffectKind::Shrink, value: 3 },
                spawn_weight: 2,
            },
            SpecialFoodType {
                name: "Chili Pepper".to_string(),
                shape: FoodShape::Heart,
                duration_ms: 4000,
                effect: FoodEffect { kind: EffectKind::Speed, value: -20 },
                spawn_weight: 1,
            },
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Normal,
    /// Index into the session's special food catalog.
    Special(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Food {
    pub cell: Cell,
    pub kind: FoodKind,
    pub spawn_time_ms: u64,
    /// Zero for normal food, which never expires.
    pub duration_ms: u64,
}

impl Food {
    pub fn normal(cell: Cell, spawn_time_ms: u64) -> Self {
        Self {
            cell,
            kind: FoodKind::Normal,
            spawn_time_ms,
            duration_ms: 0,
        }
    }

    pub fn special(cell: Cell, type_index: usize, spawn_time_ms: u64, duration_ms: u64) -> Self {
        Self {
            cell,
            kind: FoodKind::Special(type_index),
            spawn_time_ms,
            duration_ms,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, FoodKind::Special(_))
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.is_special() && now_ms.saturating_sub(self.spawn_time_ms) > self.duration_ms
    }

    /// Share of the lifetime left, `1.0` for normal food.
    pub fn remaining_fraction(&self, now_ms: u64) -> f32 {
        if !self.is_special() || self.duration_ms == 0 {
            return 1.0;
        }
        let age = now_ms.saturating_sub(self.spawn_time_ms) as f32;
        (1.0 - age / self.duration_ms as f32).clamp(0.0, 1.0)
    }
}

pub struct FoodSpawner {
    special_chance: f64,
    catalog: Vec<SpecialFoodType>,
    weights: Vec<u32>,
}

impl FoodSpawner {
    pub fn new(special_chance: f64, catalog: Vec<SpecialFoodType>) -> Self {
        let weights = catalog.iter().map(|t| t.spawn_weight).collect();
        Self {
            special_chance,
            catalog,
            weights,
        }
    }

    pub fn catalog(&self) -> &[SpecialFoodType] {
        &self.catalog
    }

    pub fn special_type(&self, index: usize) -> Option<&SpecialFoodType> {
        self.catalog.get(index)
    }

    pub fn choose_kind(&self, rng: &mut SessionRng) -> FoodKind {
        if !rng.chance(self.special_chance) {
            return FoodKind::Normal;
        }
        match rng.pick_weighted(&self.weights) {
            Some(index) => FoodKind::Special(index),
            None => FoodKind::Normal,
        }
    }

    /// Picks the food kind first, then a free cell off the snake, obstacles and powerup.
    pub fn spawn(
        &self,
        placer: &RandomPlacer,
        occupancy: &Occupancy<'_>,
        obstacles_enabled: bool,
        now_ms: u64,
        rng: &mut SessionRng,
    ) -> Result<Food, GameError> {
        let kind = self.choose_kind(rng);
        let exclusions = Exclusions {
            snake: true,
            obstacles: obstacles_enabled,
            powerup: true,
            food: false,
        };
        let cell = placer.place(PlacementTarget::Food, occupancy, exclusions, rng)?;

        Ok(match kind {
            FoodKind::Normal => Food::normal(cell, now_ms),
            FoodKind::Special(index) => {
                let duration_ms = self.catalog[index].duration_ms;
                Food::special(cell, index, now_ms, duration_ms)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::obstacles::ObstacleField;
    use crate::game::snake::Snake;
    use crate::game::types::{Direction, GridSize};

    #[test]
    fn test_special_food_expiry_is_strict() {
        let food = Food::special(Cell::new(1, 1), 0, 1000, 500);
        assert!(!food.is_expired(1000));
        assert!(!food.is_expired(1500));
        assert!(food.is_expired(1501));
        assert!((food.remaining_fraction(1250) - 0.5).abs() < f32::EPSILON);
        assert_eq!(food.remaining_fraction(9000), 0.0);
    }

    #[test]
    fn test_normal_food_never_expires() {
        let food = Food::normal(Cell::new(1, 1), 0);
        assert!(!food.is_expired(u64::MAX));
        assert_eq!(food.remaining_fraction(u64::MAX), 1.0);
    }

    #[test]
    fn test_choose_kind_honours_chance() {
        let mut rng = SessionRng::new(42);
        let never = FoodSpawner::new(0.0, SpecialFoodType::default_catalog());
        let always = FoodSpawner::new(1.0, SpecialFoodType::default_catalog());
        for _ in 0..100 {
            assert_eq!(never.choose_kind(&mut rng), FoodKind::Normal);
            assert!(matches!(always.choose_kind(&mut rng), FoodKind::Special(_)));
        }
    }

    #[test]
    fn test_empty_catalog_falls_back_to_normal() {
        let mut rng = SessionRng::new(42);
        let spawner = FoodSpawner::new(1.0, Vec::new());
        assert_eq!(spawner.choose_kind(&mut rng), FoodKind::Normal);
    }

    #[test]
    fn test_spawn_avoids_snake_and_powerup() {
        let grid = GridSize::new(5, 1);
        let placer = RandomPlacer::new(grid);
        let snake = Snake::new(Cell::new(2, 0), Direction::Right, 3, 1);
        let obstacles = ObstacleField::default();
        let occupancy = Occupancy {
            snake: &snake,
            obstacles: &obstacles,
            powerup: Some(Cell::new(3, 0)),
            food: None,
        };
        let spawner = FoodSpawner::new(1.0, SpecialFoodType::default_catalog());

        let mut rng = SessionRng::new(3);
        for _ in 0..30 {
            let food = spawner.spawn(&placer, &occupancy, true, 250, &mut rng).unwrap();
            assert_eq!(food.cell, Cell::new(4, 0));
            assert_eq!(food.spawn_time_ms, 250);
            let FoodKind::Special(index) = food.kind else {
                panic!("expected special food");
            };
            assert_eq!(food.duration_ms, spawner.catalog()[index].duration_ms);
        }
    }
}
