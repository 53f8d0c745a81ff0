use crate::GameError;
use crate::error::PlacementTarget;
use super::placement::{Exclusions, Occupancy, RandomPlacer};
use super::rng::SessionRng;
use super::types::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Powerup {
    pub cell: Cell,
    pub spawn_time_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MultiplierState {
    pub active: bool,
    pub remaining_ticks: u32,
}

impl MultiplierState {
    pub const FACTOR: u32 = 2;

    pub fn activate(&mut self, duration_ticks: u32) {
        if self.active {
            return;
        }
        self.active = duration_ticks > 0;
        self.remaining_ticks = duration_ticks;
    }

    /// Counts one tick down. Returns `true` on the tick the multiplier runs out.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            self.active = false;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn factor(&self) -> u32 {
        if self.active { Self::FACTOR } else { 1 }
    }
}

pub struct PowerupSpawner {
    spawn_chance: f64,
    duration_ticks: u32,
}

impl PowerupSpawner {
    pub fn new(spawn_chance: f64, duration_ticks: u32) -> Self {
        Self {
            spawn_chance,
            duration_ticks,
        }
    }

    pub fn duration_ticks(&self) -> u32 {
        self.duration_ticks
    }

    /// Rolls for a new powerup when none is on the grid and no multiplier is running.
    /// `Ok(None)` means the roll failed or there was nothing to do.
    pub fn maybe_spawn(
        &self,
        placer: &RandomPlacer,
        occupancy: &Occupancy<'_>,
        multiplier: &MultiplierState,
        obstacles_enabled: bool,
        now_ms: u64,
        rng: &mut SessionRng,
    ) -> Result<Option<Powerup>, GameError> {
        if occupancy.powerup.is_some() || multiplier.active || !rng.chance(self.spawn_chance) {
            return Ok(None);
        }

        let exclusions = Exclusions {
            snake: true,
            obstacles: obstacles_enabled,
            powerup: false,
            food: true,
        };
        let cell = placer.place(PlacementTarget::Powerup, occupancy, exclusions, rng)?;
        Ok(Some(Powerup {
            cell,
            spawn_time_ms: now_ms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::obstacles::ObstacleField;
    use crate::game::snake::Snake;
    use crate::game::types::{Direction, GridSize};

    #[test]
    fn test_multiplier_counts_down_and_deactivates() {
        let mut multiplier = MultiplierState::default();
        assert_eq!(multiplier.factor(), 1);

        multiplier.activate(3);
        assert_eq!(multiplier.factor(), 2);
        assert!(!multiplier.tick());
        assert!(!multiplier.tick());
        assert!(multiplier.tick());
        assert!(!multiplier.active);
        assert_eq!(multiplier.remaining_ticks, 0);
        assert!(!multiplier.tick());
    }

    #[test]
    fn test_activate_does_not_restart_running_multiplier() {
        let mut multiplier = MultiplierState::default();
        multiplier.activate(10);
        multiplier.tick();
        multiplier.activate(10);
        assert_eq!(multiplier.remaining_ticks, 9);
    }

    #[test]
    fn test_spawn_skipped_while_multiplier_active() {
        let grid = GridSize::new(6, 6);
        let placer = RandomPlacer::new(grid);
        let snake = Snake::new(Cell::new(2, 2), Direction::Right, 2, 1);
        let obstacles = ObstacleField::default();
        let occupancy = Occupancy {
            snake: &snake,
            obstacles: &obstacles,
            powerup: None,
            food: None,
        };
        let spawner = PowerupSpawner::new(1.0, 300);
        let mut multiplier = MultiplierState::default();
        multiplier.activate(5);

        let mut rng = SessionRng::new(42);
        let result = spawner.maybe_spawn(&placer, &occupancy, &multiplier, false, 0, &mut rng);
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_spawn_avoids_food_and_snake() {
        let grid = GridSize::new(4, 1);
        let placer = RandomPlacer::new(grid);
        let snake = Snake::new(Cell::new(1, 0), Direction::Right, 2, 1);
        let obstacles = ObstacleField::default();
        let occupancy = Occupancy {
            snake: &snake,
            obstacles: &obstacles,
            powerup: None,
            food: Some(Cell::new(2, 0)),
        };
        let spawner = PowerupSpawner::new(1.0, 300);
        let multiplier = MultiplierState::default();

        let mut rng = SessionRng::new(42);
        for _ in 0..20 {
            let powerup = spawner
                .maybe_spawn(&placer, &occupancy, &multiplier, true, 90, &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(powerup.cell, Cell::new(3, 0));
            assert_eq!(powerup.spawn_time_ms, 90);
        }
    }
}
