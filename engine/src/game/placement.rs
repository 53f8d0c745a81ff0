use crate::error::{GameError, PlacementTarget};
use super::obstacles::ObstacleField;
use super::rng::SessionRng;
use super::snake::Snake;
use super::types::{Cell, GridSize};

/// Which occupied cells a placement must avoid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Exclusions {
    pub snake: bool,
    pub obstacles: bool,
    pub powerup: bool,
    pub food: bool,
}

/// Borrowed view of everything currently on the grid.
pub struct Occupancy<'a> {
    pub snake: &'a Snake,
    pub obstacles: &'a ObstacleField,
    pub powerup: Option<Cell>,
    pub food: Option<Cell>,
}

impl Occupancy<'_> {
    pub fn is_occupied(&self, cell: Cell, exclusions: Exclusions) -> bool {
        (exclusions.obstacles && self.obstacles.contains(cell))
            || (exclusions.snake && self.snake.contains(cell))
            || (exclusions.powerup && self.powerup == Some(cell))
            || (exclusions.food && self.food == Some(cell))
    }
}

/// Rejection sampler over the grid with a bounded attempt budget.
#[derive(Clone, Copy, Debug)]
pub struct RandomPlacer {
    grid: GridSize,
}

impl RandomPlacer {
    pub const FOOD_ATTEMPTS_PER_CELL: usize = 3;
    pub const POWERUP_ATTEMPTS_PER_CELL: usize = 2;
    pub const OBSTACLE_ATTEMPTS_PER_CELL: usize = 1;

    pub fn new(grid: GridSize) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn attempt_budget(&self, target: PlacementTarget) -> usize {
        let per_cell = match target {
            PlacementTarget::Food => Self::FOOD_ATTEMPTS_PER_CELL,
            PlacementTarget::Powerup => Self::POWERUP_ATTEMPTS_PER_CELL,
            PlacementTarget::Obstacle => Self::OBSTACLE_ATTEMPTS_PER_CELL,
        };
        self.grid.cell_count() * per_cell
    }

    pub fn place(
        &self,
        target: PlacementTarget,
        occupancy: &Occupancy<'_>,
        exclusions: Exclusions,
        rng: &mut SessionRng,
    ) -> Result<Cell, GameError> {
        self.place_where(target, rng, |cell| !occupancy.is_occupied(cell, exclusions))
    }

    pub fn place_where(
        &self,
        target: PlacementTarget,
        rng: &mut SessionRng,
        is_valid: impl Fn(Cell) -> bool,
    ) -> Result<Cell, GameError> {
        let attempts = self.attempt_budget(target);
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(GameError::PlacementFailed { target, attempts: 0 });
        }

        for _ in 0..attempts {
            let cell = Cell::new(
                rng.random_range(0..self.grid.width) as i32,
                rng.random_range(0..self.grid.height) as i32,
            );
            if is_valid(cell) {
                return Ok(cell);
            }
        }

        Err(GameError::PlacementFailed { target, attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Direction;

    #[test]
    fn test_place_avoids_requested_cells() {
        let grid = GridSize::new(4, 1);
        let placer = RandomPlacer::new(grid);
        let snake = Snake::new(Cell::new(1, 0), Direction::Right, 2, 1);
        let obstacles = ObstacleField::from_cells([Cell::new(2, 0)]);
        let occupancy = Occupancy {
            snake: &snake,
            obstacles: &obstacles,
            powerup: None,
            food: None,
        };
        let exclusions = Exclusions { snake: true, obstacles: true, ..Exclusions::default() };

        let mut rng = SessionRng::new(42);
        for _ in 0..50 {
            let cell = placer.place(PlacementTarget::Food, &occupancy, exclusions, &mut rng).unwrap();
            assert_eq!(cell, Cell::new(3, 0));
        }
    }

    #[test]
    fn test_full_grid_fails_after_budget() {
        let grid = GridSize::new(3, 1);
        let placer = RandomPlacer::new(grid);
        let snake = Snake::new(Cell::new(2, 0), Direction::Right, 3, 1);
        let obstacles = ObstacleField::default();
        let occupancy = Occupancy {
            snake: &snake,
            obstacles: &obstacles,
            powerup: None,
            food: None,
        };
        let exclusions = Exclusions { snake: true, ..Exclusions::default() };

        let mut rng = SessionRng::new(42);
        let result = placer.place(PlacementTarget::Food, &occupancy, exclusions, &mut rng);
        assert_eq!(
            result,
            Err(GameError::PlacementFailed { target: PlacementTarget::Food, attempts: 9 })
        );
    }

    #[test]
    fn test_disabled_exclusion_allows_overlap() {
        let snake = Snake::new(Cell::new(0, 0), Direction::Right, 1, 1);
        let obstacles = ObstacleField::from_cells([Cell::new(1, 0)]);
        let occupancy = Occupancy {
            snake: &snake,
            obstacles: &obstacles,
            powerup: Some(Cell::new(2, 0)),
            food: Some(Cell::new(3, 0)),
        };

        let only_snake = Exclusions { snake: true, ..Exclusions::default() };
        assert!(occupancy.is_occupied(Cell::new(0, 0), only_snake));
        assert!(!occupancy.is_occupied(Cell::new(1, 0), only_snake));
        assert!(!occupancy.is_occupied(Cell::new(2, 0), only_snake));

        let all = Exclusions { snake: true, obstacles: true, powerup: true, food: true };
        assert!(occupancy.is_occupied(Cell::new(1, 0), all));
        assert!(occupancy.is_occupied(Cell::new(2, 0), all));
        assert!(occupancy.is_occupied(Cell::new(3, 0), all));
    }
}
