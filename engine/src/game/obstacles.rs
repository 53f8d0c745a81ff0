use std::collections::HashSet;

use crate::error::PlacementTarget;
use crate::{log, log_warn};
use super::placement::RandomPlacer;
use super::rng::SessionRng;
use super::types::{Cell, GridSize};

/// Rectangle around the spawn point where no obstacle may be generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafeZone {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl SafeZone {
    /// `2 * padding + 3` wide and `2 * padding + 1` tall, with its top-left corner `padding`
    /// cells up and left of `start`. The extra columns sit ahead of a right-heading spawn.
    pub fn around(start: Cell, padding: u32) -> Self {
        let padding = padding as i32;
        Self {
            left: start.x - padding,
            top: start.y - padding,
            width: padding * 2 + 3,
            height: padding * 2 + 1,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.left
            && cell.x < self.left + self.width
            && cell.y >= self.top
            && cell.y < self.top + self.height
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    cells: HashSet<Cell>,
}

impl ObstacleField {
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// Places up to `count` obstacles away from the border padding and the spawn safe zone.
    /// An obstacle that cannot be placed within the attempt budget is skipped, so the field
    /// may come up short.
    pub fn generate(
        count: usize,
        padding: u32,
        grid: GridSize,
        start: Cell,
        rng: &mut SessionRng,
    ) -> Self {
        let placer = RandomPlacer::new(grid);
        let safe_zone = SafeZone::around(start, padding);
        let padding = padding as i32;
        let (width, height) = (grid.width as i32, grid.height as i32);
        let mut cells = HashSet::with_capacity(count);

        for index in 0..count {
            let placed = placer.place_where(PlacementTarget::Obstacle, rng, |cell| {
                let near_edge = cell.x < padding
                    || cell.x >= width - padding
                    || cell.y < padding
                    || cell.y >= height - padding;
                !near_edge && !safe_zone.contains(cell) && !cells.contains(&cell)
            });

            match placed {
                Ok(cell) => {
                    cells.insert(cell);
                }
                Err(e) => log_warn!("Obstacle {} of {} omitted: {}", index + 1, count, e),
            }
        }

        log!("Generated {} of {} obstacles", cells.len(), count);
        Self { cells }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Cells in row-major order, for stable snapshots.
    pub fn sorted_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.cells.iter().copied().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_zone_dimensions() {
        let zone = SafeZone::around(Cell::new(7, 7), 2);
        assert_eq!((zone.left, zone.top), (5, 5));
        assert_eq!(zone.width, 7);
        assert_eq!(zone.height, 5);
        assert!(zone.contains(Cell::new(5, 5)));
        assert!(zone.contains(Cell::new(11, 7)));
        assert!(zone.contains(Cell::new(11, 9)));
        assert!(!zone.contains(Cell::new(4, 7)));
        assert!(!zone.contains(Cell::new(12, 7)));
        assert!(!zone.contains(Cell::new(7, 10)));
        assert!(!zone.contains(Cell::new(7, 4)));
    }

    #[test]
    fn test_generated_obstacles_respect_padding_and_safe_zone() {
        let grid = GridSize::new(15, 15);
        let start = grid.center();
        let zone = SafeZone::around(start, 2);

        for seed in 0..20 {
            let mut rng = SessionRng::new(seed);
            let field = ObstacleField::generate(10, 2, grid, start, &mut rng);
            assert_eq!(field.len(), 10);
            for cell in field.iter() {
                assert!(cell.x >= 2 && cell.x < 13 && cell.y >= 2 && cell.y < 13);
                assert!(!zone.contains(*cell));
            }
            for ahead in 1..=4 {
                assert!(!field.contains(Cell::new(start.x + ahead, start.y)));
            }
        }
    }

    #[test]
    fn test_unplaceable_obstacles_are_omitted() {
        // Padding leaves a 1x1 interior that the safe zone covers entirely.
        let grid = GridSize::new(5, 5);
        let mut rng = SessionRng::new(42);
        let field = ObstacleField::generate(3, 2, grid, grid.center(), &mut rng);
        assert!(field.is_empty());
    }

    #[test]
    fn test_sorted_cells_row_major() {
        let field = ObstacleField::from_cells([Cell::new(3, 1), Cell::new(1, 2), Cell::new(0, 1)]);
        assert_eq!(
            field.sorted_cells(),
            vec![Cell::new(0, 1), Cell::new(3, 1), Cell::new(1, 2)]
        );
    }
}
