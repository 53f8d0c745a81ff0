use std::collections::VecDeque;

use super::types::{Cell, Direction};

/// Body cells head-first. Uniqueness of cells is not stored; the tick rejects any move that
/// would overlap the body.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Cell>,
    pub direction: Direction,
    min_length: usize,
}

impl Snake {
    /// Lays out `length` cells trailing behind `head`, opposite to `direction`.
    pub fn new(head: Cell, direction: Direction, length: usize, min_length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length.max(1) as i32)
            .map(|i| Cell::new(head.x - dx * i, head.y - dy * i))
            .collect();

        Self {
            body,
            direction,
            min_length: min_length.max(1),
        }
    }

    pub fn from_cells(cells: Vec<Cell>, direction: Direction, min_length: usize) -> Self {
        Self {
            body: cells.into(),
            direction,
            min_length: min_length.max(1),
        }
    }

    pub fn head(&self) -> Option<Cell> {
        self.body.front().copied()
    }

    pub fn tail(&self) -> Option<Cell> {
        self.body.back().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// The cell the head would enter moving in `direction`; `None` for an empty body.
    pub fn advance(&self, direction: Direction) -> Option<Cell> {
        self.head().map(|head| head.step(direction))
    }

    pub fn grow(&mut self, new_head: Cell) {
        self.body.push_front(new_head);
    }

    pub fn move_without_growth(&mut self, new_head: Cell) {
        self.body.push_front(new_head);
        self.body.pop_back();
    }

    /// Removes up to `n` tail cells without going under the minimum length. Returns how many
    /// were removed.
    pub fn shrink(&mut self, n: usize) -> usize {
        let removable = self.body.len().saturating_sub(self.min_length).min(n);
        for _ in 0..removable {
            self.body.pop_back();
        }
        removable
    }

    /// Unconditional tail removal; the caller checks the minimum afterwards.
    pub fn pop_tail(&mut self) -> Option<Cell> {
        self.body.pop_back()
    }

    pub fn collides_with_self(&self, cell: Cell) -> bool {
        self.body.iter().skip(1).any(|&segment| segment == cell)
    }

    /// Body check for a candidate head. When `tail_vacates` the current tail cell is free
    /// because it is popped in the same step.
    pub fn collides_with_body(&self, cell: Cell, tail_vacates: bool) -> bool {
        let checked = if tail_vacates {
            self.body.len().saturating_sub(1)
        } else {
            self.body.len()
        };
        self.body.iter().take(checked).any(|&segment| segment == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(snake: &Snake) -> Vec<Cell> {
        snake.cells().copied().collect()
    }

    #[test]
    fn test_new_trails_behind_head() {
        let snake = Snake::new(Cell::new(5, 5), Direction::Right, 3, 1);
        assert_eq!(cells(&snake), vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)]);

        let snake = Snake::new(Cell::new(5, 5), Direction::Up, 2, 1);
        assert_eq!(cells(&snake), vec![Cell::new(5, 5), Cell::new(5, 6)]);
    }

    #[test]
    fn test_move_and_grow() {
        let mut snake = Snake::new(Cell::new(5, 5), Direction::Right, 3, 1);
        let next = snake.advance(Direction::Right).unwrap();
        assert_eq!(next, Cell::new(6, 5));

        snake.move_without_growth(next);
        assert_eq!(cells(&snake), vec![Cell::new(6, 5), Cell::new(5, 5), Cell::new(4, 5)]);

        snake.grow(Cell::new(7, 5));
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), Some(Cell::new(4, 5)));
    }

    #[test]
    fn test_shrink_respects_minimum() {
        let mut snake = Snake::new(Cell::new(9, 0), Direction::Right, 5, 2);
        assert_eq!(snake.shrink(2), 2);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.shrink(10), 1);
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.shrink(1), 0);
        assert_eq!(snake.head(), Some(Cell::new(9, 0)));
    }

    #[test]
    fn test_self_collision_ignores_head() {
        let snake = Snake::new(Cell::new(5, 5), Direction::Right, 3, 1);
        assert!(!snake.collides_with_self(Cell::new(5, 5)));
        assert!(snake.collides_with_self(Cell::new(4, 5)));
        assert!(snake.collides_with_self(Cell::new(3, 5)));
    }

    #[test]
    fn test_body_collision_with_vacating_tail() {
        let snake = Snake::from_cells(
            vec![Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 2), Cell::new(2, 1)],
            Direction::Right,
            1,
        );
        assert!(!snake.collides_with_body(Cell::new(2, 1), true));
        assert!(snake.collides_with_body(Cell::new(2, 1), false));
        assert!(snake.collides_with_body(Cell::new(2, 2), true));
    }

    #[test]
    fn test_empty_snake_has_no_head() {
        let mut snake = Snake::new(Cell::new(0, 0), Direction::Right, 1, 1);
        assert!(snake.pop_tail().is_some());
        assert!(snake.is_empty());
        assert_eq!(snake.advance(Direction::Right), None);
    }
}
