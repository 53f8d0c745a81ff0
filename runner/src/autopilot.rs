use clap::ValueEnum;
use snake_engine::game::{Cell, Direction, SessionRng, SessionSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AutopilotKind {
    /// Heads for the closest pickup along safe cells.
    Greedy,
    /// Any safe direction.
    Random,
}

/// Steering for the headless runner. Works only from snapshots, exactly like a human player
/// looking at the screen.
pub struct Autopilot;

impl Autopilot {
    pub fn calculate_move(
        kind: AutopilotKind,
        snapshot: &SessionSnapshot,
        rng: &mut SessionRng,
    ) -> Option<Direction> {
        match kind {
            AutopilotKind::Greedy => Self::greedy_pathfinding(snapshot, rng),
            AutopilotKind::Random => Self::random_valid_move(snapshot, rng),
        }
    }

    fn greedy_pathfinding(snapshot: &SessionSnapshot, rng: &mut SessionRng) -> Option<Direction> {
        let head = snapshot.head()?;
        let Some(target) = Self::find_nearest_target(head, snapshot) else {
            return Self::random_valid_move(snapshot, rng);
        };

        let best = Self::valid_directions(snapshot.direction)
            .into_iter()
            .map(|dir| (dir, head.step(dir)))
            .filter(|(_, next)| Self::is_safe_position(*next, snapshot))
            .min_by_key(|(_, next)| next.manhattan_distance(target))
            .map(|(dir, _)| dir);

        best.or_else(|| Self::random_valid_move(snapshot, rng))
    }

    fn random_valid_move(snapshot: &SessionSnapshot, rng: &mut SessionRng) -> Option<Direction> {
        let head = snapshot.head()?;
        let safe_directions: Vec<Direction> = Self::valid_directions(snapshot.direction)
            .into_iter()
            .filter(|&dir| Self::is_safe_position(head.step(dir), snapshot))
            .collect();

        if safe_directions.is_empty() {
            Some(snapshot.direction)
        } else {
            let idx = rng.random_range(0..safe_directions.len());
            Some(safe_directions[idx])
        }
    }

    fn valid_directions(current: Direction) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| !d.is_opposite(&current))
            .collect()
    }

    /// The food, or the powerup when it is at least as close.
    fn find_nearest_target(from: Cell, snapshot: &SessionSnapshot) -> Option<Cell> {
        snapshot
            .powerup
            .into_iter()
            .chain(snapshot.food.as_ref().map(|f| f.cell))
            .min_by_key(|cell| from.manhattan_distance(*cell))
    }

    fn is_safe_position(pos: Cell, snapshot: &SessionSnapshot) -> bool {
        if !snapshot.grid.contains(pos) || snapshot.obstacles.contains(&pos) {
            return false;
        }
        let tail = snapshot.snake.last().copied();
        !(snapshot.snake.contains(&pos) && Some(pos) != tail)
    }
}
