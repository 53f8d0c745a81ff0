use std::fmt;

use thiserror::Error;

/// What a [`GameError::PlacementFailed`] was trying to put on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementTarget {
    Food,
    Powerup,
    Obstacle,
}

impl fmt::Display for PlacementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementTarget::Food => write!(f, "food"),
            PlacementTarget::Powerup => write!(f, "powerup"),
            PlacementTarget::Obstacle => write!(f, "obstacle"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GameError {
    #[error("could not place {target} after {attempts} attempts")]
    PlacementFailed {
        target: PlacementTarget,
        attempts: usize,
    },

    #[error("invalid game state: {0}")]
    InvalidState(String),

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

impl GameError {
    /// Powerup and obstacle placement failures only degrade the session; everything else ends it.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            GameError::PlacementFailed {
                target: PlacementTarget::Powerup | PlacementTarget::Obstacle,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_failure_fatality_depends_on_target() {
        let food = GameError::PlacementFailed { target: PlacementTarget::Food, attempts: 10 };
        let powerup = GameError::PlacementFailed { target: PlacementTarget::Powerup, attempts: 10 };
        let obstacle = GameError::PlacementFailed { target: PlacementTarget::Obstacle, attempts: 10 };

        assert!(food.is_fatal());
        assert!(!powerup.is_fatal());
        assert!(!obstacle.is_fatal());
        assert!(GameError::InvalidState("empty snake".to_string()).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::PlacementFailed { target: PlacementTarget::Food, attempts: 300 };
        assert_eq!(err.to_string(), "could not place food after 300 attempts");
    }
}
