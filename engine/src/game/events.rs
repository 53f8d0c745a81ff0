use crate::GameError;
use super::food::FoodEffect;
use super::types::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    WallCollision,
    ObstacleCollision,
    SelfCollision,
    /// The snake fell under its minimum length.
    TooShort,
    Error,
}

/// Discrete things that happened during a tick or a lifecycle command, in the order they
/// happened. Collaborators map them onto sounds, popups and persistence.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    AteFood {
        cell: Cell,
        points: u32,
    },
    AteSpecialFood {
        type_index: usize,
        name: String,
        effect: FoodEffect,
    },
    PowerupCollected {
        cell: Cell,
    },
    StagePromoted {
        index: usize,
        name: String,
    },
    NewHighScore {
        score: u32,
    },
    WallHit {
        penalty: u32,
        score: u32,
    },
    SpecialFoodExpired {
        type_index: usize,
    },
    GameOver {
        reason: GameOverReason,
        score: u32,
    },
    SessionError(GameError),
}
