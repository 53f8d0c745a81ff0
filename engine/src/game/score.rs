use serde::{Deserialize, Serialize};

use crate::config::Validate;

/// Persisted form of the high score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u32,
}

impl Validate for HighScoreRecord {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    score: u32,
    high_score: u32,
    high_score_broken: bool,
}

impl ScoreBoard {
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            high_score_broken: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn high_score_broken(&self) -> bool {
        self.high_score_broken
    }

    /// Adds points and lifts the high score when passed. Returns `true` only the first time the
    /// high score is beaten in this session.
    pub fn add(&mut self, points: u32) -> bool {
        self.score = self.score.saturating_add(points);
        if self.score <= self.high_score {
            return false;
        }
        self.high_score = self.score;
        let first_time = !self.high_score_broken;
        self.high_score_broken = true;
        first_time
    }

    pub fn apply_penalty(&mut self, penalty: u32) {
        self.score = self.score.saturating_sub(penalty);
    }

    /// Clears the session score, keeping the high score.
    pub fn reset(&mut self) {
        self.score = 0;
        self.high_score_broken = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_high_score_notified_once() {
        let mut board = ScoreBoard::new(15);
        assert!(!board.add(10));
        assert!(board.add(10));
        assert_eq!(board.high_score(), 20);
        assert!(!board.add(10));
        assert_eq!(board.high_score(), 30);
        assert!(board.high_score_broken());
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        let mut board = ScoreBoard::new(0);
        board.add(3);
        board.apply_penalty(5);
        assert_eq!(board.score(), 0);
        assert_eq!(board.high_score(), 3);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut board = ScoreBoard::new(0);
        board.add(40);
        board.reset();
        assert_eq!(board.score(), 0);
        assert_eq!(board.high_score(), 40);
        assert!(!board.high_score_broken());
        assert!(!board.add(40));
        assert!(board.add(1));
    }
}
