use serde::{Deserialize, Serialize};

/// Cosmetic features a renderer unlocks per stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAttributes {
    pub eyes: bool,
    pub pattern: bool,
    pub nostrils: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    pub min_length: usize,
    #[serde(default)]
    pub attributes: StageAttributes,
}

impl StageDefinition {
    pub fn default_catalog() -> Vec<StageDefinition> {
        vec![
            StageDefinition {
                name: "Hatchling".to_string(),
                min_length: 1,
                attributes: StageAttributes::default(),
            },
            StageDefinition {
                name: "Juvenile".to_string(),
                min_length: 5,
                attributes: StageAttributes { eyes: true, ..StageAttributes::default() },
            },
            StageDefinition {
                name: "Teen".to_string(),
                min_length: 10,
                attributes: StageAttributes { eyes: true, pattern: true, nostrils: false },
            },
            StageDefinition {
                name: "Adult".to_string(),
                min_length: 15,
                attributes: StageAttributes { eyes: true, pattern: true, nostrils: true },
            },
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageChange {
    Unchanged,
    Promoted(usize),
    Regressed(usize),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageTracker {
    index: usize,
}

impl StageTracker {
    pub fn new(snake_length: usize, stages: &[StageDefinition]) -> Self {
        let mut tracker = Self::default();
        tracker.recompute(snake_length, stages);
        tracker
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves to the greatest stage whose `min_length` fits, walking up or down from the
    /// current stage. Stage 0 is the floor even when the snake is shorter than its minimum.
    pub fn recompute(&mut self, snake_length: usize, stages: &[StageDefinition]) -> StageChange {
        if stages.is_empty() {
            self.index = 0;
            return StageChange::Unchanged;
        }

        let previous = self.index.min(stages.len() - 1);
        let mut index = previous;
        while index + 1 < stages.len() && stages[index + 1].min_length <= snake_length {
            index += 1;
        }
        while index > 0 && stages[index].min_length > snake_length {
            index -= 1;
        }
        self.index = index;

        if index > previous {
            StageChange::Promoted(index)
        } else if index < previous {
            StageChange::Regressed(index)
        } else {
            StageChange::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_stage_from_length() {
        let stages = StageDefinition::default_catalog();
        assert_eq!(StageTracker::new(3, &stages).index(), 0);
        assert_eq!(StageTracker::new(5, &stages).index(), 1);
        assert_eq!(StageTracker::new(40, &stages).index(), 3);
    }

    #[test]
    fn test_promotion_fires_once() {
        let stages = StageDefinition::default_catalog();
        let mut tracker = StageTracker::new(4, &stages);
        assert_eq!(tracker.recompute(5, &stages), StageChange::Promoted(1));
        assert_eq!(tracker.recompute(5, &stages), StageChange::Unchanged);
        assert_eq!(tracker.recompute(6, &stages), StageChange::Unchanged);
    }

    #[test]
    fn test_multi_stage_jumps_both_ways() {
        let stages = StageDefinition::default_catalog();
        let mut tracker = StageTracker::new(1, &stages);
        assert_eq!(tracker.recompute(16, &stages), StageChange::Promoted(3));
        assert_eq!(tracker.recompute(6, &stages), StageChange::Regressed(1));
        assert_eq!(tracker.recompute(1, &stages), StageChange::Regressed(0));
        assert_eq!(tracker.recompute(0, &stages), StageChange::Unchanged);
    }
}
