/// A value that falls back to its resting value after a number of ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiringState<T: Copy> {
    resting: T,
    value: T,
    remaining_ticks: u32,
}

impl<T: Copy> ExpiringState<T> {
    pub fn new(resting: T) -> Self {
        Self {
            resting,
            value: resting,
            remaining_ticks: 0,
        }
    }

    /// Shows `value` for the current tick and `ticks - 1` more.
    pub fn set(&mut self, value: T, ticks: u32) {
        self.value = value;
        self.remaining_ticks = ticks;
    }

    pub fn advance(&mut self) {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
    }

    pub fn current(&self) -> T {
        if self.remaining_ticks > 0 {
            self.value
        } else {
            self.resting
        }
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_expires_after_ticks() {
        let mut state = ExpiringState::new(0u32);
        state.set(3, 2);
        assert_eq!(state.current(), 3);
        state.advance();
        assert_eq!(state.current(), 3);
        state.advance();
        assert_eq!(state.current(), 0);
        state.advance();
        assert_eq!(state.current(), 0);
    }

    #[test]
    fn test_zero_ticks_never_shows() {
        let mut state = ExpiringState::new('n');
        state.set('h', 0);
        assert_eq!(state.current(), 'n');
    }
}
