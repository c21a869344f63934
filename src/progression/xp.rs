//! Experience and leveling
//!
//! XP calculations, leveling formulas, and the player's running total.

use serde::{Deserialize, Serialize};

/// Max hit points gained per level
pub const HP_PER_LEVEL: i32 = 8;
/// Attack gained per level
pub const ATTACK_PER_LEVEL: i32 = 1;

/// XP needed to go from `level` to the next one
pub fn xp_to_next(level: u32) -> u32 {
    level.max(1) * 20
}

/// Player experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub level: u32,
    /// XP banked towards the next level
    pub current: u32,
}

impl Experience {
    pub fn new() -> Self {
        Self { level: 1, current: 0 }
    }

    pub fn to_next(&self) -> u32 {
        xp_to_next(self.level)
    }

    /// Bank XP and return how many levels were gained
    pub fn gain(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_add(amount);
        let mut gained = 0;
        while self.current >= self.to_next() {
            self.current -= self.to_next();
            self.level += 1;
            gained += 1;
        }
        gained
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_to_next() {
        assert_eq!(xp_to_next(1), 20);
        assert_eq!(xp_to_next(2), 40);
        assert_eq!(xp_to_next(5), 100);
    }

    #[test]
    fn test_gain_carries_overflow() {
        let mut xp = Experience::new();
        assert_eq!(xp.gain(12), 0);
        assert_eq!(xp.gain(12), 1);
        assert_eq!(xp.level, 2);
        assert_eq!(xp.current, 4);
    }

    #[test]
    fn test_gain_multiple_levels() {
        let mut xp = Experience::new();
        // 20 + 40 + 60 = 120 reaches level 4
        assert_eq!(xp.gain(125), 3);
        assert_eq!(xp.level, 4);
        assert_eq!(xp.current, 5);
    }
}
