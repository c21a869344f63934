//! Depth-based scaling
//!
//! Every number that grows as the player goes deeper lives here. All of
//! them are non-decreasing in depth.

use std::ops::RangeInclusive;

use crate::MAX_DEPTH;

/// Scaling for one depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthScaling {
    /// Current depth (1-indexed)
    pub depth: u32,
}

impl DepthScaling {
    pub fn new(depth: u32) -> Self {
        Self { depth: depth.clamp(1, MAX_DEPTH) }
    }

    /// Levels below the first
    fn steps(&self) -> f64 {
        self.depth.saturating_sub(1) as f64
    }

    /// Monster hit points: +15% per level below the first
    pub fn scale_hp(&self, base_hp: i32) -> i32 {
        (base_hp as f64 * (1.0 + 0.15 * self.steps())) as i32
    }

    /// Monster attack: +10% per level below the first
    pub fn scale_attack(&self, base_attack: i32) -> i32 {
        (base_attack as f64 * (1.0 + 0.10 * self.steps())) as i32
    }

    /// Inclusive range of roaming monsters on this level
    pub fn monster_count_range(&self) -> (usize, usize) {
        let extra = self.depth.saturating_sub(1) as usize;
        (2 + extra / 2, 5 + extra)
    }

    /// Highest roaming tier that can appear here
    pub fn max_monster_tier(&self) -> usize {
        self.depth as usize
    }

    /// Highest weapon or armour tier that can appear here
    pub fn max_item_tier(&self) -> usize {
        self.depth as usize
    }

    /// Chance a slain monster leaves something behind
    pub fn drop_chance(&self) -> f64 {
        (0.30 + 0.03 * self.depth as f64).min(0.9)
    }

    /// Upper bound of a gold pile
    pub fn max_gold(&self) -> u32 {
        15 + self.depth * 5
    }

    /// Healing of a potion sold by the merchant
    pub fn merchant_potion_heal(&self) -> RangeInclusive<i32> {
        let bonus = self.depth as i32 * 2;
        (10 + bonus)..=(20 + bonus)
    }

    /// Highest weapon tier the merchant can stock
    pub fn merchant_weapon_tier(&self) -> usize {
        (self.depth as usize + 1).min(6)
    }
}
