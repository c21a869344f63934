//! Progression systems

pub mod xp;
pub mod scaling;
pub mod tracker;

pub use scaling::DepthScaling;
pub use xp::{xp_to_next, Experience};
