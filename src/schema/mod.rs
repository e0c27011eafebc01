//! Schema module - Rule, seed and search configuration types.

mod evolution;
mod rule;
mod seed;

pub use evolution::*;
pub use rule::*;
pub use seed::*;
