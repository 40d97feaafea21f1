//! Model search over basis combinations.
//!
//! Responsibilities:
//!
//! - enumerate candidate combinations (exhaustive grid or random samples)
//! - evaluate each candidate by OLS + mean squared error (parallel)
//! - select the minimum-error usable model

pub mod fitter;
pub mod grid;
pub mod random;
pub mod selection;

pub use fitter::*;
pub use grid::*;
pub use random::*;
pub use selection::*;
