//! Basis-function models.
//!
//! - N-D basis functions and the indexable basis space (`nd`)
//! - basis combinations, design matrices, prediction (`model`)

pub mod model;
pub mod nd;

pub use model::*;
pub use nd::*;
