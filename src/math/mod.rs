//! Mathematical building blocks: basis functions, search-space counts, and least squares.

pub mod basis;
pub mod combinatorics;
pub mod ols;

pub use basis::*;
pub use combinatorics::*;
pub use ols::*;
