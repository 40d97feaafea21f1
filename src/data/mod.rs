//! Synthetic measurement data for exercising the search.

pub mod synthetic;

pub use synthetic::*;
