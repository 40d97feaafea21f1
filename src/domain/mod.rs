//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - search configuration (`SearchConfig`, `SearchStrategy`)
//! - the input dataset (`Dataset`)
//! - search outputs (`FitResult`, `SearchOutcome`, `ResultFile`)

pub mod types;

pub use types::*;
