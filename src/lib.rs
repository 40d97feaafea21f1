//! `complexity-search` library crate.
//!
//! Finds the linear combination of basis functions (polynomial, polylog,
//! exponential, factorial and their products, across every input dimension)
//! that best explains measured costs. The binary (`cxs`) is a thin wrapper
//! around this library so the search can be driven and tested in-process.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
