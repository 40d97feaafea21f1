//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - used in-memory during the search
//! - exported to JSON
//! - reloaded later for display

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::ols::LinearModel;
use crate::models::BasisCombination;

/// Default number of terms per candidate model.
pub const DEFAULT_NUM_TERMS: usize = 2;
/// Default polynomial exponents.
pub const DEFAULT_P_VALUES: [f64; 3] = [1.0, 2.0, 3.0];
/// Default polylog exponents.
pub const DEFAULT_Q_VALUES: [f64; 1] = [1.0];
/// Default exponential bases.
pub const DEFAULT_X_VALUES: [f64; 1] = [2.0];

/// How the candidate space is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Every combination of exactly `num_terms` basis functions.
    Grid,
    /// `num_samples` combinations of 1..=`num_terms` random basis functions.
    Random,
}

impl SearchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchStrategy::Grid => "grid",
            SearchStrategy::Random => "random",
        }
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults). The number of dimensions is
/// not part of it; it comes from the data.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub num_terms: usize,
    pub p_values: Vec<f64>,
    pub q_values: Vec<f64>,
    pub x_values: Vec<f64>,
    pub strategy: SearchStrategy,
    /// Random mode only.
    pub num_samples: usize,
    pub num_threads: usize,
    /// Seed for random mode; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Render a progress bar on stderr.
    pub progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_terms: DEFAULT_NUM_TERMS,
            p_values: DEFAULT_P_VALUES.to_vec(),
            q_values: DEFAULT_Q_VALUES.to_vec(),
            x_values: DEFAULT_X_VALUES.to_vec(),
            strategy: SearchStrategy::Grid,
            num_samples: 100,
            num_threads: 4,
            seed: None,
            progress: false,
        }
    }
}

impl SearchConfig {
    /// Reject settings no search can run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.num_terms == 0 {
            return Err(AppError::invalid_input("Number of terms must be >= 1."));
        }
        if self.num_threads == 0 {
            return Err(AppError::invalid_input("Number of threads must be >= 1."));
        }
        if let Some(p) = self.p_values.iter().find(|v| !v.is_finite()) {
            return Err(AppError::invalid_input(format!("Invalid polynomial exponent {p}.")));
        }
        if let Some(q) = self.q_values.iter().find(|v| !v.is_finite()) {
            return Err(AppError::invalid_input(format!("Invalid polylog exponent {q}.")));
        }
        if let Some(x) = self.x_values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(AppError::invalid_input(format!(
                "Invalid exponential base {x} (must be finite and > 0)."
            )));
        }
        Ok(())
    }
}

/// Input data: one column per dimension plus the target.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    target_name: String,
    columns: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl Dataset {
    /// Build from feature columns (column-major).
    pub fn from_columns(
        feature_names: Vec<String>,
        target_name: String,
        columns: Vec<Vec<f64>>,
        targets: Vec<f64>,
    ) -> Result<Self, AppError> {
        if columns.is_empty() {
            return Err(AppError::invalid_input(
                "Data needs at least one feature column and a target column.",
            ));
        }
        if feature_names.len() != columns.len() {
            return Err(AppError::invalid_input(format!(
                "{} feature names for {} feature columns.",
                feature_names.len(),
                columns.len()
            )));
        }
        if targets.is_empty() {
            return Err(AppError::invalid_input("Data has no rows."));
        }
        if let Some((i, c)) = columns.iter().enumerate().find(|(_, c)| c.len() != targets.len()) {
            return Err(AppError::invalid_input(format!(
                "Feature column {} has {} values but there are {} targets.",
                i + 1,
                c.len(),
                targets.len()
            )));
        }
        if columns.iter().flatten().chain(&targets).any(|v| !v.is_finite()) {
            return Err(AppError::invalid_input("Data contains non-finite values."));
        }

        Ok(Self {
            feature_names,
            target_name,
            columns,
            targets,
        })
    }

    /// Build from feature rows, each with exactly one value per dimension.
    pub fn from_rows(
        feature_names: Vec<String>,
        target_name: String,
        rows: &[Vec<f64>],
        targets: Vec<f64>,
    ) -> Result<Self, AppError> {
        let num_dimensions = feature_names.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); num_dimensions];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != num_dimensions {
                return Err(AppError::invalid_input(format!(
                    "Row {} has {} features, expected {num_dimensions}.",
                    i + 1,
                    row.len()
                )));
            }
            for (col, &v) in columns.iter_mut().zip(row) {
                col.push(v);
            }
        }
        Self::from_columns(feature_names, target_name, columns, targets)
    }

    pub fn num_dimensions(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.targets.len()
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }
}

/// Outcome of evaluating one candidate.
///
/// A rejected candidate (non-finite design matrix) has infinite error and no
/// model or basis.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub error: f64,
    pub model: Option<LinearModel>,
    pub basis: Option<BasisCombination>,
}

impl FitResult {
    pub fn rejected() -> Self {
        Self {
            error: f64::INFINITY,
            model: None,
            basis: None,
        }
    }

    /// Whether this result can ever be selected.
    pub fn is_usable(&self) -> bool {
        self.error.is_finite() && self.model.is_some() && self.basis.is_some()
    }
}

/// Result of a whole search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub strategy: SearchStrategy,
    /// Candidates evaluated (including rejected ones).
    pub evaluated: u128,
    /// Candidates rejected for non-finite design matrices.
    pub rejected: u128,
    /// Minimum-error usable result, if any.
    pub best: Option<FitResult>,
    /// Generation index of `best` within the candidate stream.
    pub best_index: Option<u128>,
}

/// A saved search result (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub data_path: Option<PathBuf>,
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub strategy: SearchStrategy,
    pub num_terms: usize,
    pub p_values: Vec<f64>,
    pub q_values: Vec<f64>,
    pub x_values: Vec<f64>,
    pub evaluated: u128,
    pub rejected: u128,
    pub best: BestModel,
}

/// The winning model in a [`ResultFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    pub basis: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub mean_squared_error: f64,
}
