//! Synthetic benchmark data.
//!
//! Produces measurements over the Cartesian grid of the given axis values,
//! with target
//!
//! `coefficient * Π n_i^{e_i} + intercept + noise`, `noise ~ Normal(0, noise_std)`
//!
//! so a search over the generated CSV has a known right answer (for
//! exponents all 1 in two dimensions: `n_1^1 * n_2^1`).

use std::fs::File;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Dataset;
use crate::error::AppError;

/// Parameters for [`generate`].
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Values taken by each feature dimension; rows are their Cartesian product.
    pub axes: Vec<Vec<f64>>,
    /// Exponent per dimension (same length as `axes`).
    pub exponents: Vec<f64>,
    pub coefficient: f64,
    pub intercept: f64,
    pub noise_std: f64,
    pub seed: u64,
}

impl SynthConfig {
    fn validate(&self) -> Result<(), AppError> {
        if self.axes.is_empty() {
            return Err(AppError::invalid_input("At least one axis is required."));
        }
        if self.axes.iter().any(Vec::is_empty) {
            return Err(AppError::invalid_input("Every axis needs at least one value."));
        }
        if self.exponents.len() != self.axes.len() {
            return Err(AppError::invalid_input(format!(
                "{} exponents for {} axes.",
                self.exponents.len(),
                self.axes.len()
            )));
        }
        let scalars = [self.coefficient, self.intercept, self.noise_std];
        if self.axes.iter().flatten().chain(&self.exponents).chain(&scalars).any(|v| !v.is_finite()) {
            return Err(AppError::invalid_input("Synthetic parameters must be finite."));
        }
        if self.noise_std < 0.0 {
            return Err(AppError::invalid_input("Noise standard deviation must be >= 0."));
        }
        Ok(())
    }
}

/// Generate the dataset described by `config`.
///
/// Feature columns are named `n_1`, `n_2`, ...; the target is `time`.
pub fn generate(config: &SynthConfig) -> Result<Dataset, AppError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise_std)
        .map_err(|e| AppError::invalid_input(format!("Noise distribution error: {e}")))?;

    let num_rows: usize = config.axes.iter().map(Vec::len).product();
    let mut rows = Vec::with_capacity(num_rows);
    let mut targets = Vec::with_capacity(num_rows);

    // Odometer over the axes, last axis fastest.
    let mut pos = vec![0usize; config.axes.len()];
    for _ in 0..num_rows {
        let row: Vec<f64> = pos.iter().zip(&config.axes).map(|(&i, axis)| axis[i]).collect();
        let term = row
            .iter()
            .zip(&config.exponents)
            .fold(config.coefficient, |acc, (v, e)| acc * v.powf(*e));
        targets.push(term + config.intercept + normal.sample(&mut rng));
        rows.push(row);

        for dim in (0..pos.len()).rev() {
            pos[dim] += 1;
            if pos[dim] < config.axes[dim].len() {
                break;
            }
            pos[dim] = 0;
        }
    }

    let names = (1..=config.axes.len()).map(|i| format!("n_{i}")).collect();
    Dataset::from_rows(names, "time".to_string(), &rows, targets)
}

/// Write a dataset as CSV (features first, target last) readable by `io::ingest`.
pub fn write_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    let write_err = |e: csv::Error| AppError::invalid_input(format!("Failed to write CSV: {e}"));

    let mut header: Vec<&str> = dataset.feature_names().iter().map(String::as_str).collect();
    header.push(dataset.target_name());
    writer.write_record(&header).map_err(write_err)?;

    for row in 0..dataset.num_rows() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| c[row].to_string())
            .chain(std::iter::once(dataset.targets()[row].to_string()))
            .collect();
        writer.write_record(&record).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::invalid_input(format!("Failed to write CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_dataset;

    fn product_config(noise_std: f64) -> SynthConfig {
        SynthConfig {
            axes: vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0]],
            exponents: vec![1.0, 1.0],
            coefficient: 2.0,
            intercept: 5.0,
            noise_std,
            seed: 7,
        }
    }

    #[test]
    fn noiseless_grid_is_exact() {
        let d = generate(&product_config(0.0)).unwrap();
        assert_eq!(d.num_rows(), 6);
        assert_eq!(d.feature_names(), ["n_1".to_string(), "n_2".to_string()]);
        // Last axis varies fastest.
        assert_eq!(d.columns()[0], vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        assert_eq!(d.columns()[1], vec![10.0, 20.0, 10.0, 20.0, 10.0, 20.0]);
        assert_eq!(d.targets()[3], 2.0 * 2.0 * 20.0 + 5.0);
    }

    #[test]
    fn noise_is_seeded() {
        let a = generate(&product_config(1.0)).unwrap();
        let b = generate(&product_config(1.0)).unwrap();
        assert_eq!(a.targets(), b.targets());
        let clean = generate(&product_config(0.0)).unwrap();
        assert!(a.targets().iter().zip(clean.targets()).any(|(x, y)| x != y));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut c = product_config(0.0);
        c.exponents.pop();
        assert!(generate(&c).is_err());

        let mut c = product_config(0.0);
        c.noise_std = -1.0;
        assert!(generate(&c).is_err());

        let mut c = product_config(0.0);
        c.axes[1].clear();
        assert!(generate(&c).is_err());
    }

    #[test]
    fn csv_round_trips_through_ingest() {
        let d = generate(&product_config(0.5)).unwrap();
        let path = std::env::temp_dir().join(format!("cxs-synth-{}.csv", std::process::id()));
        write_csv(&path, &d).unwrap();
        let back = load_dataset(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.columns(), d.columns());
        assert_eq!(back.targets(), d.targets());
        assert_eq!(back.target_name(), "time");
    }
}
