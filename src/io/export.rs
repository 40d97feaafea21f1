//! Read/write search result JSON files.
//!
//! The result file is the portable record of a search: the configuration that
//! produced it, the winning basis combination with its coefficients, and the
//! candidate counts. The schema is `domain::ResultFile`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;

use crate::domain::{BestModel, Dataset, ResultFile, SearchConfig, SearchOutcome};
use crate::error::AppError;

pub const TOOL_NAME: &str = "cxs";

/// Summarize a finished search as a [`ResultFile`].
///
/// Fails with "no model" (exit code 3) if the outcome has no usable best fit.
pub fn result_file_from_outcome(
    outcome: &SearchOutcome,
    dataset: &Dataset,
    config: &SearchConfig,
    data_path: Option<&Path>,
) -> Result<ResultFile, AppError> {
    let best = outcome.best.as_ref().filter(|b| b.is_usable());
    let (Some(best), Some(model), Some(basis)) = (
        best,
        best.and_then(|b| b.model.as_ref()),
        best.and_then(|b| b.basis.as_ref()),
    ) else {
        return Err(AppError::no_model("No model found: nothing to export."));
    };

    Ok(ResultFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        data_path: data_path.map(Path::to_path_buf),
        feature_names: dataset.feature_names().to_vec(),
        target_name: dataset.target_name().to_string(),
        strategy: outcome.strategy,
        num_terms: config.num_terms,
        p_values: config.p_values.clone(),
        q_values: config.q_values.clone(),
        x_values: config.x_values.clone(),
        evaluated: outcome.evaluated,
        rejected: outcome.rejected,
        best: BestModel {
            basis: basis.names(),
            coefficients: model.coefficients.clone(),
            intercept: model.intercept,
            mean_squared_error: best.error,
        },
    })
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, result: &ResultFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to create result JSON '{}': {e}", path.display())))?;
    write_result(BufWriter::new(file), result)
        .map_err(|e| AppError::invalid_input(format!("Failed to write result JSON '{}': {e}", path.display())))
}

/// Serialize `result` to `writer` and flush it, so buffered write errors surface.
pub fn write_result<W: Write>(mut writer: W, result: &ResultFile) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush()
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::invalid_input(format!("Failed to open result JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::invalid_input(format!("Invalid result JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitResult, SearchStrategy};
    use crate::math::ols::LinearModel;
    use crate::models::{BasisCombination, BasisSpace};

    fn fixture() -> (SearchOutcome, Dataset, SearchConfig) {
        let dataset = Dataset::from_columns(
            vec!["n".into(), "w".into()],
            "t".into(),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
            vec![4.0, 10.0, 18.0],
        )
        .unwrap();
        let space = BasisSpace::new(2, &[1.0], &[], &[]).unwrap();
        let outcome = SearchOutcome {
            strategy: SearchStrategy::Grid,
            evaluated: 9,
            rejected: 2,
            best: Some(FitResult {
                error: 0.0,
                model: Some(LinearModel {
                    coefficients: vec![1.0],
                    intercept: 0.0,
                    predictions: vec![4.0, 10.0, 18.0],
                }),
                basis: Some(BasisCombination::from_indices(&space, vec![0]).unwrap()),
            }),
            best_index: Some(0),
        };
        let config = SearchConfig {
            num_terms: 1,
            p_values: vec![1.0],
            q_values: vec![],
            x_values: vec![],
            ..SearchConfig::default()
        };
        (outcome, dataset, config)
    }

    #[test]
    fn summary_carries_best_model() {
        let (outcome, dataset, config) = fixture();
        let file = result_file_from_outcome(&outcome, &dataset, &config, Some(Path::new("data.csv"))).unwrap();
        assert_eq!(file.tool, "cxs");
        assert_eq!(file.best.basis, vec!["n_1^1 * n_2^1".to_string()]);
        assert_eq!(file.evaluated, 9);
        assert_eq!(file.rejected, 2);
        assert_eq!(file.feature_names, vec!["n".to_string(), "w".to_string()]);
        assert_eq!(file.data_path.as_deref(), Some(Path::new("data.csv")));
    }

    #[test]
    fn no_best_is_no_model_error() {
        let (mut outcome, dataset, config) = fixture();
        outcome.best = None;
        let err = result_file_from_outcome(&outcome, &dataset, &config, None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn json_file_reloads_identically() {
        let (outcome, dataset, config) = fixture();
        let file = result_file_from_outcome(&outcome, &dataset, &config, None).unwrap();
        let path = std::env::temp_dir().join(format!("cxs-export-{}.json", std::process::id()));
        write_result_json(&path, &file).unwrap();
        let back = read_result_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, file);
    }

    /// Accepts nothing: every write fails.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn buffered_write_failure_is_reported() {
        let (outcome, dataset, config) = fixture();
        let file = result_file_from_outcome(&outcome, &dataset, &config, None).unwrap();

        // The whole document fits in the buffer; only the flush reaches the sink.
        let err = write_result(BufWriter::new(FullDisk), &file).unwrap_err();
        assert!(err.to_string().contains("no space left"));

        let dev_full = Path::new("/dev/full");
        if dev_full.exists() {
            let err = write_result_json(dev_full, &file).unwrap_err();
            assert_eq!(err.exit_code(), 2);
            assert!(err.message().contains("/dev/full"), "{}", err.message());
        }
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        let path = std::env::temp_dir().join(format!("cxs-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_result_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
    }
}
