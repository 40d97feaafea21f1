//! Formatted terminal output.
//!
//! All user-facing text lives here so the search code returns plain data and
//! the wording can change without touching it.

use crate::domain::{Dataset, ResultFile, SearchConfig, SearchOutcome};
use crate::models::BasisCombination;
use crate::report::{Residual, SpaceCounts};

/// Format the search summary: data, configuration, candidate counts, best model.
pub fn format_search_summary(dataset: &Dataset, config: &SearchConfig, outcome: &SearchOutcome) -> String {
    let mut out = String::new();

    out.push_str("=== cxs - empirical complexity search ===\n");
    out.push_str(&format!(
        "Data: n={} rows | dimensions={} ({}) | target={}\n",
        dataset.num_rows(),
        dataset.num_dimensions(),
        dataset.feature_names().join(", "),
        dataset.target_name()
    ));
    out.push_str(&format!(
        "Basis: p={} q={} X={} | terms={}\n",
        fmt_vec(&config.p_values),
        fmt_vec(&config.q_values),
        fmt_vec(&config.x_values),
        config.num_terms
    ));
    out.push_str(&format!(
        "Strategy: {} | evaluated={} | rejected (non-finite)={}\n",
        outcome.strategy, outcome.evaluated, outcome.rejected
    ));

    let best = outcome.best.as_ref();
    let (Some(best), Some(model), Some(basis)) = (
        best,
        best.and_then(|b| b.model.as_ref()),
        best.and_then(|b| b.basis.as_ref()),
    ) else {
        out.push_str("\nNo model found.\n");
        return out;
    };

    out.push_str("\nBest model:\n");
    out.push_str(&format!("- basis: {basis}\n"));
    out.push_str(&format!(
        "- {} ~ {}\n",
        dataset.target_name(),
        fmt_equation(&model.coefficients, model.intercept, basis)
    ));
    out.push_str(&format!("- coefficients: {}\n", fmt_coefficients(&model.coefficients)));
    out.push_str(&format!("- intercept: {:.6}\n", model.intercept));
    out.push_str(&format!("- MSE: {:.6e}\n", best.error));
    if let Some(index) = outcome.best_index {
        out.push_str(&format!("- candidate #: {}\n", index + 1));
    }

    out
}

/// Format the largest residuals as a table.
pub fn format_residuals(rows: &[Residual], dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str("Largest residuals:\n");

    let mut header = format!("{:>6}", "row");
    let mut rule = format!("{:-<6}", "");
    for name in dataset.feature_names() {
        header.push_str(&format!(" {:>12}", truncate(name, 12)));
        rule.push_str(&format!(" {:-<12}", ""));
    }
    header.push_str(&format!(" {:>14} {:>14} {:>14}", "observed", "fitted", "residual"));
    rule.push_str(&format!(" {:-<14} {:-<14} {:-<14}", "", "", ""));
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for r in rows {
        let mut line = format!("{:>6}", r.row);
        for v in &r.features {
            line.push_str(&format!(" {v:>12}"));
        }
        line.push_str(&format!(" {:>14.4} {:>14.4} {:>14.4}", r.observed, r.fitted, r.residual));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// One numbered line of a combination listing (1-based `number`).
pub fn format_combination_line(number: u128, combination: &BasisCombination) -> String {
    format!("{number:>8}: {combination}")
}

/// Format the search-space sizes for one configuration.
pub fn format_counts(counts: &SpaceCounts) -> String {
    let mut out = String::new();
    out.push_str(&format!("Elementary functions: {}\n", counts.elementary));
    out.push_str(&format!("1-D basis functions: {}\n", counts.one_d));
    out.push_str(&format!(
        "{}-D basis functions: {}\n",
        counts.num_dimensions,
        fmt_count(counts.n_d)
    ));
    out.push_str(&format!(
        "Combinations of {} terms: {}\n",
        counts.num_terms,
        fmt_count(counts.combinations)
    ));
    out
}

/// Format a saved result file.
pub fn format_result_file(file: &ResultFile) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} result ===\n", file.tool));
    out.push_str(&format!("Generated: {}\n", file.generated_at.to_rfc3339()));
    if let Some(path) = &file.data_path {
        out.push_str(&format!("Data: {}\n", path.display()));
    }
    out.push_str(&format!(
        "Features: {} | target={}\n",
        file.feature_names.join(", "),
        file.target_name
    ));
    out.push_str(&format!(
        "Basis: p={} q={} X={} | terms={} | strategy={}\n",
        fmt_vec(&file.p_values),
        fmt_vec(&file.q_values),
        fmt_vec(&file.x_values),
        file.num_terms,
        file.strategy
    ));
    out.push_str(&format!("Evaluated: {} | rejected: {}\n", file.evaluated, file.rejected));

    out.push_str("\nBest model:\n");
    out.push_str(&format!("- basis: {}\n", file.best.basis.join(" + ")));
    for (name, c) in file.best.basis.iter().zip(&file.best.coefficients) {
        out.push_str(&format!("  {c:>14.6} * {name}\n"));
    }
    out.push_str(&format!("- intercept: {:.6}\n", file.best.intercept));
    out.push_str(&format!("- MSE: {:.6e}\n", file.best.mean_squared_error));

    out
}

fn fmt_equation(coefficients: &[f64], intercept: f64, basis: &BasisCombination) -> String {
    let mut terms: Vec<String> = coefficients
        .iter()
        .zip(basis.names())
        .map(|(c, name)| format!("{c:.6} * {name}"))
        .collect();
    terms.push(format!("{intercept:.6}"));
    terms.join(" + ")
}

fn fmt_coefficients(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(f64::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_count(v: Option<u128>) -> String {
    v.map(|c| c.to_string()).unwrap_or_else(|| "> 2^128".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BestModel, FitResult, SearchStrategy};
    use crate::math::ols::LinearModel;
    use crate::models::BasisSpace;
    use crate::report::space_counts;
    use chrono::{TimeZone, Utc};

    fn dataset() -> Dataset {
        Dataset::from_columns(
            vec!["vertices".into(), "edges".into()],
            "seconds".into(),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![4.0, 6.0],
        )
        .unwrap()
    }

    fn outcome(best: Option<FitResult>) -> SearchOutcome {
        SearchOutcome {
            strategy: SearchStrategy::Grid,
            evaluated: 36,
            rejected: 3,
            best_index: best.as_ref().map(|_| 4),
            best,
        }
    }

    #[test]
    fn summary_shows_best_model() {
        let space = BasisSpace::new(2, &[1.0], &[], &[]).unwrap();
        let basis = BasisCombination::from_indices(&space, vec![0, 1]).unwrap();
        let best = FitResult {
            error: 0.25,
            model: Some(LinearModel {
                coefficients: vec![1.5, -2.0],
                intercept: 0.5,
                predictions: vec![],
            }),
            basis: Some(basis),
        };
        let text = format_search_summary(&dataset(), &SearchConfig::default(), &outcome(Some(best)));
        assert!(text.contains("dimensions=2 (vertices, edges)"));
        assert!(text.contains("evaluated=36 | rejected (non-finite)=3"));
        assert!(text.contains("- basis: n_1^1 * n_2^1 + n_1^1 * Gamma(n_2+1)"), "{text}");
        assert!(text.contains("seconds ~ 1.500000 * n_1^1 * n_2^1 + -2.000000 * n_1^1 * Gamma(n_2+1) + 0.500000"));
        assert!(text.contains("- candidate #: 5"));
    }

    #[test]
    fn summary_without_model() {
        let text = format_search_summary(&dataset(), &SearchConfig::default(), &outcome(None));
        assert!(text.contains("No model found."));
    }

    #[test]
    fn residual_table_has_feature_columns() {
        let rows = vec![Residual {
            row: 2,
            features: vec![2.0, 4.0],
            observed: 6.0,
            fitted: 5.5,
            residual: 0.5,
        }];
        let text = format_residuals(&rows, &dataset());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("vertices") && lines[1].contains("residual"));
        assert!(lines[3].trim_start().starts_with('2'));
        assert!(lines[3].ends_with("0.5000"));
    }

    #[test]
    fn combination_line_is_numbered() {
        let space = BasisSpace::new(1, &[2.0], &[1.0], &[]).unwrap();
        let basis = BasisCombination::from_indices(&space, vec![0, 1]).unwrap();
        assert_eq!(format_combination_line(1, &basis), "       1: n_1^2 + log(n_1)^1");
    }

    #[test]
    fn counts_render_overflow() {
        let text = format_counts(&space_counts(2, 2, &[1.0], &[], &[]));
        assert!(text.contains("1-D basis functions: 3"));
        assert!(text.contains("2-D basis functions: 9"));
        assert!(text.contains("Combinations of 2 terms: 36"));

        let huge = format_counts(&space_counts(100, 3, &[1.0, 2.0, 3.0], &[1.0], &[2.0]));
        assert!(huge.contains("> 2^128"));
    }

    #[test]
    fn result_file_lists_terms() {
        let file = ResultFile {
            tool: "cxs".into(),
            generated_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            data_path: None,
            feature_names: vec!["n".into()],
            target_name: "t".into(),
            strategy: SearchStrategy::Random,
            num_terms: 2,
            p_values: vec![1.0, 2.0],
            q_values: vec![1.0],
            x_values: vec![2.0],
            evaluated: 100,
            rejected: 7,
            best: BestModel {
                basis: vec!["n_1^2".into(), "log(n_1)^1".into()],
                coefficients: vec![3.0, 1.0],
                intercept: 0.0,
                mean_squared_error: 1e-4,
            },
        };
        let text = format_result_file(&file);
        assert!(text.contains("Generated: 2025-01-02T03:04:05+00:00"));
        assert!(text.contains("strategy=random"));
        assert!(text.contains("- basis: n_1^2 + log(n_1)^1"));
        assert!(text.contains("3.000000 * n_1^2"));
        assert!(!text.contains("Data:"));
    }
}
