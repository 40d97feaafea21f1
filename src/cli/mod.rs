//! Command-line parsing for the complexity search tool.
//!
//! Argument parsing and command dispatch stay separate from the search code:
//! this module only describes flags; `app` turns them into a `SearchConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_NUM_TERMS, DEFAULT_P_VALUES, DEFAULT_Q_VALUES, DEFAULT_X_VALUES, SearchStrategy,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cxs",
    version,
    about = "Empirical complexity search: find the basis-function model that best explains measured costs"
)]
pub struct Cli {
    /// Log search progress and rejected candidates (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for the best model of a CSV of measurements (last column = cost).
    Search(SearchArgs),
    /// Print every grid combination for a basis configuration, numbered.
    ///
    /// Factorial terms print as `Gamma(n+1)`, which equals n!.
    List(ListArgs),
    /// Print the sizes of the search space for a basis configuration.
    Count(CountArgs),
    /// Write a synthetic benchmark CSV with a known cost model.
    Synth(SynthArgs),
    /// Print a result JSON written by `cxs search --export`.
    ///
    /// Factorial terms print as `Gamma(n+1)`, which equals n!.
    Show(ShowArgs),
}

/// Basis vocabulary and model size, shared by `search`, `list` and `count`.
#[derive(Debug, Args, Clone)]
pub struct BasisArgs {
    /// Number of terms per model (grid: exactly; random: at most).
    #[arg(short = 'k', long, default_value_t = DEFAULT_NUM_TERMS)]
    pub num_terms: usize,

    /// Polynomial exponents p for n^p (comma or space separated).
    #[arg(long, value_delimiter = ',', num_args = 0.., default_values_t = DEFAULT_P_VALUES)]
    pub p_values: Vec<f64>,

    /// Polylog exponents q for log(n)^q.
    #[arg(long, value_delimiter = ',', num_args = 0.., default_values_t = DEFAULT_Q_VALUES)]
    pub q_values: Vec<f64>,

    /// Exponential bases X for X^n.
    #[arg(long, value_delimiter = ',', num_args = 0.., default_values_t = DEFAULT_X_VALUES)]
    pub x_values: Vec<f64>,
}

/// Options for `search`.
#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    /// CSV with a header row; feature columns first, cost column last.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    #[command(flatten)]
    pub basis: BasisArgs,

    /// How to traverse the candidate space.
    #[arg(short, long, value_enum, alias = "search-strategy", default_value_t = SearchStrategy::Grid)]
    pub strategy: SearchStrategy,

    /// Number of random candidates (random strategy only).
    #[arg(short = 'n', long, default_value_t = 100)]
    pub num_samples: usize,

    /// Worker threads for candidate evaluation.
    #[arg(short = 'j', long, default_value_t = 4)]
    pub num_threads: usize,

    /// Seed for the random strategy (default: from the OS).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show the N largest residuals of the best model.
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Show a progress bar on stderr.
    #[arg(long)]
    pub progress: bool,

    /// Write the result (config + best model) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options for `list`.
#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    /// Number of input dimensions.
    #[arg(short, long, default_value_t = 1)]
    pub dimensions: usize,

    #[command(flatten)]
    pub basis: BasisArgs,

    /// Stop after this many combinations.
    #[arg(long)]
    pub limit: Option<u64>,
}

/// Options for `count`.
#[derive(Debug, Args, Clone)]
pub struct CountArgs {
    /// Number of input dimensions.
    #[arg(short, long, default_value_t = 1)]
    pub dimensions: usize,

    #[command(flatten)]
    pub basis: BasisArgs,
}

/// Options for `synth`.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,

    /// Values for one dimension, as `a,b,c` or `start:stop:step` (repeat per dimension).
    #[arg(long = "axis", value_name = "VALUES", required = true, value_parser = parse_axis)]
    pub axes: Vec<Axis>,

    /// Exponent per dimension (default: 1 for every axis).
    #[arg(long, value_delimiter = ',')]
    pub exponents: Vec<f64>,

    #[arg(long, default_value_t = 1.0)]
    pub coefficient: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub intercept: f64,

    /// Standard deviation of the Gaussian noise added to the cost.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for `show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Result JSON produced by `cxs search --export`.
    #[arg(value_name = "JSON")]
    pub result: PathBuf,
}

/// Most points a `start:stop:step` axis may expand to.
pub const MAX_AXIS_POINTS: usize = 1_000_000;

/// Values taken by one synthetic dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis(pub Vec<f64>);

/// Parse `a,b,c` or an inclusive `start:stop:step` range.
pub fn parse_axis(s: &str) -> Result<Axis, String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", v.trim()))
    };

    let parts: Vec<&str> = s.split(':').collect();
    if let [start, stop, step] = parts.as_slice() {
        let (start, stop, step) = (parse(start)?, parse(stop)?, parse(step)?);
        if !(step.is_finite() && step > 0.0) || !(start.is_finite() && stop.is_finite()) || stop < start {
            return Err(format!("invalid range '{s}' (need start <= stop and step > 0)"));
        }
        let steps = ((stop - start) / step + 1e-9).floor();
        if steps >= MAX_AXIS_POINTS as f64 {
            return Err(format!(
                "range '{s}' expands to more than {MAX_AXIS_POINTS} points; use a larger step"
            ));
        }
        let count = steps as usize + 1;
        return Ok(Axis((0..count).map(|i| start + i as f64 * step).collect()));
    }
    if parts.len() != 1 {
        return Err(format!("invalid axis '{s}' (use a,b,c or start:stop:step)"));
    }

    let values = s.split(',').map(parse).collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Err("axis needs at least one value".to_string());
    }
    Ok(Axis(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn search_defaults() {
        let cli = Cli::try_parse_from(["cxs", "search", "data.csv"]).unwrap();
        assert!(!cli.verbose);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.data, PathBuf::from("data.csv"));
        assert_eq!(args.basis.num_terms, 2);
        assert_eq!(args.basis.p_values, vec![1.0, 2.0, 3.0]);
        assert_eq!(args.basis.q_values, vec![1.0]);
        assert_eq!(args.basis.x_values, vec![2.0]);
        assert_eq!(args.strategy, SearchStrategy::Grid);
        assert_eq!(args.num_samples, 100);
        assert_eq!(args.num_threads, 4);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn value_lists_accept_commas_and_spaces() {
        let cli = Cli::try_parse_from([
            "cxs", "search", "d.csv", "--p-values", "1,2", "--q-values", "1", "2", "--x-values", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.basis.p_values, vec![1.0, 2.0]);
        assert_eq!(args.basis.q_values, vec![1.0, 2.0]);
        assert!(args.basis.x_values.is_empty());
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["cxs", "search", "d.csv", "--strategy", "annealing"]).is_err());
        let cli = Cli::try_parse_from(["cxs", "search", "d.csv", "--search-strategy", "random"]).unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.strategy, SearchStrategy::Random);
    }

    #[test]
    fn synth_axes_repeat() {
        let cli = Cli::try_parse_from([
            "cxs", "synth", "-o", "out.csv", "--axis", "1,2,3", "--axis", "10:50:10", "--intercept", "-2",
        ])
        .unwrap();
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        assert_eq!(args.axes[0], Axis(vec![1.0, 2.0, 3.0]));
        assert_eq!(args.axes[1], Axis(vec![10.0, 20.0, 30.0, 40.0, 50.0]));
        assert_eq!(args.intercept, -2.0);
        assert!(args.exponents.is_empty());
    }

    #[test]
    fn parse_axis_errors() {
        assert!(parse_axis("1,x").is_err());
        assert!(parse_axis("5:1:1").is_err());
        assert!(parse_axis("1:5:0").is_err());
        assert!(parse_axis("1:2").is_err());
        assert_eq!(parse_axis("0:1:0.25").unwrap().0.len(), 5);
    }

    #[test]
    fn oversized_range_is_rejected_before_expanding() {
        let err = parse_axis("0:1e18:1e-6").unwrap_err();
        assert!(err.contains("more than 1000000 points"), "{err}");
        assert!(parse_axis("1:1e300:1e-300").is_err());

        let at_cap = format!("1:{}:1", MAX_AXIS_POINTS);
        assert_eq!(parse_axis(&at_cap).unwrap().0.len(), MAX_AXIS_POINTS);
        assert!(parse_axis(&format!("0:{}:1", MAX_AXIS_POINTS)).is_err());

        assert!(Cli::try_parse_from(["cxs", "synth", "-o", "o.csv", "--axis", "0:1e18:1e-6"]).is_err());
    }

    #[test]
    fn factorial_naming_is_documented_in_help() {
        let cli = Cli::command();
        for name in ["list", "show"] {
            let help = cli
                .find_subcommand(name)
                .and_then(|c| c.get_long_about())
                .map(|s| s.to_string())
                .unwrap_or_default();
            assert!(help.contains("Gamma(n+1)"), "{name}: {help}");
        }
    }
}
