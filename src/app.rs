//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module is the real main:
//! - parses CLI arguments and initializes logging
//! - turns flags into a `SearchConfig`
//! - runs the requested command
//! - prints reports and writes optional exports

use std::io::{self, Write};

use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{BasisArgs, Cli, Command, CountArgs, ListArgs, SearchArgs, ShowArgs, SynthArgs};
use crate::data::synthetic::{SynthConfig, generate, write_csv};
use crate::domain::SearchConfig;
use crate::error::AppError;
use crate::fit::grid::GridCombinations;
use crate::io::export::{read_result_json, result_file_from_outcome, write_result_json};
use crate::models::{BasisCombination, BasisSpace};
use crate::report::{
    format_combination_line, format_counts, format_residuals, format_result_file, format_search_summary,
    space_counts,
};

pub mod pipeline;

/// Entry point for the `cxs` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Search(args) => handle_search(args),
        Command::List(args) => handle_list(args),
        Command::Count(args) => handle_count(args),
        Command::Synth(args) => handle_synth(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    // RUST_LOG, when set, takes precedence over the flag.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

fn handle_search(args: SearchArgs) -> Result<(), AppError> {
    let config = search_config_from_args(&args);
    debug!("search config: {config:?}");
    let run = pipeline::run_search_file(&args.data, &config, args.top)?;

    println!("{}", format_search_summary(&run.dataset, &config, &run.outcome));
    if !run.residuals.is_empty() {
        println!("{}", format_residuals(&run.residuals, &run.dataset));
    }

    if let Some(path) = &args.export {
        let file = result_file_from_outcome(&run.outcome, &run.dataset, &config, Some(&args.data))?;
        write_result_json(path, &file)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_list(args: ListArgs) -> Result<(), AppError> {
    let space = basis_space(args.dimensions, &args.basis)?;
    let grid = GridCombinations::new(space.len(), args.basis.num_terms)?;
    let limit = args.limit.map(u128::from).unwrap_or(u128::MAX);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    for (rank, indices) in grid.take_while(|(rank, _)| *rank < limit) {
        let combination = BasisCombination::from_indices(&space, indices)?;
        if let Err(e) = writeln!(out, "{}", format_combination_line(rank + 1, &combination)) {
            // Closed pipe (e.g. `| head`) ends the listing.
            if e.kind() == io::ErrorKind::BrokenPipe {
                return Ok(());
            }
            return Err(AppError::invalid_input(format!("Failed to write listing: {e}")));
        }
    }
    out.flush()
        .or_else(|e| if e.kind() == io::ErrorKind::BrokenPipe { Ok(()) } else { Err(e) })
        .map_err(|e| AppError::invalid_input(format!("Failed to write listing: {e}")))
}

fn handle_count(args: CountArgs) -> Result<(), AppError> {
    if args.dimensions == 0 {
        return Err(AppError::invalid_input("Number of dimensions must be >= 1."));
    }
    let b = &args.basis;
    let counts = space_counts(args.dimensions, b.num_terms, &b.p_values, &b.q_values, &b.x_values);
    print!("{}", format_counts(&counts));
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = synth_config_from_args(&args);
    let dataset = generate(&config)?;
    write_csv(&args.output, &dataset)?;
    println!(
        "Wrote {} rows x {} dimensions to {}",
        dataset.num_rows(),
        dataset.num_dimensions(),
        args.output.display()
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let file = read_result_json(&args.result)?;
    print!("{}", format_result_file(&file));
    Ok(())
}

fn basis_space(num_dimensions: usize, basis: &BasisArgs) -> Result<BasisSpace, AppError> {
    let vocabulary = SearchConfig {
        num_terms: basis.num_terms,
        p_values: basis.p_values.clone(),
        q_values: basis.q_values.clone(),
        x_values: basis.x_values.clone(),
        ..SearchConfig::default()
    };
    vocabulary.validate()?;
    BasisSpace::new(num_dimensions, &basis.p_values, &basis.q_values, &basis.x_values)
}

pub fn search_config_from_args(args: &SearchArgs) -> SearchConfig {
    SearchConfig {
        num_terms: args.basis.num_terms,
        p_values: args.basis.p_values.clone(),
        q_values: args.basis.q_values.clone(),
        x_values: args.basis.x_values.clone(),
        strategy: args.strategy,
        num_samples: args.num_samples,
        num_threads: args.num_threads,
        seed: args.seed,
        progress: args.progress,
    }
}

pub fn synth_config_from_args(args: &SynthArgs) -> SynthConfig {
    let exponents = if args.exponents.is_empty() {
        vec![1.0; args.axes.len()]
    } else {
        args.exponents.clone()
    };
    SynthConfig {
        axes: args.axes.iter().map(|a| a.0.clone()).collect(),
        exponents,
        coefficient: args.coefficient,
        intercept: args.intercept,
        noise_std: args.noise,
        seed: args.seed,
    }
}
