//! Load a `SolveRequest` from a JSON file and run one solve.
//!
//! ```text
//! solve_from_config --config request.json --output response.json
//! ```

use std::sync::atomic::AtomicBool;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use egto_solver::solver::{RunStats, SolveRequest, Solver};

/// Run a solve whose full request is described by a JSON file.
#[derive(Debug, Parser)]
#[command(name = "solve_from_config", version, about)]
struct Cli {
    /// Path to a JSON-encoded `SolveRequest`.
    #[arg(long)]
    config: String,

    /// Write the JSON `SolveResponse` to this path; otherwise print a
    /// summary to stdout.
    #[arg(long)]
    output: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let request = match SolveRequest::from_json_file(&cli.config) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("failed to load {}: {}", cli.config, err);
            std::process::exit(1);
        }
    };

    log::info!("loaded solve request from {}", cli.config);

    let mut solver = match Solver::new(&request) {
        Ok(solver) => solver,
        Err(err) => {
            eprintln!("solve failed: {}", err);
            std::process::exit(1);
        }
    };

    let bar = ProgressBar::new(request.iterations);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} iterations ({eta})")
            .unwrap(),
    );
    let cancel = AtomicBool::new(false);
    let mut performed = 0u64;
    let mut history = Vec::new();
    let mut final_convergence = f64::INFINITY;
    let mut converged = false;
    while performed < request.iterations {
        let chunk = request.check_interval.min(request.iterations - performed);
        let chunk_stats = solver.run(chunk, request.convergence_threshold, chunk, &cancel);
        performed += chunk_stats.iterations_performed;
        bar.set_position(performed);
        history.extend(chunk_stats.convergence_history);
        if let Some(last) = history.last() {
            final_convergence = last.l1_change;
        }
        let stopped_short = chunk_stats.iterations_performed < chunk;
        converged = chunk_stats.converged;
        if converged || stopped_short {
            break;
        }
    }
    bar.finish_and_clear();

    let response = solver.response(RunStats {
        iterations_performed: performed,
        convergence_history: history,
        final_convergence,
        converged,
    });

    match cli.output {
        Some(path) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&path, json) {
                    eprintln!("failed to write {}: {}", path, err);
                    std::process::exit(1);
                }
                log::info!("wrote solve response to {}", path);
            }
            Err(err) => {
                eprintln!("failed to serialize response: {}", err);
                std::process::exit(1);
            }
        },
        None => {
            println!(
                "{} iterations, {} nodes, final convergence {:.6} (converged={})",
                response.iterations_performed,
                response.nodes_count,
                response.final_convergence,
                response.converged
            );
        }
    }
}
