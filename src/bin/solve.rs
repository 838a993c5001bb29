//! Solve a two-player subgame from CLI flags and print a strategy summary.
//!
//! ```text
//! solve --oop-range AA --ip-range KK --pot 1 --stack 100 \
//!       --bet-sizes 1.0 --iterations 50000
//! ```

use std::sync::atomic::AtomicBool;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use egto_solver::game::MaxBetsPerStreet;
use egto_solver::solver::{SolveRequest, Solver};

/// Solve a heads-up no-limit hold'em subgame with external-sampling CFR.
#[derive(Debug, Parser)]
#[command(name = "solve", version, about)]
struct Cli {
    /// Out-of-position range, e.g. "AA,KK,AKs".
    #[arg(long)]
    oop_range: String,

    /// In-position range.
    #[arg(long)]
    ip_range: String,

    /// Board cards, e.g. "Kd Qc 2s". Omit for preflop.
    #[arg(long, default_value = "")]
    board: String,

    /// Starting pot size.
    #[arg(long)]
    pot: f64,

    /// Each player's remaining stack.
    #[arg(long)]
    stack: f64,

    /// Comma-separated pot-fraction bet sizes.
    #[arg(long, default_value = "0.33,0.5,0.75,1.0,1.5,2.0")]
    bet_sizes: String,

    /// Comma-separated per-street caps: preflop,flop,turn,river.
    #[arg(long, default_value = "4,3,2,1")]
    max_bets_per_street: String,

    /// Disable the distinct all-in action.
    #[arg(long)]
    no_all_in: bool,

    /// Minimum raise size as a pot fraction.
    #[arg(long, default_value_t = 0.5)]
    min_raise_fraction: f64,

    /// Iteration budget.
    #[arg(long, default_value_t = 100_000)]
    iterations: u64,

    /// Convergence threshold on the average-strategy L1 checkpoint metric.
    #[arg(long, default_value_t = 1e-3)]
    convergence_threshold: f64,

    /// PRNG seed for deterministic solves.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the full SolveResponse as JSON to this path.
    #[arg(long)]
    output: Option<String>,
}

fn parse_bet_sizes(s: &str) -> Vec<f64> {
    s.split(',')
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().parse().expect("bet size must be a number"))
        .collect()
}

fn parse_max_bets(s: &str) -> MaxBetsPerStreet {
    let parts: Vec<u32> = s
        .split(',')
        .map(|t| t.trim().parse().expect("max_bets_per_street must be four integers"))
        .collect();
    assert_eq!(parts.len(), 4, "max_bets_per_street must be preflop,flop,turn,river");
    MaxBetsPerStreet {
        preflop: parts[0],
        flop: parts[1],
        turn: parts[2],
        river: parts[3],
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let request = SolveRequest {
        oop_range: cli.oop_range,
        ip_range: cli.ip_range,
        board: cli.board,
        pot: cli.pot,
        starting_stack: cli.stack,
        bet_sizes: parse_bet_sizes(&cli.bet_sizes),
        max_bets_per_street: parse_max_bets(&cli.max_bets_per_street),
        allow_all_in: !cli.no_all_in,
        min_raise_fraction: cli.min_raise_fraction,
        iterations: cli.iterations,
        convergence_threshold: cli.convergence_threshold,
        seed: cli.seed,
        ..Default::default()
    };

    log::info!(
        "solving: oop_range={:?} ip_range={:?} board={:?} pot={} stack={}",
        request.oop_range, request.ip_range, request.board, request.pot, request.starting_stack
    );

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

    let response = solver.response(egto_solver::solver::RunStats {
        iterations_performed: performed,
        convergence_history: history,
        final_convergence,
        converged,
    });

    println!(
        "{} iterations, {} nodes, final convergence {:.6} (converged={})",
        response.iterations_performed,
        response.nodes_count,
        response.final_convergence,
        response.converged
    );
    if let Some(texture) = response.board_texture {
        println!("board texture: {:?}", texture);
    }

    println!("\nOOP strategy:");
    for (hand, actions) in &response.oop_strategy {
        let actions_str: Vec<String> = actions
            .iter()
            .map(|(a, p)| format!("{}={:.3}", a, p))
            .collect();
        println!("  {:>8}  {}", hand, actions_str.join(" "));
    }

    println!("\nIP strategy:");
    for (hand, actions) in &response.ip_strategy {
        let actions_str: Vec<String> = actions
            .iter()
            .map(|(a, p)| format!("{}={:.3}", a, p))
            .collect();
        println!("  {:>8}  {}", hand, actions_str.join(" "));
    }

    if let Some(path) = cli.output {
        match serde_json::to_string_pretty(&response) {
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
        }
    }
}
