//! C6: the recursive CFR driver, the iteration loop, and the
//! `SolveRequest`/`SolveResponse` data contracts at the library boundary.
//!
//! The recursion in [`cfr`] fully explores every legal action at every node
//! regardless of whose turn it is, carrying both players' reach
//! probabilities together, and credits the acting node's regret with the
//! *opponent's* reach weight only — the variant confirmed against the
//! original `comprehensive_cfr_solver.py::cfr`, distinct from the teacher's
//! per-traverser external-sampling `CFRSolver::traverse`. Only the private
//! hands are sampled per iteration (once per player, from their range); the
//! action tree itself is walked exhaustively.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::analyzer::{self, BoardTexture, HandStrength};
use crate::canonical::CanonicalHand;
use crate::card::Board;
use crate::equity;
use crate::error::{SolverError, SolverResult};
use crate::game::{Action, GameConfig, GameState, MaxBetsPerStreet, Position};
use crate::infoset::{info_key, InfoSetStore};
use crate::range::Range;

fn default_bet_sizes() -> Vec<f64> {
    vec![0.33, 0.5, 0.75, 1.0, 1.5, 2.0]
}
fn default_allow_all_in() -> bool {
    true
}
fn default_min_raise_fraction() -> f64 {
    0.5
}
fn default_iterations() -> u64 {
    100_000
}
fn default_convergence_threshold() -> f64 {
    1e-3
}
fn default_check_interval() -> u64 {
    1_000
}
fn default_showdown_samples() -> usize {
    200
}
fn default_analytics_samples() -> usize {
    500
}

/// Consecutive sampling-skips (spec §7's "Sampling-skip", identical
/// canonical hands drawn for both players) before `Solver::run` gives up on
/// the budget instead of spinning forever. Hit only when both ranges reduce
/// to the same single hand.
const MAX_CONSECUTIVE_SKIPS: u64 = 10_000;

/// A solve request: ranges, board, stakes, and betting abstraction — the
/// library's sole externally-facing input contract (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Out-of-position range notation (spec §4.2 grammar).
    pub oop_range: String,
    /// In-position range notation.
    pub ip_range: String,
    /// Board as a space-separated two-character card string; 0, 3, 4, or 5
    /// cards. Empty string means preflop.
    #[serde(default)]
    pub board: String,
    /// Starting pot size.
    pub pot: f64,
    /// Each player's starting stack for this subgame.
    pub starting_stack: f64,
    /// Ordered pot-fraction bet sizes offered at every decision.
    #[serde(default = "default_bet_sizes")]
    pub bet_sizes: Vec<f64>,
    /// Per-street bet/raise caps.
    #[serde(default)]
    pub max_bets_per_street: MaxBetsPerStreet,
    /// Whether to append a distinct all-in action.
    #[serde(default = "default_allow_all_in")]
    pub allow_all_in: bool,
    /// Minimum raise size, as a pot fraction, for a raise to be offered.
    #[serde(default = "default_min_raise_fraction")]
    pub min_raise_fraction: f64,
    /// Iteration budget.
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Convergence threshold on the average-strategy L1 checkpoint metric.
    #[serde(default = "default_convergence_threshold")]
    pub convergence_threshold: f64,
    /// Iterations between convergence checkpoints. Ambient knob, not named
    /// in spec §6, added because the convergence metric needs a cadence.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    /// Monte-Carlo sample count used for each showdown payoff evaluated
    /// during CFR recursion. Ambient performance knob (spec §4.4 names the
    /// algorithm, not the per-call sample budget).
    #[serde(default = "default_showdown_samples")]
    pub showdown_samples: usize,
    /// Sample count used for the post-solve per-hand analytics of §4.7.
    #[serde(default = "default_analytics_samples")]
    pub analytics_samples: usize,
    /// Optional PRNG seed for deterministic solves (spec §4.6's determinism
    /// property, S6).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SolveRequest {
    /// Validate and lower this request into its internal pieces: parsed
    /// ranges, board, and a `GameConfig`. Returns the boundary errors of
    /// spec §6/§7: `EmptyRange`, `ConflictingBoard`, `InvalidConfig`,
    /// `BadCardFormat`.
    fn build(&self) -> SolverResult<(Range, Range, Board, GameConfig)> {
        let oop_range = Range::from_notation(&self.oop_range).expect("range parsing is infallible");
        let ip_range = Range::from_notation(&self.ip_range).expect("range parsing is infallible");
        if oop_range.iter_nonzero().next().is_none() {
            return Err(SolverError::EmptyRange);
        }
        if ip_range.iter_nonzero().next().is_none() {
            return Err(SolverError::EmptyRange);
        }

        let board = Board::from_str(&self.board)?;

        let config = GameConfig {
            bet_sizes: self.bet_sizes.clone(),
            max_bets_per_street: self.max_bets_per_street,
            allow_all_in: self.allow_all_in,
            min_raise_fraction: self.min_raise_fraction,
        };
        config.validate()?;

        if self.pot <= 0.0 || self.starting_stack <= 0.0 {
            return Err(SolverError::InvalidConfig(
                "pot and starting_stack must be positive".to_string(),
            ));
        }

        Ok((oop_range, ip_range, board, config))
    }

    /// Load a `SolveRequest` from a JSON file on disk.
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> SolverResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let request: Self = serde_json::from_str(&content)?;
        Ok(request)
    }
}

impl Default for SolveRequest {
    fn default() -> Self {
        Self {
            oop_range: String::new(),
            ip_range: String::new(),
            board: String::new(),
            pot: 1.0,
            starting_stack: 100.0,
            bet_sizes: default_bet_sizes(),
            max_bets_per_street: MaxBetsPerStreet::default(),
            allow_all_in: default_allow_all_in(),
            min_raise_fraction: default_min_raise_fraction(),
            iterations: default_iterations(),
            convergence_threshold: default_convergence_threshold(),
            check_interval: default_check_interval(),
            showdown_samples: default_showdown_samples(),
            analytics_samples: default_analytics_samples(),
            seed: None,
        }
    }
}

/// One checkpoint in the convergence trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    /// Iteration number this checkpoint was taken at.
    pub iteration: u64,
    /// Average L1 change in per-infoset average strategy since the
    /// previous checkpoint.
    pub l1_change: f64,
}

/// The solve output: average strategies, convergence diagnostics, and
/// per-hand analytics (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    /// OOP's average strategy: canonical hand (or `"{hand}@{history}"` for
    /// infosets reached past the root) to `{action-string: probability}`.
    pub oop_strategy: BTreeMap<String, BTreeMap<String, f64>>,
    /// IP's average strategy, same shape as `oop_strategy`.
    pub ip_strategy: BTreeMap<String, BTreeMap<String, f64>>,
    /// Iterations actually counted toward the budget (sampling-skips do
    /// not count, per spec §7).
    pub iterations_performed: u64,
    /// Distinct information sets discovered.
    pub nodes_count: usize,
    /// Convergence trace, one point per `check_interval` iterations.
    pub convergence_history: Vec<ConvergencePoint>,
    /// The last-recorded convergence metric.
    pub final_convergence: f64,
    /// Whether the solve stopped because it met `convergence_threshold`
    /// (`true`) or exhausted the iteration budget / was cancelled
    /// (`false`, not an error — spec §7's "Convergence-not-met").
    pub converged: bool,
    /// Board texture classification, present for 3+ board cards.
    pub board_texture: Option<BoardTexture>,
    /// Per-hand analytics for OOP's range against IP's range.
    pub oop_analytics: BTreeMap<String, HandStrength>,
    /// Per-hand analytics for IP's range against OOP's range.
    pub ip_analytics: BTreeMap<String, HandStrength>,
}

/// One CFR solve: owns the information-set store for its lifetime. Not
/// `Send`/`Sync` (the store and `Rc<GameConfig>` are single-threaded); a
/// concurrent solve requires a distinct `Solver`, per spec §3's "concurrent
/// solves require distinct engines."
pub struct Solver {
    config: Rc<GameConfig>,
    board: Board,
    pot: f64,
    starting_stack: f64,
    oop_range: Range,
    ip_range: Range,
    showdown_samples: usize,
    analytics_samples: usize,
    store: InfoSetStore,
    action_sets: FxHashMap<String, Vec<Action>>,
    rng: StdRng,
}

impl Solver {
    /// Build a solver from a validated request.
    pub fn new(request: &SolveRequest) -> SolverResult<Self> {
        let (oop_range, ip_range, board, config) = request.build()?;
        let rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config: Rc::new(config),
            board,
            pot: request.pot,
            starting_stack: request.starting_stack,
            oop_range,
            ip_range,
            showdown_samples: request.showdown_samples,
            analytics_samples: request.analytics_samples,
            store: InfoSetStore::new(),
            action_sets: FxHashMap::default(),
            rng,
        })
    }

    /// Discard all trained information sets, keeping ranges/board/config.
    /// The engine's `reset()` contract from spec §3.
    pub fn reset(&mut self) {
        self.store = InfoSetStore::new();
        self.action_sets.clear();
    }

    /// Number of distinct information sets visited so far.
    pub fn nodes_count(&self) -> usize {
        self.store.len()
    }

    /// Run up to `iterations` CFR iterations (or until `cancel` trips or
    /// the convergence metric drops below `convergence_threshold`),
    /// checkpointing every `check_interval` iterations.
    ///
    /// `cancel` is checked between iterations, per spec §5's cooperative
    /// cancellation contract; on trip, returns the best-so-far strategy
    /// without error.
    pub fn run(
        &mut self,
        iterations: u64,
        convergence_threshold: f64,
        check_interval: u64,
        cancel: &AtomicBool,
    ) -> RunStats {
        let mut performed = 0u64;
        let mut history = Vec::new();
        let mut prev_snapshot = self.store.snapshot();
        let mut final_convergence = f64::INFINITY;
        let mut converged = false;
        let mut consecutive_skips = 0u64;

        while performed < iterations {
            if cancel.load(Ordering::Relaxed) {
                break;
            }

            let (Some(oop_hand), Some(ip_hand)) =
                (self.oop_range.sample(&mut self.rng), self.ip_range.sample(&mut self.rng))
            else {
                // EmptyRange is already rejected at construction; ranges
                // cannot become empty mid-solve.
                break;
            };

            // Sampling-skip (spec §7, §9 Open Question 3): literal
            // canonical-hand equality, not physical card overlap. If both
            // ranges only ever offer one shared hand (e.g. both "AA"), every
            // sample skips forever; bail out once that's evident instead of
            // spinning without ever incrementing `performed`.
            if oop_hand == ip_hand {
                consecutive_skips += 1;
                if consecutive_skips >= MAX_CONSECUTIVE_SKIPS {
                    break;
                }
                continue;
            }
            consecutive_skips = 0;

            let root = GameState::new_root(
                self.config.clone(),
                self.board.clone(),
                self.pot,
                self.starting_stack,
                Position::Oop,
            );
            let mut ctx = CfrContext {
                store: &mut self.store,
                action_sets: &mut self.action_sets,
                board: &self.board,
                showdown_samples: self.showdown_samples,
                rng: &mut self.rng,
            };
            cfr(&root, oop_hand, ip_hand, 1.0, 1.0, &mut ctx);
            performed += 1;

            if performed % check_interval.max(1) == 0 {
                let l1 = self.store.convergence_since(&prev_snapshot);
                history.push(ConvergencePoint {
                    iteration: performed,
                    l1_change: l1,
                });
                prev_snapshot = self.store.snapshot();
                final_convergence = l1;
                if l1 < convergence_threshold {
                    converged = true;
                    break;
                }
            }
        }

        RunStats {
            iterations_performed: performed,
            convergence_history: history,
            final_convergence,
            converged,
        }
    }

    /// Extract the solve response: average strategies, convergence trace,
    /// and per-hand analytics.
    pub fn response(&self, stats: RunStats) -> SolveResponse {
        let mut rng = self.rng.clone();

        let mut oop_analytics = BTreeMap::new();
        for (hand, _) in self.oop_range.iter_nonzero() {
            let record = analyzer::analyze_hand(
                hand,
                &self.board,
                &self.ip_range,
                self.analytics_samples,
                &mut rng,
            );
            oop_analytics.insert(hand.to_string(), record);
        }
        let mut ip_analytics = BTreeMap::new();
        for (hand, _) in self.ip_range.iter_nonzero() {
            let record = analyzer::analyze_hand(
                hand,
                &self.board,
                &self.oop_range,
                self.analytics_samples,
                &mut rng,
            );
            ip_analytics.insert(hand.to_string(), record);
        }

        SolveResponse {
            oop_strategy: self.strategy_map(Position::Oop),
            ip_strategy: self.strategy_map(Position::Ip),
            iterations_performed: stats.iterations_performed,
            nodes_count: self.store.len(),
            convergence_history: stats.convergence_history,
            final_convergence: stats.final_convergence,
            converged: stats.converged,
            board_texture: analyzer::board_texture(&self.board),
            oop_analytics,
            ip_analytics,
        }
    }

    /// Average strategy for every infoset belonging to `player`, keyed by
    /// canonical hand (bare for the root infoset, `"{hand}@{history}"` for
    /// any infoset reached deeper in the tree).
    fn strategy_map(&self, player: Position) -> BTreeMap<String, BTreeMap<String, f64>> {
        let prefix = format!("{}|", player);
        let mut out = BTreeMap::new();
        for (key, actions) in &self.action_sets {
            if !key.starts_with(&prefix) {
                continue;
            }
            let mut parts = key.splitn(4, '|');
            parts.next(); // player
            let hand = parts.next().unwrap_or_default();
            parts.next(); // board
            let history = parts.next().unwrap_or_default();

            let label = if history.is_empty() {
                hand.to_string()
            } else {
                format!("{}@{}", hand, history)
            };

            let sigma = self.store.average_strategy(key, actions.len());
            let action_probs: BTreeMap<String, f64> = actions
                .iter()
                .zip(sigma.iter())
                .map(|(a, &p)| (a.short_code(), p))
                .collect();
            out.insert(label, action_probs);
        }
        out
    }
}

/// Result of a [`Solver::run`] call.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Iterations actually counted toward the budget.
    pub iterations_performed: u64,
    /// Convergence checkpoints recorded during this run.
    pub convergence_history: Vec<ConvergencePoint>,
    /// The last-recorded convergence metric (infinite if no checkpoint was
    /// reached).
    pub final_convergence: f64,
    /// Whether the run stopped by meeting the convergence threshold.
    pub converged: bool,
}

struct CfrContext<'a, R: Rng> {
    store: &'a mut InfoSetStore,
    action_sets: &'a mut FxHashMap<String, Vec<Action>>,
    board: &'a Board,
    showdown_samples: usize,
    rng: &'a mut R,
}

/// The recursive CFR step of spec §4.6: explores every legal action at
/// every node, carrying both players' reach probabilities, and credits the
/// acting infoset's regret with the opponent's reach weight only.
fn cfr<R: Rng>(
    state: &GameState,
    oop_hand: CanonicalHand,
    ip_hand: CanonicalHand,
    reach_oop: f64,
    reach_ip: f64,
    ctx: &mut CfrContext<R>,
) -> (f64, f64) {
    if state.is_terminal() {
        if state.folded().is_some() {
            return state.fold_payoffs();
        }
        let e_oop = equity::equity_vs_hand(oop_hand, ip_hand, ctx.board, ctx.showdown_samples, ctx.rng).equity;
        return state.showdown_payoffs(e_oop);
    }

    let actor = state.to_act().expect("non-terminal state has an actor");
    let actions = state.legal_actions();
    if actions.is_empty() {
        // Abstraction-empty (spec §7): treat as a checked-down showdown.
        let e_oop = equity::equity_vs_hand(oop_hand, ip_hand, ctx.board, ctx.showdown_samples, ctx.rng).equity;
        return state.showdown_payoffs(e_oop);
    }

    let hand = match actor {
        Position::Oop => oop_hand,
        Position::Ip => ip_hand,
    };
    let reach_actor = match actor {
        Position::Oop => reach_oop,
        Position::Ip => reach_ip,
    };
    let reach_opponent = match actor {
        Position::Oop => reach_ip,
        Position::Ip => reach_oop,
    };

    let key = info_key(actor, hand, ctx.board, &state.history_string());
    ctx.action_sets
        .entry(key.clone())
        .or_insert_with(|| actions.clone());
    let sigma = ctx.store.strategy(&key, actions.len(), reach_actor);

    let mut util_oop = Vec::with_capacity(actions.len());
    let mut util_ip = Vec::with_capacity(actions.len());
    for (i, &action) in actions.iter().enumerate() {
        let next = state.apply(action);
        let (next_reach_oop, next_reach_ip) = match actor {
            Position::Oop => (reach_oop * sigma[i], reach_ip),
            Position::Ip => (reach_oop, reach_ip * sigma[i]),
        };
        let (u_oop, u_ip) = cfr(&next, oop_hand, ip_hand, next_reach_oop, next_reach_ip, ctx);
        util_oop.push(u_oop);
        util_ip.push(u_ip);
    }

    let node_oop: f64 = sigma.iter().zip(&util_oop).map(|(s, u)| s * u).sum();
    let node_ip: f64 = sigma.iter().zip(&util_ip).map(|(s, u)| s * u).sum();

    let (actor_utils, node_actor_util) = match actor {
        Position::Oop => (&util_oop, node_oop),
        Position::Ip => (&util_ip, node_ip),
    };
    let regret_updates: Vec<f64> = actor_utils
        .iter()
        .map(|&u| reach_opponent * (u - node_actor_util))
        .collect();
    ctx.store.add_regret(&key, &regret_updates);

    (node_oop, node_ip)
}

/// Run a full solve end to end: validate, train, and extract the response.
/// The single entry point binaries call.
pub fn solve(request: &SolveRequest) -> SolverResult<SolveResponse> {
    let mut solver = Solver::new(request)?;
    let cancel = AtomicBool::new(false);
    let stats = solver.run(
        request.iterations,
        request.convergence_threshold,
        request.check_interval,
        &cancel,
    );
    Ok(solver.response(stats))
}

/// Solve many independent subgames concurrently, one [`Solver`] per request
/// sharded across a rayon thread pool (spec §5's optional parallel entry
/// point). Each request gets its own single-threaded engine — there is no
/// shared mutable state to synchronize, only independent solves fanned out
/// the way the teacher's 8-max binary fans independent spots across
/// `par_iter`.
pub fn solve_many(requests: &[SolveRequest]) -> Vec<SolverResult<SolveResponse>> {
    use rayon::prelude::*;
    requests.par_iter().map(solve).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_request(seed: u64) -> SolveRequest {
        SolveRequest {
            oop_range: "AA".to_string(),
            ip_range: "KK".to_string(),
            board: String::new(),
            pot: 1.0,
            starting_stack: 100.0,
            bet_sizes: vec![1.0],
            max_bets_per_street: MaxBetsPerStreet {
                preflop: 1,
                flop: 1,
                turn: 1,
                river: 1,
            },
            allow_all_in: false,
            min_raise_fraction: 0.5,
            iterations: 50_000,
            convergence_threshold: 0.0, // run the full budget, don't early-stop
            check_interval: 5_000,
            showdown_samples: 1, // AA vs KK never reaches showdown ties in this tree anyway
            analytics_samples: 50,
            seed: Some(seed),
        }
    }

    #[test]
    fn s3_oop_bets_aa_almost_always() {
        let response = solve(&s3_request(42)).unwrap();
        let root = response.oop_strategy.get("AA").expect("AA root infoset");
        let bet_key = root.keys().find(|k| k.starts_with('B')).unwrap();
        assert!(
            root[bet_key] >= 0.95,
            "OOP with AA should bet with probability >= 0.95, got {}",
            root[bet_key]
        );
    }

    #[test]
    fn s6_determinism_same_seed_same_output() {
        let a = solve(&s3_request(7)).unwrap();
        let b = solve(&s3_request(7)).unwrap();
        assert_eq!(a.oop_strategy, b.oop_strategy);
        assert_eq!(a.ip_strategy, b.ip_strategy);
        assert_eq!(a.convergence_history.len(), b.convergence_history.len());
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut request = s3_request(1);
        request.oop_range = "".to_string();
        assert!(matches!(Solver::new(&request), Err(SolverError::EmptyRange)));
    }

    #[test]
    fn conflicting_board_is_rejected() {
        let mut request = s3_request(1);
        request.board = "Kd Kd 2s".to_string();
        assert!(matches!(
            Solver::new(&request),
            Err(SolverError::ConflictingBoard(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut request = s3_request(1);
        request.bet_sizes = vec![-1.0];
        assert!(matches!(
            Solver::new(&request),
            Err(SolverError::InvalidConfig(_))
        ));
    }

    #[test]
    fn cancellation_stops_before_iteration_budget() {
        let request = s3_request(3);
        let mut solver = Solver::new(&request).unwrap();
        let cancel = AtomicBool::new(true);
        let stats = solver.run(request.iterations, request.convergence_threshold, request.check_interval, &cancel);
        assert_eq!(stats.iterations_performed, 0);
        assert!(!stats.converged);
    }

    #[test]
    fn identical_singleton_ranges_terminate_instead_of_hanging() {
        let mut request = s3_request(1);
        request.oop_range = "AA".to_string();
        request.ip_range = "AA".to_string();
        let response = solve(&request).unwrap();
        assert_eq!(response.iterations_performed, 0);
        assert!(!response.converged);
        assert_eq!(response.nodes_count, 0);
    }

    #[test]
    fn reset_clears_trained_state() {
        let request = s3_request(5);
        let mut solver = Solver::new(&request).unwrap();
        let cancel = AtomicBool::new(false);
        solver.run(1_000, 0.0, 5_000, &cancel);
        assert!(solver.nodes_count() > 0);
        solver.reset();
        assert_eq!(solver.nodes_count(), 0);
    }

    #[test]
    fn solve_many_runs_each_request_independently() {
        let requests = vec![s3_request(1), s3_request(2), s3_request(3)];
        let responses: Vec<SolveResponse> = solve_many(&requests)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        for response in &responses {
            assert!(response.oop_strategy.contains_key("AA"));
        }
    }

    #[test]
    fn response_includes_board_texture_only_with_board() {
        let mut request = s3_request(1);
        request.iterations = 100;
        request.board = String::new();
        let response = solve(&request).unwrap();
        assert!(response.board_texture.is_none());

        request.board = "Kd Qc 2s".to_string();
        let response = solve(&request).unwrap();
        assert!(response.board_texture.is_some());
    }
}
