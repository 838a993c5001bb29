//! # eGTO Solver
//!
//! An approximate Game-Theory-Optimal (GTO) solver for two-player no-limit
//! Texas Hold'em subgames. Given two opponents' ranges, a (possibly empty)
//! community board, a pot, stacks, and a betting abstraction, external
//! sampling counterfactual regret minimization (CFR) produces, per
//! information set, a probability distribution over legal actions
//! approximating a Nash equilibrium, along with convergence diagnostics and
//! per-hand analytics.
//!
//! ## Quick Start
//!
//! ```
//! use egto_solver::solver::{solve, SolveRequest};
//!
//! let request = SolveRequest {
//!     oop_range: "AA".to_string(),
//!     ip_range: "KK".to_string(),
//!     iterations: 2_000,
//!     ..Default::default()
//! };
//! let response = solve(&request).unwrap();
//! assert!(response.oop_strategy.contains_key("AA"));
//! ```
//!
//! ## Modules
//!
//! - [`card`]: card, hole-card, board, and deck primitives (C1).
//! - [`canonical`]: the 169-symbol canonical starting-hand abstraction (C1).
//! - [`hand_eval`]: 5–7 card poker hand evaluation (C1).
//! - [`range`]: weighted range model and textual grammar (C2).
//! - [`equity`]: Monte-Carlo hand-vs-hand and hand-vs-range equity (C3).
//! - [`game`]: betting abstraction, legal actions, terminals, payoffs (C4).
//! - [`infoset`]: regret-matching information-set store (C5).
//! - [`solver`]: the CFR driver, iteration loop, and `SolveRequest`/
//!   `SolveResponse` contracts (C6).
//! - [`analyzer`]: board texture and per-hand strength analytics (C7).
//! - [`error`]: the boundary error taxonomy.
//!
//! Out of scope, per the engine's own boundary: HTTP surfaces, request
//! schemas, CORS, and neural-network value networks. Those are external
//! collaborators of this library, not part of it.

#![warn(missing_docs)]

/// Card, hole-card, board, and deck primitives.
pub mod card;

/// The 169-symbol canonical starting-hand abstraction.
pub mod canonical;

/// 5-to-7 card poker hand evaluation.
pub mod hand_eval;

/// Weighted range model: textual grammar, sampling, iteration.
pub mod range;

/// Monte-Carlo equity estimation.
pub mod equity;

/// Game-tree abstraction: betting config, actions, states, payoffs.
pub mod game;

/// Information-set store: regret-matching and average strategy.
pub mod infoset;

/// The CFR driver, iteration loop, and external data contracts.
pub mod solver;

/// Board texture classification and per-hand strength analytics.
pub mod analyzer;

/// The boundary error taxonomy.
pub mod error;

pub use canonical::CanonicalHand;
pub use error::{SolverError, SolverResult};
pub use game::{Action, GameConfig, GameState, Position};
pub use solver::{solve, solve_many, SolveRequest, SolveResponse, Solver};
