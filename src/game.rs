//! Game-tree abstraction: `GameConfig`, `Action`, and `GameState` — legal
//! action enumeration, terminal classification, and payoff computation.

use crate::card::{Board, Street};
use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Per-street caps on the number of bets/raises the abstraction allows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxBetsPerStreet {
    /// Cap on preflop.
    pub preflop: u32,
    /// Cap on the flop.
    pub flop: u32,
    /// Cap on the turn.
    pub turn: u32,
    /// Cap on the river.
    pub river: u32,
}

impl Default for MaxBetsPerStreet {
    fn default() -> Self {
        Self {
            preflop: 4,
            flop: 3,
            turn: 2,
            river: 1,
        }
    }
}

impl MaxBetsPerStreet {
    /// The cap for a given street.
    pub fn cap(&self, street: Street) -> u32 {
        match street {
            Street::Preflop => self.preflop,
            Street::Flop => self.flop,
            Street::Turn => self.turn,
            Street::River => self.river,
        }
    }
}

/// The betting abstraction: bet-size fractions, per-street caps, and
/// all-in handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Ordered set of bet-size fractions of the current pot.
    pub bet_sizes: Vec<f64>,
    /// Per-street bet/raise caps.
    pub max_bets_per_street: MaxBetsPerStreet,
    /// Whether to append an all-in action distinct from the sized bets.
    pub allow_all_in: bool,
    /// Minimum raise size, as a fraction of the pot, for a raise to be
    /// offered as a distinct action from calling.
    pub min_raise_fraction: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bet_sizes: vec![0.33, 0.5, 0.75, 1.0, 1.5, 2.0],
            max_bets_per_street: MaxBetsPerStreet::default(),
            allow_all_in: true,
            min_raise_fraction: 0.5,
        }
    }
}

impl GameConfig {
    /// Validate bet sizes are positive and caps/min-raise are sane.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.bet_sizes.iter().any(|&f| f <= 0.0) {
            return Err(SolverError::InvalidConfig(
                "bet_sizes must all be positive".to_string(),
            ));
        }
        if self.min_raise_fraction <= 0.0 {
            return Err(SolverError::InvalidConfig(
                "min_raise_fraction must be positive".to_string(),
            ));
        }
        let caps = &self.max_bets_per_street;
        if caps.preflop > 4 || caps.flop > 4 || caps.turn > 4 || caps.river > 4 {
            return Err(SolverError::InvalidConfig(
                "max_bets_per_street must be within [0, 4]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which player acts: out of position (acts first postflop) or in
/// position (acts last postflop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Out of position.
    Oop,
    /// In position.
    Ip,
}

impl Position {
    /// The other player.
    pub fn opponent(&self) -> Self {
        match self {
            Position::Oop => Position::Ip,
            Position::Ip => Position::Oop,
        }
    }

    /// Array index (0 = OOP, 1 = IP) for indexing per-player arrays.
    pub fn index(&self) -> usize {
        match self {
            Position::Oop => 0,
            Position::Ip => 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Oop => write!(f, "OOP"),
            Position::Ip => write!(f, "IP"),
        }
    }
}

/// A legal action. `amount` on `Call`/`Bet` is the absolute number of
/// chips the acting player puts in with this action (not a "raised to"
/// total).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Forfeit the hand.
    Fold,
    /// Decline to bet when facing no wager.
    Check,
    /// Match the outstanding wager.
    Call(f64),
    /// Wager chips, either opening betting or raising.
    Bet(f64),
}

impl Action {
    /// The stable action-string code: `F`, `X`, `C`, or `B<amount>` with
    /// the amount to one decimal place.
    pub fn short_code(&self) -> String {
        match self {
            Action::Fold => "F".to_string(),
            Action::Check => "X".to_string(),
            Action::Call(_) => "C".to_string(),
            Action::Bet(amount) => format!("B{:.1}", amount),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_code())
    }
}

/// A decision node in the subgame tree.
///
/// `config` is held by reference-counted pointer rather than copied into
/// every recursive call, matching the "global configuration" design note:
/// one immutable value shared by the whole tree.
#[derive(Debug, Clone)]
pub struct GameState {
    config: Rc<GameConfig>,
    board: Board,
    street: Street,
    /// Total chips each player has invested in the pot, indexed by
    /// [`Position::index`]. `pot() == invested[0] + invested[1]`.
    invested: [f64; 2],
    /// Remaining stack behind, indexed by [`Position::index`].
    stacks: [f64; 2],
    to_act: Option<Position>,
    history: Vec<Action>,
    bet_count: u32,
    folded: Option<Position>,
    terminal: bool,
}

impl GameState {
    /// Build the root state: `pot` is split evenly between the players as
    /// their invested total (the request does not distinguish asymmetric
    /// prior contributions), and both start with `starting_stack` behind.
    pub fn new_root(
        config: Rc<GameConfig>,
        board: Board,
        pot: f64,
        starting_stack: f64,
        first_to_act: Position,
    ) -> Self {
        let street = board.street();
        Self {
            config,
            board,
            street,
            invested: [pot / 2.0, pot / 2.0],
            stacks: [starting_stack, starting_stack],
            to_act: Some(first_to_act),
            history: Vec::new(),
            bet_count: 0,
            folded: None,
            terminal: false,
        }
    }

    /// Total chips in the pot.
    pub fn pot(&self) -> f64 {
        self.invested[0] + self.invested[1]
    }

    /// Player to act, or `None` if terminal.
    pub fn to_act(&self) -> Option<Position> {
        self.to_act
    }

    /// Whether this node is terminal (fold, showdown, or both-all-in).
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// The player who folded, if any.
    pub fn folded(&self) -> Option<Position> {
        self.folded
    }

    /// The board this subgame is fixed on.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The history string for this node's action sequence, e.g. `"B6.0-C"`.
    pub fn history_string(&self) -> String {
        self.history
            .iter()
            .map(|a| a.short_code())
            .collect::<Vec<_>>()
            .join("-")
    }

    fn to_call(&self, actor: Position) -> f64 {
        let opp = actor.opponent();
        (self.invested[opp.index()] - self.invested[actor.index()]).max(0.0)
    }

    /// Enumerate legal actions at this node. Empty if terminal.
    pub fn legal_actions(&self) -> Vec<Action> {
        let Some(actor) = self.to_act else {
            return Vec::new();
        };
        let to_call = self.to_call(actor);
        let stack = self.stacks[actor.index()];
        let cap = self.config.max_bets_per_street.cap(self.street);
        let can_raise = self.bet_count < cap;

        let mut actions = Vec::new();
        let min_threshold = to_call + self.config.min_raise_fraction * self.pot();

        if to_call > 0.0 {
            actions.push(Action::Fold);
            actions.push(Action::Call(to_call.min(stack)));

            if can_raise {
                let pot_post_call = self.pot() + to_call;
                for &fraction in &self.config.bet_sizes {
                    let raise_size = fraction * pot_post_call;
                    let candidate = (to_call + raise_size).min(stack);
                    if candidate > min_threshold {
                        push_unique_bet(&mut actions, candidate);
                    }
                }
                if self.config.allow_all_in && stack > to_call {
                    push_unique_bet(&mut actions, stack);
                }
            }
        } else {
            actions.push(Action::Check);

            if can_raise {
                let pot_now = self.pot();
                for &fraction in &self.config.bet_sizes {
                    let candidate = (fraction * pot_now).min(stack);
                    if candidate > min_threshold {
                        push_unique_bet(&mut actions, candidate);
                    }
                }
                if self.config.allow_all_in && stack > 0.0 {
                    push_unique_bet(&mut actions, stack);
                }
            }
        }

        actions
    }

    /// Apply an action, returning the resulting state.
    pub fn apply(&self, action: Action) -> GameState {
        let mut next = self.clone();
        let actor = self.to_act.expect("apply called on terminal state");
        next.history.push(action);

        match action {
            Action::Fold => {
                next.folded = Some(actor);
                next.terminal = true;
                next.to_act = None;
            }
            Action::Check => {
                if matches!(self.history.last(), Some(Action::Check)) {
                    next.terminal = true;
                    next.to_act = None;
                } else {
                    next.to_act = Some(actor.opponent());
                }
            }
            Action::Call(amount) => {
                let idx = actor.index();
                let amount = amount.min(next.stacks[idx]);
                next.stacks[idx] -= amount;
                next.invested[idx] += amount;
                next.terminal = true;
                next.to_act = None;
            }
            Action::Bet(amount) => {
                let idx = actor.index();
                let amount = amount.min(next.stacks[idx]);
                next.stacks[idx] -= amount;
                next.invested[idx] += amount;
                next.bet_count += 1;
                next.to_act = Some(actor.opponent());
            }
        }

        if next.stacks[0] <= 0.0 && next.stacks[1] <= 0.0 {
            next.terminal = true;
            next.to_act = None;
        }

        next
    }

    /// Fold-terminal payoffs: `(u_oop, u_ip)`. The folding player loses
    /// its invested total; the opponent wins the same amount (zero-sum
    /// since `pot() == invested[0] + invested[1]`).
    pub fn fold_payoffs(&self) -> (f64, f64) {
        let folder = self.folded.expect("fold_payoffs called without a fold");
        let loss = self.invested[folder.index()];
        match folder {
            Position::Oop => (-loss, loss),
            Position::Ip => (loss, -loss),
        }
    }

    /// Showdown payoffs given OOP's equity `e_oop` in `[0, 1]`:
    /// `u_player = e_player * pot() - invested[player]`.
    pub fn showdown_payoffs(&self, e_oop: f64) -> (f64, f64) {
        let pot = self.pot();
        let u_oop = e_oop * pot - self.invested[Position::Oop.index()];
        let u_ip = (1.0 - e_oop) * pot - self.invested[Position::Ip.index()];
        (u_oop, u_ip)
    }
}

fn push_unique_bet(actions: &mut Vec<Action>, amount: f64) {
    let already_present = actions.iter().any(|a| match a {
        Action::Bet(existing) => (existing - amount).abs() < 1e-9,
        _ => false,
    });
    if !already_present && amount > 0.0 {
        actions.push(Action::Bet(amount));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Board;

    fn root(pot: f64, stack: f64) -> GameState {
        GameState::new_root(
            Rc::new(GameConfig::default()),
            Board::new(),
            pot,
            stack,
            Position::Oop,
        )
    }

    #[test]
    fn fold_payoffs_match_s4() {
        let config = Rc::new(GameConfig::default());
        let mut state = GameState::new_root(config, Board::new(), 15.0, 100.0, Position::Oop);
        // Force the S4 invested split directly: oop_invested=10, ip_invested=5.
        state.invested = [10.0, 5.0];
        let folded = state.apply(Action::Fold);
        let (u_oop, u_ip) = folded.fold_payoffs();
        assert_eq!(u_oop, -10.0);
        assert_eq!(u_ip, 10.0);
    }

    #[test]
    fn check_check_is_terminal() {
        let state = root(10.0, 100.0);
        let state = state.apply(Action::Check);
        assert!(!state.is_terminal());
        let state = state.apply(Action::Check);
        assert!(state.is_terminal());
    }

    #[test]
    fn bet_then_call_is_terminal() {
        let state = root(10.0, 100.0);
        let state = state.apply(Action::Bet(5.0));
        assert!(!state.is_terminal());
        let state = state.apply(Action::Call(5.0));
        assert!(state.is_terminal());
    }

    #[test]
    fn showdown_payoffs_are_zero_sum() {
        let state = root(15.0, 100.0);
        let (u_oop, u_ip) = state.showdown_payoffs(0.7);
        assert!((u_oop + u_ip).abs() < 1e-9);
    }

    #[test]
    fn legal_actions_include_fold_and_call_when_facing_a_bet() {
        let state = root(10.0, 100.0).apply(Action::Bet(5.0));
        let actions = state.legal_actions();
        assert!(actions.contains(&Action::Fold));
        assert!(actions.iter().any(|a| matches!(a, Action::Call(_))));
    }

    #[test]
    fn bet_cap_eventually_removes_betting_actions() {
        let mut config = GameConfig::default();
        config.max_bets_per_street.flop = 0;
        let state = GameState::new_root(
            Rc::new(config),
            Board::from_str("Kd Qc 2s").unwrap(),
            10.0,
            100.0,
            Position::Oop,
        );
        let actions = state.legal_actions();
        assert_eq!(actions, vec![Action::Check]);
    }

    #[test]
    fn all_in_by_both_players_is_terminal() {
        let config = Rc::new(GameConfig::default());
        let state = GameState::new_root(config, Board::new(), 10.0, 5.0, Position::Oop);
        let state = state.apply(Action::Bet(5.0));
        let state = state.apply(Action::Call(5.0));
        assert!(state.is_terminal());
        assert!(state.folded().is_none());
    }
}
