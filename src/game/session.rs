//! Game Sessions
//!
//! One session per player: the claimed target, the frozen stats, the
//! server-side puzzle and the accepted move history. Sessions are plain
//! data, so the whole struct round-trips through the session store as
//! JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{GameRng, Seed};
use crate::game::codebreak::{CodeBreakingConfig, CodeBreakingResult, CodeBreakingState};
use crate::game::gridsearch::{GridSearchConfig, GridSearchResult, GridSearchState};
use crate::game::pathlink::{PathClaim, PathLinkingConfig, PathLinkingResult, PathLinkingState};
use crate::game::score;
use crate::game::target::{GameKind, ScanTarget};

/// Stable player identity across the engine and its collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Fresh random identity.
    pub fn new() -> Self {
        PlayerId(Uuid::new_v4())
    }

    /// Raw bytes, used for seed derivation.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player combat stats frozen at session start.
///
/// Resolution reads this copy exclusively, so a mid-session gear swap
/// cannot change the odds of a run that already started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Effective hack power after health scaling.
    pub hack_power: i64,
    /// Stealth including detection-reduction gear.
    pub stealth: i64,
    /// Defense rating.
    pub defense: i64,
    /// Percent bonus to credit payouts.
    pub credit_bonus: f64,
    /// Percent bonus to data payouts.
    pub data_bonus: f64,
    /// Flat detection reduction already folded into `stealth`.
    pub detection_reduction: i64,
    /// Health scaling already folded into `hack_power`.
    pub health_multiplier: f64,
    /// Multiplier on credit and data payouts.
    pub hack_reward_multiplier: f64,
    /// Multiplier on experience gains.
    pub xp_gain_multiplier: f64,
    /// Multiplier on detection chance.
    pub detection_chance_multiplier: f64,
}

impl StatsSnapshot {
    /// Neutral snapshot: no gear bonuses, full health.
    pub fn baseline(hack_power: i64, stealth: i64) -> Self {
        StatsSnapshot {
            hack_power,
            stealth,
            defense: 0,
            credit_bonus: 0.0,
            data_bonus: 0.0,
            detection_reduction: 0,
            health_multiplier: 1.0,
            hack_reward_multiplier: 1.0,
            xp_gain_multiplier: 1.0,
            detection_chance_multiplier: 1.0,
        }
    }
}

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The session was already resolved.
    #[error("Session already resolved")]
    Resolved,

    /// The session clock ran out before the move arrived.
    #[error("Session expired")]
    Expired,

    /// The move does not belong to this puzzle discipline.
    #[error("Session expects a {expected} move")]
    WrongKind {
        /// The discipline this session runs.
        expected: GameKind,
    },

    /// Wrong number of digits in a guess.
    #[error("Guess must be exactly {expected} digits")]
    GuessLength {
        /// Required guess length.
        expected: u8,
    },

    /// The code was already solved.
    #[error("Code already solved")]
    AlreadySolved,

    /// The guess budget is spent.
    #[error("No guesses remaining")]
    NoGuessesRemaining,

    /// A guess digit fell outside the pool.
    #[error("Digits must be in range 0-{max}")]
    DigitOutOfRange {
        /// Highest digit in the pool.
        max: u8,
    },

    /// A guess repeated a digit.
    #[error("Guess digits must not repeat")]
    DuplicateDigit,

    /// Every port is already uncovered.
    #[error("All ports already found")]
    AllPortsFound,

    /// Probe coordinates left the grid.
    #[error("Probe must stay inside the {size}x{size} grid")]
    OutOfBounds {
        /// Grid edge length.
        size: u8,
    },

    /// The cell was probed before.
    #[error("Cell already probed")]
    AlreadyProbed,

    /// The probe budget is spent.
    #[error("No probes remaining")]
    NoProbesRemaining,

    /// The single path submission was already consumed.
    #[error("Paths already submitted")]
    AlreadySubmitted,
}

/// A move submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameMove {
    /// Code breaking: one guess.
    CodeBreaking {
        /// Guessed digits in order.
        guess: Vec<i32>,
    },
    /// Grid search: one probe.
    GridSearch {
        /// Probed row.
        row: i32,
        /// Probed column.
        col: i32,
    },
    /// Path linking: the entire solution in one submission.
    PathLinking {
        /// Claimed paths, at most one per endpoint pair.
        paths: Vec<PathClaim>,
    },
}

/// Outcome of one accepted move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveResult {
    /// Guess feedback.
    CodeBreaking(CodeBreakingResult),
    /// Probe feedback.
    GridSearch(GridSearchResult),
    /// Submission summary.
    PathLinking(PathLinkingResult),
}

impl MoveResult {
    /// True when the puzzle accepts no further moves.
    pub fn game_over(&self) -> bool {
        match self {
            MoveResult::CodeBreaking(r) => r.game_over,
            MoveResult::GridSearch(r) => r.game_over,
            MoveResult::PathLinking(r) => r.game_over,
        }
    }
}

/// Client-visible puzzle tuning, sent at session start.
///
/// This is the only puzzle view that crosses the wire before
/// resolution; secrets stay inside [`PuzzleState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameConfig {
    /// Code-breaking tuning.
    CodeBreaking(CodeBreakingConfig),
    /// Grid-search tuning.
    GridSearch(GridSearchConfig),
    /// Path-linking tuning, endpoints included.
    PathLinking(PathLinkingConfig),
}

/// Full server-side puzzle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PuzzleState {
    /// Secret code plus guess history.
    CodeBreaking(CodeBreakingState),
    /// Port layout plus probe history.
    GridSearch(GridSearchState),
    /// Carved solution plus submission flag.
    PathLinking(PathLinkingState),
}

impl PuzzleState {
    /// Generates the puzzle for a game kind.
    pub fn generate(game: GameKind, rng: &mut GameRng, security_level: u8) -> Self {
        match game {
            GameKind::CodeBreaking => {
                PuzzleState::CodeBreaking(CodeBreakingState::generate(rng, security_level))
            }
            GameKind::GridSearch => {
                PuzzleState::GridSearch(GridSearchState::generate(rng, security_level))
            }
            GameKind::PathLinking => {
                PuzzleState::PathLinking(PathLinkingState::generate(rng, security_level))
            }
        }
    }

    /// Client-safe view of the puzzle tuning.
    pub fn client_config(&self) -> GameConfig {
        match self {
            PuzzleState::CodeBreaking(state) => GameConfig::CodeBreaking(state.config.clone()),
            PuzzleState::GridSearch(state) => GameConfig::GridSearch(state.config.clone()),
            PuzzleState::PathLinking(state) => GameConfig::PathLinking(state.config.clone()),
        }
    }

    /// Session clock for this puzzle.
    pub fn time_limit_ms(&self) -> u64 {
        match self {
            PuzzleState::CodeBreaking(state) => state.config.time_limit_ms,
            PuzzleState::GridSearch(state) => state.config.time_limit_ms,
            PuzzleState::PathLinking(state) => state.config.time_limit_ms,
        }
    }
}

/// One active infiltration session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Puzzle discipline, mirrors `target.game`.
    pub game: GameKind,
    /// Session owner.
    pub player_id: PlayerId,
    /// Claimed target, copied at start.
    pub target: ScanTarget,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Hard deadline for moves.
    pub expires_at: DateTime<Utc>,
    /// Player stats frozen at start.
    pub stats: StatsSnapshot,
    /// Accepted move results, oldest first.
    pub moves: Vec<MoveResult>,
    /// True once resolution has claimed the session.
    pub resolved: bool,
    /// Seed that generated (and can replay) the puzzle.
    pub seed: Seed,
    /// Server-side puzzle state.
    pub puzzle: PuzzleState,
}

impl GameSession {
    /// Assembles a session around a freshly generated puzzle.
    ///
    /// Callers capture `now` after generation, so board building never
    /// eats into the player's clock.
    pub fn new(
        player_id: PlayerId,
        target: ScanTarget,
        stats: StatsSnapshot,
        seed: Seed,
        puzzle: PuzzleState,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = now + chrono::Duration::milliseconds(puzzle.time_limit_ms() as i64);
        GameSession {
            game: target.game,
            player_id,
            target,
            started_at: now,
            expires_at,
            stats,
            moves: Vec::new(),
            resolved: false,
            seed,
            puzzle,
        }
    }

    /// Public identifier derived from the seed.
    pub fn session_id(&self) -> String {
        self.seed.session_id()
    }

    /// True when the move deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Validates and applies one move, appending the result to history.
    pub fn apply_move(
        &mut self,
        mv: &GameMove,
        now: DateTime<Utc>,
    ) -> Result<MoveResult, MoveError> {
        if self.resolved {
            return Err(MoveError::Resolved);
        }
        if self.is_expired(now) {
            return Err(MoveError::Expired);
        }

        let expected = self.game;
        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0) as u64;

        let result = match (&mut self.puzzle, mv) {
            (PuzzleState::CodeBreaking(state), GameMove::CodeBreaking { guess }) => {
                MoveResult::CodeBreaking(state.guess(guess)?)
            }
            (PuzzleState::GridSearch(state), GameMove::GridSearch { row, col }) => {
                MoveResult::GridSearch(state.probe(*row, *col)?)
            }
            (PuzzleState::PathLinking(state), GameMove::PathLinking { paths }) => {
                MoveResult::PathLinking(state.submit(paths, elapsed_ms)?)
            }
            _ => return Err(MoveError::WrongKind { expected }),
        };

        self.moves.push(result.clone());
        Ok(result)
    }

    /// Final score for resolution.
    ///
    /// Code breaking and grid search score from live counters. Path
    /// linking is scored at submission time, so the last submission
    /// result is reused; no submission means 0.
    pub fn final_score(&self) -> u32 {
        match &self.puzzle {
            PuzzleState::CodeBreaking(state) => score::code_breaking_score(
                state.guesses_used,
                state.config.max_guesses,
                state.solved,
            ),
            PuzzleState::GridSearch(state) => score::grid_search_score(
                state.ports_found,
                state.config.port_count,
                state.probes_used,
                state.config.max_probes,
            ),
            PuzzleState::PathLinking(_) => self
                .moves
                .iter()
                .rev()
                .find_map(|result| match result {
                    MoveResult::PathLinking(r) => Some(r.score),
                    _ => None,
                })
                .unwrap_or(0),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
