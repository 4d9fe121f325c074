//! Game Logic Module
//!
//! All puzzle simulation code. 100% deterministic: given the same seed
//! and the same moves, every function here produces the same state.
//!
//! ## Module Structure
//!
//! - `target`: Scan targets and the kind-to-puzzle mapping
//! - `balance`: Difficulty tiers, modifiers, tuning constants
//! - `codebreak`: Secret-code puzzle with positional feedback
//! - `gridsearch`: Hidden-port puzzle with probe adjacency hints
//! - `pathlink`: Endpoint-linking puzzle carved from a Hamiltonian path
//! - `score`: Scoring curves and resolution multipliers
//! - `session`: Per-player session state and move dispatch

pub mod balance;
pub mod codebreak;
pub mod gridsearch;
pub mod pathlink;
pub mod score;
pub mod session;
pub mod target;

// Re-export key types
pub use balance::Modifier;
pub use session::{
    GameConfig, GameMove, GameSession, MoveError, MoveResult, PlayerId, PuzzleState,
    StatsSnapshot,
};
pub use target::{GameKind, ScanTarget, TargetKind};
