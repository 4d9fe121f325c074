//! # Blackice Infiltration Server
//!
//! Server-authoritative minigame engine for network infiltration runs.
//! Clients never see a solution; they see dealt boards, per-move
//! feedback, and a resolution payload.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BLACKICE SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded xorshift128 PRNG                   │
//! │  └── grid.rs     - Square-grid cells and adjacency           │
//! │                                                              │
//! │  game/           - Puzzle logic (deterministic)               │
//! │  ├── target.rs   - Scan targets, kind-to-puzzle mapping      │
//! │  ├── balance.rs  - Difficulty tiers and modifiers            │
//! │  ├── codebreak.rs- Secret-code puzzle                        │
//! │  ├── gridsearch.rs- Hidden-port probe puzzle                 │
//! │  ├── pathlink.rs - Endpoint-linking puzzle                   │
//! │  ├── score.rs    - Scoring curves                            │
//! │  └── session.rs  - Session state and move dispatch           │
//! │                                                              │
//! │  engine/         - Orchestration (non-deterministic)         │
//! │  ├── store.rs    - Session store and lease locks             │
//! │  ├── backend.rs  - Player backend traits                     │
//! │  ├── resolve.rs  - Reward, detection, damage rolls           │
//! │  └── service.rs  - start/move/resolve/status                 │
//! │                                                              │
//! │  narrative.rs    - Outcome text templates                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**: all
//! randomness comes from the seeded xorshift128 stream, iteration
//! orders are fixed, and nothing reads the clock except through the
//! timestamps the caller passes in. Given the same seed, a session
//! deals the same board on any platform, which is what makes stored
//! seeds replayable for audits.
//!
//! Live dice (reward variance, detection, damage placement) are rolled
//! only at resolution time, in `engine/`, from OS entropy.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod game;
pub mod narrative;

// Re-export commonly used types
pub use crate::core::{GameRng, Seed};
pub use engine::{
    EngineConfig, EngineError, ErrorKind, MemorySessionLocks, MemorySessionStore, MinigameService,
};
pub use game::{GameKind, GameMove, GameSession, PlayerId, ScanTarget, TargetKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
