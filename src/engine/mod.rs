//! Engine Module
//!
//! The non-deterministic half of the server: durable session storage,
//! per-player locking, live resolution dice, and the orchestration
//! service that ties puzzles to the player backend.
//!
//! ## Module Structure
//!
//! - `store`: Session store and lease-lock traits with in-memory backends
//! - `backend`: Collaborator traits for scans, stats, profiles, events
//! - `error`: Engine error type with transport-agnostic classification
//! - `protocol`: Client-facing response payloads
//! - `resolve`: Reward, detection, and damage rolls
//! - `service`: The start/move/resolve/status entry points

pub mod backend;
pub mod error;
pub mod protocol;
pub mod resolve;
pub mod service;
pub mod store;

// Re-export key types
pub use backend::{
    ClaimError, CommitReceipt, DamageReport, EventSink, HeatChange, InfiltrationRecord,
    LoadoutKind, ModifierEffects, OutcomeEvent, PlayerBackend, PlayerProfile, ResolutionEffects,
    ResolvedStats, SeasonService, StatsResolver, SystemDamage, SystemState, SystemStatus,
    SystemType, TargetScanner,
};
pub use error::{EngineError, ErrorKind};
pub use protocol::{GameResolution, GameStarted, GameStatus, MoveOutcome};
pub use service::{EngineConfig, MinigameService};
pub use store::{
    BackendError, LockToken, MemorySessionLocks, MemorySessionStore, SessionLocks, SessionStore,
};
