//! Minigame Service
//!
//! Orchestration layer tying the puzzle engine to its collaborators.
//! Exposes the four entry points a transport needs: start, move,
//! resolve, status.
//!
//! # Locking
//!
//! Every mutating entry point runs inside the player's lease lock:
//! acquire, read the stored session, apply game logic, write back,
//! release. Contention surfaces as [`EngineError::Busy`], the one error
//! a caller should retry. The backend commit on resolution nests inside
//! the same lock scope, and the stored session is only deleted after
//! the commit lands, so a failed commit leaves the session resolvable.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::core::{GameRng, Seed};
use crate::engine::backend::{
    CommitReceipt, DamageReport, EventSink, InfiltrationRecord, LoadoutKind, OutcomeEvent,
    PlayerBackend, ResolutionEffects, SeasonService, StatsResolver, TargetScanner,
};
use crate::engine::error::EngineError;
use crate::engine::protocol::{GameResolution, GameStarted, GameStatus, MoveOutcome};
use crate::engine::resolve::{assemble_rewards, heat_change, roll_damage, roll_detection};
use crate::engine::store::{LockToken, SessionLocks, SessionStore};
use crate::game::session::{GameMove, GameSession, PlayerId, PuzzleState};
use crate::narrative;

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lease on the per-player lock. A crashed request holds the lock
    /// for at most this long.
    pub lock_lease: Duration,
    /// Store TTL for session state, refreshed on every write. A session
    /// idle past this is discarded without rewards.
    pub session_retention: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_lease: Duration::from_secs(30),
            session_retention: Duration::from_secs(1800),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lock_lease: std::env::var("BLACKICE_LOCK_LEASE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.lock_lease),
            session_retention: std::env::var("BLACKICE_SESSION_RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_retention),
        }
    }
}

/// The infiltration minigame engine.
pub struct MinigameService {
    store: Arc<dyn SessionStore>,
    locks: Arc<dyn SessionLocks>,
    scanner: Arc<dyn TargetScanner>,
    stats: Arc<dyn StatsResolver>,
    backend: Arc<dyn PlayerBackend>,
    seasons: Arc<dyn SeasonService>,
    events: Arc<dyn EventSink>,
    config: EngineConfig,
}

impl MinigameService {
    /// Wires the service against its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn SessionStore>,
        locks: Arc<dyn SessionLocks>,
        scanner: Arc<dyn TargetScanner>,
        stats: Arc<dyn StatsResolver>,
        backend: Arc<dyn PlayerBackend>,
        seasons: Arc<dyn SeasonService>,
        events: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            locks,
            scanner,
            stats,
            backend,
            seasons,
            events,
            config,
        }
    }

    /// Starts a session against a scanned target with fresh entropy.
    pub async fn start_game(
        &self,
        player: PlayerId,
        target_index: u32,
    ) -> Result<GameStarted, EngineError> {
        let entropy: [u8; 32] = rand::random();
        let seed = Seed::derive(&entropy, player.as_bytes(), target_index);
        self.start_game_with_seed(player, target_index, seed).await
    }

    /// Starts a session from a caller-supplied seed.
    ///
    /// Public for replay and audit tooling: the same seed against the
    /// same target always deals the same board.
    pub async fn start_game_with_seed(
        &self,
        player: PlayerId,
        target_index: u32,
        seed: Seed,
    ) -> Result<GameStarted, EngineError> {
        let token = self.acquire_lock(player).await?;
        let result = self.start_locked(player, target_index, seed).await;
        self.release_lock(player, &token).await;
        result
    }

    /// Applies one move to the player's session.
    pub async fn submit_move(
        &self,
        player: PlayerId,
        mv: &GameMove,
    ) -> Result<MoveOutcome, EngineError> {
        let token = self.acquire_lock(player).await?;
        let result = self.submit_locked(player, mv).await;
        self.release_lock(player, &token).await;
        result
    }

    /// Resolves the player's session: scores it, rolls rewards and
    /// detection, commits through the backend, and deletes the session.
    pub async fn resolve_game(&self, player: PlayerId) -> Result<GameResolution, EngineError> {
        let token = self.acquire_lock(player).await?;
        let result = self.resolve_locked(player).await;
        self.release_lock(player, &token).await;
        result
    }

    /// Reports the player's session state for reconnects. Read-only, so
    /// it takes no lock.
    pub async fn game_status(&self, player: PlayerId) -> Result<GameStatus, EngineError> {
        match self.load_session(player).await? {
            Some(session) => Ok(GameStatus::for_session(&session, Utc::now())),
            None => Ok(GameStatus::inactive()),
        }
    }

    async fn start_locked(
        &self,
        player: PlayerId,
        target_index: u32,
        seed: Seed,
    ) -> Result<GameStarted, EngineError> {
        if self.load_session(player).await?.is_some() {
            return Err(EngineError::GameAlreadyActive);
        }

        let target = self.scanner.claim_target(player, target_index).await?;
        let stats = self
            .stats
            .resolve_loadout_stats(player, LoadoutKind::Infiltration)
            .await?
            .snapshot();

        let mut rng = GameRng::from_seed(&seed);
        let puzzle = PuzzleState::generate(target.game, &mut rng, target.security_level);
        // Clock starts after generation, so board building never eats
        // into the player's time limit.
        let session = GameSession::new(player, target, stats, seed, puzzle, Utc::now());
        self.save_session(&session).await?;

        info!(
            "Session {} started: {} on {} (security {})",
            session.session_id(),
            session.game,
            session.target.name,
            session.target.security_level
        );
        self.events
            .activity(
                player,
                &format!(
                    "Infiltration sequence initiated: {} ({})",
                    session.target.name, session.game
                ),
            )
            .await;

        Ok(GameStarted {
            session_id: session.session_id(),
            game: session.game,
            config: session.puzzle.client_config(),
            expires_at: session.expires_at,
        })
    }

    async fn submit_locked(
        &self,
        player: PlayerId,
        mv: &GameMove,
    ) -> Result<MoveOutcome, EngineError> {
        let mut session = self
            .load_session(player)
            .await?
            .ok_or(EngineError::NoActiveGame)?;

        let result = session.apply_move(mv, Utc::now())?;
        self.save_session(&session).await?;

        debug!(
            "Session {} move {} applied (game_over: {})",
            session.session_id(),
            session.moves.len(),
            result.game_over()
        );
        Ok(MoveOutcome { result })
    }

    async fn resolve_locked(&self, player: PlayerId) -> Result<GameResolution, EngineError> {
        let mut session = self
            .load_session(player)
            .await?
            .ok_or(EngineError::NoActiveGame)?;
        if session.resolved {
            return Err(EngineError::AlreadyResolved);
        }
        session.resolved = true;

        let now = Utc::now();
        let score = session.final_score();
        let move_count = session.moves.len() as u32;
        let eligible = move_count > 0;
        let duration_ms = (now - session.started_at).num_milliseconds().max(0) as u64;

        let season_multiplier = match self.seasons.catchup_multiplier(player).await {
            Ok(multiplier) => multiplier,
            Err(err) => {
                warn!("Season lookup failed, using parity: {}", err);
                1.0
            }
        };
        let profile = self.backend.profile(player).await?;

        // Live dice, scoped so the thread rng never crosses an await.
        let (rewards, detected, damage) = {
            let mut rng = rand::thread_rng();
            let rewards = assemble_rewards(
                &mut rng,
                &session.target,
                &session.stats,
                score,
                eligible,
                season_multiplier,
            );
            let detected = roll_detection(&mut rng, &session.target, &session.stats, score);
            let damage =
                detected.then(|| roll_damage(&mut rng, profile.heat_level, &profile.systems));
            (rewards, detected, damage)
        };

        let record = InfiltrationRecord {
            target_kind: session.target.kind,
            security_level: session.target.security_level,
            success: score >= 50,
            detected,
            credits_earned: rewards.credits,
            reputation_earned: rewards.reputation,
            damage: damage.as_ref().map(|report| report.systems.clone()),
            game: session.game,
            score,
            move_count,
            duration_ms,
        };
        let effects = ResolutionEffects {
            rewards,
            detected,
            damage,
            heat: heat_change(score, detected),
            record,
        };

        let receipt = self.backend.commit_resolution(player, &effects).await?;
        // Delete only after the commit lands; a failed commit leaves the
        // session in the store for a retried resolve.
        self.store.delete(player).await?;

        info!(
            "Session {} resolved: score {} detected {} credits {}",
            session.session_id(),
            score,
            detected,
            effects.rewards.credits
        );

        let narrative = {
            let mut rng = rand::thread_rng();
            compose_narrative(&mut rng, &session, &effects, &receipt)
        };

        let message = if effects.record.success {
            format!(
                "Game completed on {} (score: {}%) +{} CR",
                session.target.name, score, effects.rewards.credits
            )
        } else if detected {
            format!(
                "Game failed on {} (score: {}%) (DETECTED)",
                session.target.name, score
            )
        } else {
            format!("Game failed on {} (score: {}%)", session.target.name, score)
        };
        self.events.activity(player, &message).await;
        self.events
            .game_resolved(
                player,
                &OutcomeEvent {
                    target_kind: session.target.kind,
                    game: session.game,
                    score,
                    success: effects.record.success,
                    detected,
                    move_count,
                },
            )
            .await;

        Ok(GameResolution {
            score,
            rewards: effects.rewards,
            detected,
            damage: effects.damage,
            narrative,
            level_up: receipt.level_up,
            new_level: receipt.new_level,
            player: receipt.player,
        })
    }

    async fn acquire_lock(&self, player: PlayerId) -> Result<LockToken, EngineError> {
        match self.locks.acquire(player, self.config.lock_lease).await? {
            Some(token) => Ok(token),
            None => Err(EngineError::Busy),
        }
    }

    async fn release_lock(&self, player: PlayerId, token: &LockToken) {
        if let Err(err) = self.locks.release(player, token).await {
            warn!("Lock release failed for {:?}: {}", &player.as_bytes()[..4], err);
        }
    }

    async fn load_session(&self, player: PlayerId) -> Result<Option<GameSession>, EngineError> {
        match self.store.get(player).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save_session(&self, session: &GameSession) -> Result<(), EngineError> {
        let raw = serde_json::to_string(session)?;
        self.store
            .put(session.player_id, raw, self.config.session_retention)
            .await?;
        Ok(())
    }
}

/// Builds the outcome narrative for a resolved session.
fn compose_narrative<R: Rng>(
    rng: &mut R,
    session: &GameSession,
    effects: &ResolutionEffects,
    receipt: &CommitReceipt,
) -> String {
    let target = &session.target;
    let rewards = &effects.rewards;
    let damage_report = effects.damage.as_ref().map(damage_line).unwrap_or_default();
    let success = effects.record.success;

    let text = if success && effects.detected {
        narrative::fill_template(
            narrative::pick_template(rng, &narrative::HACK_SUCCESS_TRACED_TEMPLATES),
            &[
                ("target", target.name.clone()),
                ("security", target.security_level.to_string()),
                ("credits", rewards.credits.to_string()),
                ("data", rewards.data.to_string()),
                ("reputation", rewards.reputation.to_string()),
                ("damageReport", damage_report),
            ],
        )
    } else if success {
        narrative::fill_template(
            narrative::pick_template(rng, &narrative::HACK_SUCCESS_TEMPLATES),
            &[
                ("target", target.name.clone()),
                ("security", target.security_level.to_string()),
                ("power", session.stats.hack_power.to_string()),
                ("credits", rewards.credits.to_string()),
                ("data", rewards.data.to_string()),
                ("reputation", rewards.reputation.to_string()),
                (
                    "processingPower",
                    rewards.processing_power.unwrap_or(0).to_string(),
                ),
                ("rounds", session.moves.len().to_string()),
            ],
        )
    } else if effects.detected {
        narrative::fill_template(
            narrative::pick_template(rng, &narrative::HACK_FAIL_DETECTED_TEMPLATES),
            &[
                ("target", target.name.clone()),
                ("detection", (target.detection_chance.round() as i64).to_string()),
                ("damageReport", damage_report),
            ],
        )
    } else {
        narrative::fill_template(
            narrative::pick_template(rng, &narrative::HACK_FAIL_UNDETECTED_TEMPLATES),
            &[
                ("target", target.name.clone()),
                ("security", target.security_level.to_string()),
                ("stealth", session.stats.stealth.to_string()),
                ("power", session.stats.hack_power.to_string()),
            ],
        )
    };

    if success && receipt.level_up {
        format!("{}\n> LEVEL UP! Now level {}", text, receipt.new_level)
    } else {
        text
    }
}

/// Formats a damage report for narrative interpolation.
fn damage_line(report: &DamageReport) -> String {
    report
        .systems
        .iter()
        .map(|hit| format!("{}: -{}HP", hit.system.as_str(), hit.damage))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// TESTS
// =============================================================================
