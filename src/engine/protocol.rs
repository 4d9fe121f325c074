//! Engine Protocol
//!
//! Response payloads the engine hands to whatever transport fronts it.
//! Everything here is client-visible: configs carry no hidden solution
//! data, and absent optional fields are omitted from the wire entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::backend::{DamageReport, RewardBundle};
use crate::game::session::{GameConfig, GameSession, MoveResult};
use crate::game::target::GameKind;

/// Response to a successful game start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStarted {
    /// Public session handle, derived from the seed.
    pub session_id: String,
    /// Which minigame was dealt.
    pub game: GameKind,
    /// Client-visible puzzle parameters.
    pub config: GameConfig,
    /// Hard deadline for moves.
    pub expires_at: DateTime<Utc>,
}

/// Response to a move submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Per-game result of the move just applied.
    pub result: MoveResult,
}

/// Response to a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResolution {
    /// Final score, 0-100.
    pub score: u32,
    /// Payout amounts.
    pub rewards: RewardBundle,
    /// Countermeasures caught the run.
    pub detected: bool,
    /// Damage taken, when detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageReport>,
    /// Terminal-styled outcome text.
    pub narrative: String,
    /// The XP payout crossed a level boundary.
    pub level_up: bool,
    /// Player level after the commit.
    pub new_level: u32,
    /// Post-commit player snapshot from the backend.
    pub player: serde_json::Value,
}

/// Response to a status poll. Inactive players get `{"active": false}`
/// and nothing else; the remaining fields are filled together for an
/// active session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStatus {
    /// A session exists in the store.
    pub active: bool,
    /// Public session handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Which minigame is in progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameKind>,
    /// Client-visible puzzle parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<GameConfig>,
    /// Results of the moves applied so far, for board reconstruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves: Option<Vec<MoveResult>>,
    /// When the session began.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Hard deadline for moves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Present and true once the deadline has passed. The session still
    /// resolves; it just takes no further moves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

impl GameStatus {
    /// Status for a player with no session.
    pub fn inactive() -> Self {
        GameStatus {
            active: false,
            session_id: None,
            game: None,
            config: None,
            moves: None,
            started_at: None,
            expires_at: None,
            expired: None,
        }
    }

    /// Status snapshot of a live session.
    pub fn for_session(session: &GameSession, now: DateTime<Utc>) -> Self {
        GameStatus {
            active: true,
            session_id: Some(session.session_id()),
            game: Some(session.game),
            config: Some(session.puzzle.client_config()),
            moves: Some(session.moves.clone()),
            started_at: Some(session.started_at),
            expires_at: Some(session.expires_at),
            expired: if session.is_expired(now) {
                Some(true)
            } else {
                None
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::core::{GameRng, Seed};
    use crate::game::session::{PlayerId, PuzzleState, StatsSnapshot};
    use crate::game::target::{ScanTarget, TargetKind};

    fn session_for(kind: TargetKind, security: u8) -> GameSession {
        let target = ScanTarget::new(0, "test-node", kind, security, 40.0);
        let seed = Seed::from_bytes([7; 32]);
        let mut rng = GameRng::from_seed(&seed);
        let puzzle = PuzzleState::generate(target.game, &mut rng, security);
        GameSession::new(
            PlayerId::new(),
            target,
            StatsSnapshot::baseline(30, 20),
            seed,
            puzzle,
            Utc::now(),
        )
    }

    #[test]
    fn test_inactive_status_is_bare() {
        let json = serde_json::to_string(&GameStatus::inactive()).unwrap();
        assert_eq!(json, "{\"active\":false}");
    }

    #[test]
    fn test_active_status_carries_session_fields() {
        let session = session_for(TargetKind::Financial, 40);
        let status = GameStatus::for_session(&session, session.started_at);
        assert!(status.active);
        assert_eq!(status.session_id, Some(session.session_id()));
        assert_eq!(status.game, Some(GameKind::CodeBreaking));
        assert_eq!(status.moves.as_deref(), Some(&[][..]));
        assert_eq!(status.expired, None);

        let json = serde_json::to_string(&status).unwrap();
        assert!(!json.contains("expired"));
    }

    #[test]
    fn test_expired_flag_appears_past_deadline() {
        let session = session_for(TargetKind::Financial, 40);
        let late = session.expires_at + Duration::milliseconds(1);
        let status = GameStatus::for_session(&session, late);
        assert_eq!(status.expired, Some(true));
    }

    #[test]
    fn test_started_payload_leaks_no_solutions() {
        for (kind, game) in [
            (TargetKind::Financial, GameKind::CodeBreaking),
            (TargetKind::Military, GameKind::GridSearch),
            (TargetKind::Database, GameKind::PathLinking),
        ] {
            let session = session_for(kind, 60);
            assert_eq!(session.game, game);
            let started = GameStarted {
                session_id: session.session_id(),
                game: session.game,
                config: session.puzzle.client_config(),
                expires_at: session.expires_at,
            };
            let json = serde_json::to_string(&started).unwrap();
            assert!(!json.contains("secret"), "{game}: {json}");
            assert!(!json.contains("ports"), "{game}: {json}");
            assert!(!json.contains("solution"), "{game}: {json}");
        }
    }

    #[test]
    fn test_resolution_omits_absent_damage() {
        let resolution = GameResolution {
            score: 85,
            rewards: RewardBundle {
                credits: 120,
                data: 60,
                reputation: 6,
                xp: 30,
                processing_power: None,
            },
            detected: false,
            damage: None,
            narrative: "> Clean exit.".into(),
            level_up: false,
            new_level: 3,
            player: serde_json::json!({"id": "p1"}),
        };
        let json = serde_json::to_string(&resolution).unwrap();
        assert!(!json.contains("damage"));
        assert!(json.contains("\"narrative\""));
    }
}
