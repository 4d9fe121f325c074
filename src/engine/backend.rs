//! Backend Collaborators
//!
//! The engine owns puzzle state and nothing else. Target scans, loadout
//! stats, player progression, season pacing, and the activity feed belong
//! to other services and sit behind the traits in this module, so the
//! engine runs against in-memory stubs in tests and real backends in
//! deployments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::store::BackendError;
use crate::game::session::{PlayerId, StatsSnapshot};
use crate::game::target::{GameKind, ScanTarget, TargetKind};

/// Why a scanned target could not be claimed for an infiltration.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The player has no scan to claim from.
    #[error("No active scan")]
    NoActiveScan,

    /// The scan holds no target at the requested index.
    #[error("Unknown target index {0}")]
    UnknownTarget(u32),

    /// The scanner itself failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Which equipped loadout's stats to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadoutKind {
    /// The deck equipped for infiltration runs.
    Infiltration,
}

/// Global multipliers contributed by active world modifiers.
///
/// Absent values mean "no modifier touches this axis" and read as 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierEffects {
    /// Scales credit and data payouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hack_reward_multiplier: Option<f64>,
    /// Scales XP payouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_gain_multiplier: Option<f64>,
    /// Scales the target's effective detection chance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_chance_multiplier: Option<f64>,
}

/// Loadout stats as the stats service reports them, before the engine
/// freezes them into a session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStats {
    /// Raw hack power from modules and traits, not yet health-scaled.
    pub hack_power: f64,
    /// Raw stealth rating.
    pub stealth: i64,
    /// Raw defense rating.
    pub defense: i64,
    /// Credit payout bonus in percent.
    pub credit_bonus: f64,
    /// Data payout bonus in percent.
    pub data_bonus: f64,
    /// Flat reduction folded into effective stealth.
    pub detection_reduction: i64,
    /// Average system health scaled to `0.1..=1.0`.
    pub health_multiplier: f64,
    /// Active world-modifier multipliers.
    pub modifiers: ModifierEffects,
}

impl ResolvedStats {
    /// Freezes these stats into the per-session snapshot.
    ///
    /// Hack power is health-scaled and rounded here, and detection
    /// reduction folds into effective stealth, so resolution math never
    /// has to revisit either rule.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hack_power: (self.hack_power * self.health_multiplier).round() as i64,
            stealth: self.stealth + self.detection_reduction,
            defense: self.defense,
            credit_bonus: self.credit_bonus,
            data_bonus: self.data_bonus,
            detection_reduction: self.detection_reduction,
            health_multiplier: self.health_multiplier,
            hack_reward_multiplier: self.modifiers.hack_reward_multiplier.unwrap_or(1.0),
            xp_gain_multiplier: self.modifiers.xp_gain_multiplier.unwrap_or(1.0),
            detection_chance_multiplier: self.modifiers.detection_chance_multiplier.unwrap_or(1.0),
        }
    }
}

/// A player subsystem that can absorb countermeasure damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    /// Core processing.
    NeuralCore,
    /// Storage.
    MemoryBanks,
    /// Compute acceleration.
    QuantumProcessor,
    /// Defensive layer.
    SecurityProtocols,
    /// I/O routing.
    DataPathways,
    /// Power management.
    EnergyDistribution,
}

impl SystemType {
    /// Wire name, used in damage report narrative lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemType::NeuralCore => "neural_core",
            SystemType::MemoryBanks => "memory_banks",
            SystemType::QuantumProcessor => "quantum_processor",
            SystemType::SecurityProtocols => "security_protocols",
            SystemType::DataPathways => "data_pathways",
            SystemType::EnergyDistribution => "energy_distribution",
        }
    }
}

/// Health band of a player system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemStatus {
    /// Health 75 and above.
    Optimal,
    /// Health 30-74.
    Degraded,
    /// Health 1-29.
    Critical,
    /// Health 0.
    Corrupted,
}

impl SystemStatus {
    /// Band for a health value.
    pub fn for_health(health: i64) -> Self {
        if health <= 0 {
            SystemStatus::Corrupted
        } else if health <= 29 {
            SystemStatus::Critical
        } else if health <= 74 {
            SystemStatus::Degraded
        } else {
            SystemStatus::Optimal
        }
    }
}

/// Current health of one player system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    /// Which system.
    pub system: SystemType,
    /// Health, 0-100.
    pub health: i64,
}

/// Damage dealt to one system by countermeasures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDamage {
    /// Which system was hit.
    pub system: SystemType,
    /// Hit points removed.
    pub damage: u32,
    /// Health after the hit, floored at 0.
    pub new_health: i64,
    /// Band after the hit.
    pub new_status: SystemStatus,
}

/// All countermeasure damage from one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    /// Per-system hits, at most one per system.
    pub systems: Vec<SystemDamage>,
}

/// The slice of player state resolution needs up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Consecutive-detection counter driving the damage table.
    pub heat_level: u32,
    /// Current system healths.
    pub systems: Vec<SystemState>,
}

/// What resolution decided about the player's heat level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatChange {
    /// Detected: heat climbs by one.
    Raise,
    /// Clean success: heat drops to zero.
    Reset,
    /// Clean failure: heat stays put.
    Keep,
}

/// Final payout amounts for one infiltration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBundle {
    /// Credits earned.
    pub credits: u64,
    /// Data earned.
    pub data: u64,
    /// Reputation earned.
    pub reputation: u64,
    /// Experience earned.
    pub xp: u64,
    /// Rare processing-power drop, only on strong high-security runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_power: Option<u64>,
}

/// Audit-log row describing one finished infiltration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfiltrationRecord {
    /// Category of the target that was hit.
    pub target_kind: TargetKind,
    /// Target security level.
    pub security_level: u8,
    /// Score reached 50.
    pub success: bool,
    /// Countermeasures caught the run.
    pub detected: bool,
    /// Credits paid out.
    pub credits_earned: u64,
    /// Reputation paid out.
    pub reputation_earned: u64,
    /// Damage taken, when detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<Vec<SystemDamage>>,
    /// Which minigame was played.
    pub game: GameKind,
    /// Final score, 0-100.
    pub score: u32,
    /// Moves the player made.
    pub move_count: u32,
    /// Wall-clock session length in milliseconds.
    pub duration_ms: u64,
}

/// Everything the backend must apply atomically when a game resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionEffects {
    /// Resources and XP to credit.
    pub rewards: RewardBundle,
    /// Whether countermeasures fired.
    pub detected: bool,
    /// System damage to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageReport>,
    /// Heat adjustment.
    pub heat: HeatChange,
    /// Log row to append.
    pub record: InfiltrationRecord,
}

/// What the backend reports after committing a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// The XP payout crossed a level boundary.
    pub level_up: bool,
    /// Player level after the commit.
    pub new_level: u32,
    /// Post-commit player snapshot, passed through to the client verbatim.
    pub player: serde_json::Value,
}

/// Outcome summary for downstream listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    /// Category of the target that was hit.
    pub target_kind: TargetKind,
    /// Which minigame was played.
    pub game: GameKind,
    /// Final score, 0-100.
    pub score: u32,
    /// Score reached 50.
    pub success: bool,
    /// Countermeasures caught the run.
    pub detected: bool,
    /// Moves the player made.
    pub move_count: u32,
}

/// Hands out scanned targets for infiltration.
#[async_trait]
pub trait TargetScanner: Send + Sync {
    /// Claims the target at `index` from the player's most recent scan,
    /// consuming the scan entry.
    async fn claim_target(&self, player: PlayerId, index: u32) -> Result<ScanTarget, ClaimError>;
}

/// Resolves equipped-loadout stats.
#[async_trait]
pub trait StatsResolver: Send + Sync {
    /// Reads the player's current stats for one loadout. Called once per
    /// session; the engine freezes the result into a snapshot.
    async fn resolve_loadout_stats(
        &self,
        player: PlayerId,
        loadout: LoadoutKind,
    ) -> Result<ResolvedStats, BackendError>;
}

/// Owns persistent player progression.
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Reads the heat level and system healths resolution starts from.
    async fn profile(&self, player: PlayerId) -> Result<PlayerProfile, BackendError>;

    /// Applies one resolution atomically: rewards, XP, heat, damage, and
    /// the log record all land or none do.
    async fn commit_resolution(
        &self,
        player: PlayerId,
        effects: &ResolutionEffects,
    ) -> Result<CommitReceipt, BackendError>;
}

/// Season pacing adjustments.
#[async_trait]
pub trait SeasonService: Send + Sync {
    /// Catch-up multiplier applied to resource payouts, 1.0 for players
    /// on pace.
    async fn catchup_multiplier(&self, player: PlayerId) -> Result<f64, BackendError>;
}

/// Fire-and-forget notifications. Implementations swallow their own
/// failures; resolution never rolls back because a feed was down.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Posts a line to the player's activity feed.
    async fn activity(&self, player: PlayerId, message: &str);

    /// Announces a finished game to downstream listeners.
    async fn game_resolved(&self, player: PlayerId, outcome: &OutcomeEvent);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_thresholds() {
        // These bands must never change!
        assert_eq!(SystemStatus::for_health(100), SystemStatus::Optimal);
        assert_eq!(SystemStatus::for_health(75), SystemStatus::Optimal);
        assert_eq!(SystemStatus::for_health(74), SystemStatus::Degraded);
        assert_eq!(SystemStatus::for_health(30), SystemStatus::Degraded);
        assert_eq!(SystemStatus::for_health(29), SystemStatus::Critical);
        assert_eq!(SystemStatus::for_health(1), SystemStatus::Critical);
        assert_eq!(SystemStatus::for_health(0), SystemStatus::Corrupted);
        assert_eq!(SystemStatus::for_health(-5), SystemStatus::Corrupted);
    }

    #[test]
    fn test_snapshot_scales_hack_power_and_stealth() {
        let stats = ResolvedStats {
            hack_power: 50.0,
            stealth: 30,
            defense: 12,
            credit_bonus: 10.0,
            data_bonus: 5.0,
            detection_reduction: 8,
            health_multiplier: 0.85,
            modifiers: ModifierEffects {
                hack_reward_multiplier: Some(1.5),
                xp_gain_multiplier: None,
                detection_chance_multiplier: Some(0.9),
            },
        };
        let snap = stats.snapshot();
        // 50 * 0.85 = 42.5 rounds up.
        assert_eq!(snap.hack_power, 43);
        assert_eq!(snap.stealth, 38);
        assert_eq!(snap.defense, 12);
        assert_eq!(snap.hack_reward_multiplier, 1.5);
        assert_eq!(snap.xp_gain_multiplier, 1.0);
        assert_eq!(snap.detection_chance_multiplier, 0.9);
    }

    #[test]
    fn test_snapshot_defaults_pass_through() {
        let stats = ResolvedStats {
            hack_power: 10.0,
            stealth: 5,
            defense: 5,
            credit_bonus: 0.0,
            data_bonus: 0.0,
            detection_reduction: 0,
            health_multiplier: 1.0,
            modifiers: ModifierEffects::default(),
        };
        let snap = stats.snapshot();
        assert_eq!(snap.hack_power, 10);
        assert_eq!(snap.stealth, 5);
        assert_eq!(snap.hack_reward_multiplier, 1.0);
        assert_eq!(snap.xp_gain_multiplier, 1.0);
        assert_eq!(snap.detection_chance_multiplier, 1.0);
    }

    #[test]
    fn test_system_wire_names() {
        assert_eq!(SystemType::NeuralCore.as_str(), "neural_core");
        assert_eq!(SystemType::EnergyDistribution.as_str(), "energy_distribution");
        // Serde and as_str agree on the wire spelling.
        let json = serde_json::to_string(&SystemType::QuantumProcessor).unwrap();
        assert_eq!(json, "\"quantum_processor\"");
    }

    #[test]
    fn test_reward_bundle_omits_absent_drop() {
        let bundle = RewardBundle {
            credits: 100,
            data: 50,
            reputation: 5,
            xp: 20,
            processing_power: None,
        };
        let json = serde_json::to_string(&bundle).unwrap();
        assert!(!json.contains("processing_power"));
    }
}
