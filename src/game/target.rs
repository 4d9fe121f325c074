//! Scan Targets
//!
//! A target is claimed from the player's scanner when a session starts
//! and copied into the session. Everything resolution needs later comes
//! from this copy, so a rescan mid-session cannot change the odds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of infiltration target produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Corporate data stores.
    Database,
    /// State networks.
    Government,
    /// Banks and exchanges.
    Financial,
    /// Hardened military systems.
    Military,
    /// Company intranets.
    Corporate,
    /// Laboratory networks.
    Research,
    /// Utility grids and backbones.
    Infrastructure,
}

impl TargetKind {
    /// The puzzle discipline this kind of target runs.
    pub fn game(self) -> GameKind {
        match self {
            TargetKind::Financial | TargetKind::Corporate | TargetKind::Government => {
                GameKind::CodeBreaking
            }
            TargetKind::Military | TargetKind::Infrastructure => GameKind::GridSearch,
            TargetKind::Database | TargetKind::Research => GameKind::PathLinking,
        }
    }
}

/// Which puzzle a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Guess a secret digit code from positional feedback.
    CodeBreaking,
    /// Locate hidden ports on a grid with limited probes.
    GridSearch,
    /// Connect endpoint pairs with non-crossing orthogonal paths.
    PathLinking,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameKind::CodeBreaking => "code breaking",
            GameKind::GridSearch => "grid search",
            GameKind::PathLinking => "path linking",
        };
        write!(f, "{label}")
    }
}

/// Risk rating shown alongside a scanned target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRating {
    /// Security below 30.
    Low,
    /// Security 30 to 54.
    Medium,
    /// Security 55 to 74.
    High,
    /// Security 75 and up.
    Critical,
}

/// Maps a security level to its advertised risk band.
pub fn risk_rating(security_level: u8) -> RiskRating {
    match security_level {
        0..=29 => RiskRating::Low,
        30..=54 => RiskRating::Medium,
        55..=74 => RiskRating::High,
        _ => RiskRating::Critical,
    }
}

/// Unscaled payout for a clean run against a target.
///
/// Resolution multiplies these by the score curve and the player's
/// bonuses; the preview itself only depends on the security level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRewards {
    /// Credits payout.
    pub credits: u64,
    /// Data fragments payout.
    pub data: u64,
    /// Reputation gain.
    pub reputation: u64,
    /// Experience gain.
    pub xp: u64,
}

/// Base rewards scale linearly with security level.
pub fn base_rewards(security_level: u8) -> BaseRewards {
    let sec = f64::from(security_level);
    BaseRewards {
        credits: (9.0 + sec * 0.95).floor() as u64,
        data: (5.0 + sec * 0.58).floor() as u64,
        reputation: (1.0 + sec * 0.1).floor() as u64,
        xp: (9.0 + sec * 0.22).floor() as u64,
    }
}

/// A scanned target claimed into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanTarget {
    /// Position of the target in the player's current scan results.
    pub index: u32,
    /// Display name shown in activity feeds and narratives.
    pub name: String,
    /// Target category.
    pub kind: TargetKind,
    /// Security level, drives difficulty and rewards.
    pub security_level: u8,
    /// Advertised risk band.
    pub risk: RiskRating,
    /// Base chance (in percent) of being detected on resolution.
    pub detection_chance: f64,
    /// Puzzle discipline for this target.
    pub game: GameKind,
    /// Unscaled payout preview.
    pub base_rewards: BaseRewards,
}

impl ScanTarget {
    /// Builds a target, deriving the game, risk band and reward preview
    /// from the kind and security level.
    pub fn new(
        index: u32,
        name: impl Into<String>,
        kind: TargetKind,
        security_level: u8,
        detection_chance: f64,
    ) -> Self {
        ScanTarget {
            index,
            name: name.into(),
            kind,
            security_level,
            risk: risk_rating(security_level),
            detection_chance,
            game: kind.game(),
            base_rewards: base_rewards(security_level),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
