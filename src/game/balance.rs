//! Difficulty Tables
//!
//! Security levels map to one of four difficulty tiers; each puzzle
//! discipline has a tuning table indexed by that tier. Heat damage and
//! the payout scalars live here as well so every knob is in one place.

use serde::{Deserialize, Serialize};

use crate::core::GameRng;
use crate::game::target::GameKind;

/// Inclusive security bands for the four difficulty tiers.
pub const SECURITY_BRACKETS: [(u8, u8); 4] = [(14, 29), (30, 54), (55, 74), (75, 95)];

/// Tuning for one code-breaking tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBreakingTier {
    /// Digits in the secret code.
    pub code_length: u8,
    /// Digits are drawn from `0..digit_pool`.
    pub digit_pool: u8,
    /// Guess budget.
    pub max_guesses: u32,
    /// Session clock.
    pub time_limit_ms: u64,
}

/// Tuning for one grid-search tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSearchTier {
    /// Square grid edge length.
    pub grid_size: u8,
    /// Hidden ports to find.
    pub port_count: u32,
    /// Probe budget.
    pub max_probes: u32,
    /// Session clock.
    pub time_limit_ms: u64,
}

/// Tuning for one path-linking tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathLinkingTier {
    /// Square grid edge length.
    pub grid_size: u8,
    /// Endpoint pairs to connect.
    pub pairs: u32,
    /// Session clock.
    pub time_limit_ms: u64,
}

/// Code-breaking tiers, easiest first.
pub const CODE_BREAKING_TIERS: [CodeBreakingTier; 4] = [
    CodeBreakingTier { code_length: 3, digit_pool: 6, max_guesses: 9, time_limit_ms: 60_000 },
    CodeBreakingTier { code_length: 4, digit_pool: 7, max_guesses: 8, time_limit_ms: 60_000 },
    CodeBreakingTier { code_length: 4, digit_pool: 8, max_guesses: 7, time_limit_ms: 60_000 },
    CodeBreakingTier { code_length: 5, digit_pool: 8, max_guesses: 7, time_limit_ms: 60_000 },
];

/// Grid-search tiers, easiest first.
pub const GRID_SEARCH_TIERS: [GridSearchTier; 4] = [
    GridSearchTier { grid_size: 5, port_count: 3, max_probes: 15, time_limit_ms: 90_000 },
    GridSearchTier { grid_size: 6, port_count: 5, max_probes: 18, time_limit_ms: 90_000 },
    GridSearchTier { grid_size: 7, port_count: 6, max_probes: 21, time_limit_ms: 90_000 },
    GridSearchTier { grid_size: 8, port_count: 8, max_probes: 22, time_limit_ms: 90_000 },
];

/// Path-linking tiers, easiest first.
pub const PATH_LINKING_TIERS: [PathLinkingTier; 4] = [
    PathLinkingTier { grid_size: 5, pairs: 4, time_limit_ms: 90_000 },
    PathLinkingTier { grid_size: 6, pairs: 5, time_limit_ms: 90_000 },
    PathLinkingTier { grid_size: 7, pairs: 7, time_limit_ms: 90_000 },
    PathLinkingTier { grid_size: 8, pairs: 9, time_limit_ms: 90_000 },
];

/// Maps a security level to its difficulty tier index.
///
/// Scans from the hardest bracket down; anything below the lowest band
/// falls back to tier 0.
pub fn tier_index(security_level: u8) -> usize {
    for i in (0..SECURITY_BRACKETS.len()).rev() {
        if security_level >= SECURITY_BRACKETS[i].0 {
            return i;
        }
    }
    0
}

/// Code-breaking tuning for a security level.
pub fn code_breaking_tier(security_level: u8) -> &'static CodeBreakingTier {
    &CODE_BREAKING_TIERS[tier_index(security_level)]
}

/// Grid-search tuning for a security level.
pub fn grid_search_tier(security_level: u8) -> &'static GridSearchTier {
    &GRID_SEARCH_TIERS[tier_index(security_level)]
}

/// Path-linking tuning for a security level.
pub fn path_linking_tier(security_level: u8) -> &'static PathLinkingTier {
    &PATH_LINKING_TIERS[tier_index(security_level)]
}

// =============================================================================
// MODIFIERS
// =============================================================================

/// Cosmetic-or-mechanical twist attached to a generated puzzle.
///
/// Modifiers only appear at the two hardest tiers. The server honors
/// `Blackout` (the possibilities counter is withheld); the rest are
/// presentation hints for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Code breaking: possibilities counter withheld.
    Blackout,
    /// Code breaking: feedback panel renders glitched.
    Corrupted,
    /// Grid search: decoy echoes on the client overlay.
    Decoys,
    /// Grid search: probes render as armed mines.
    Mines,
    /// Path linking: endpoints render as relay nodes.
    Relay,
    /// Path linking: grid overlay flickers.
    Interference,
}

/// Chance (percent) that a tier-2 puzzle carries a modifier.
pub const MODIFIER_TIER2_CHANCE: u32 = 60;
/// Chance (percent) that a tier-3 puzzle carries a modifier.
pub const MODIFIER_TIER3_CHANCE: u32 = 75;
/// Given a tier-3 modifier, chance (percent) it is the tier-3 one.
pub const MODIFIER_TIER3_OWN_WEIGHT: u32 = 80;

/// Rolls the modifier slot for a freshly generated puzzle.
///
/// Draw accounting is part of the replay contract: tiers 0 and 1 consume
/// no draws, tier 2 consumes exactly one, tier 3 consumes one or two.
pub fn roll_modifier(rng: &mut GameRng, security_level: u8, game: GameKind) -> Option<Modifier> {
    let (tier2, tier3) = match game {
        GameKind::CodeBreaking => (Modifier::Blackout, Modifier::Corrupted),
        GameKind::GridSearch => (Modifier::Decoys, Modifier::Mines),
        GameKind::PathLinking => (Modifier::Relay, Modifier::Interference),
    };

    match tier_index(security_level) {
        2 => {
            if rng.next_range(1, 100) <= MODIFIER_TIER2_CHANCE {
                Some(tier2)
            } else {
                None
            }
        }
        3 => {
            if rng.next_range(1, 100) > MODIFIER_TIER3_CHANCE {
                return None;
            }
            if rng.next_range(1, 100) <= MODIFIER_TIER3_OWN_WEIGHT {
                Some(tier3)
            } else {
                Some(tier2)
            }
        }
        _ => None,
    }
}

// =============================================================================
// RESOLUTION TUNING
// =============================================================================

/// Global payout scalar applied to every resolved session.
pub const REWARD_MULTIPLIER: f64 = 3.0;

/// Minimum score for a processing power drop.
pub const PROCESSING_POWER_MIN_SCORE: u32 = 75;
/// Minimum target security for a processing power drop.
pub const PROCESSING_POWER_MIN_SECURITY: u8 = 65;
/// Roll bounds for a qualifying processing power drop.
pub const PROCESSING_POWER_ROLL: (u32, u32) = (1, 2);

/// Detection chance clamp bounds, in percent.
pub const DETECTION_CLAMP: (f64, f64) = (5.0, 95.0);

/// Residual trace curve for clean high-score exits.
#[derive(Debug, Clone, Copy)]
pub struct ResidualTrace {
    /// Security level where residual traces start to accrue.
    pub security_floor: f64,
    /// Percent of residual chance per security point above the floor.
    pub security_scale: f64,
    /// Stealth divisor subtracted from the residual chance.
    pub stealth_divisor: f64,
}

/// Residual trace tuning.
pub const RESIDUAL_TRACE: ResidualTrace = ResidualTrace {
    security_floor: 60.0,
    security_scale: 0.5,
    stealth_divisor: 4.0,
};

/// Escalating collateral damage per heat level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatDamageTier {
    /// Minimum damage per affected system.
    pub min_damage: u32,
    /// Maximum damage per affected system.
    pub max_damage: u32,
    /// Number of player systems hit.
    pub systems_affected: usize,
}

/// Heat damage tiers; the index saturates at the last entry.
pub const HEAT_DAMAGE_TIERS: [HeatDamageTier; 3] = [
    HeatDamageTier { min_damage: 5, max_damage: 10, systems_affected: 1 },
    HeatDamageTier { min_damage: 10, max_damage: 20, systems_affected: 2 },
    HeatDamageTier { min_damage: 20, max_damage: 40, systems_affected: 3 },
];

/// Damage tuning for a heat level.
pub fn heat_damage_tier(heat_level: u32) -> &'static HeatDamageTier {
    let idx = (heat_level as usize).min(HEAT_DAMAGE_TIERS.len() - 1);
    &HEAT_DAMAGE_TIERS[idx]
}

// =============================================================================
// TESTS
// =============================================================================
