//! Resolution Rolls
//!
//! Pure functions behind game resolution: payout assembly, the detection
//! gauntlet, countermeasure damage, and the heat decision. Everything
//! here takes its randomness through a caller-supplied [`rand::Rng`],
//! because resolution rolls are live dice, not part of the replayable
//! puzzle stream.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::backend::{
    DamageReport, HeatChange, RewardBundle, SystemDamage, SystemState, SystemStatus,
};
use crate::game::balance::{
    heat_damage_tier, DETECTION_CLAMP, PROCESSING_POWER_MIN_SCORE, PROCESSING_POWER_MIN_SECURITY,
    PROCESSING_POWER_ROLL, RESIDUAL_TRACE, REWARD_MULTIPLIER,
};
use crate::game::score::{detection_multiplier, resets_heat, reward_multiplier};
use crate::game::session::StatsSnapshot;
use crate::game::target::ScanTarget;

/// Computes the full payout for a resolved session.
///
/// Credits and data scale with the player's percentage bonuses, the
/// hack reward multiplier, and the season multiplier. Reputation scales
/// with the score alone, and XP additionally with the XP multiplier.
/// Ineligible sessions (no moves made) pay nothing. The processing
/// power drop only rolls on strong runs against hardened targets.
pub fn assemble_rewards<R: Rng>(
    rng: &mut R,
    target: &ScanTarget,
    stats: &StatsSnapshot,
    score: u32,
    eligible: bool,
    season_multiplier: f64,
) -> RewardBundle {
    let base = target.base_rewards;
    let score_mult = if eligible { reward_multiplier(score) } else { 0.0 };
    let credit_mult = 1.0 + stats.credit_bonus / 100.0;
    let data_mult = 1.0 + stats.data_bonus / 100.0;

    let credits = (base.credits as f64
        * REWARD_MULTIPLIER
        * score_mult
        * credit_mult
        * stats.hack_reward_multiplier
        * season_multiplier)
        .floor() as u64;
    let data = (base.data as f64
        * REWARD_MULTIPLIER
        * score_mult
        * data_mult
        * stats.hack_reward_multiplier
        * season_multiplier)
        .floor() as u64;
    let reputation = (base.reputation as f64 * REWARD_MULTIPLIER * score_mult).floor() as u64;
    let xp =
        (base.xp as f64 * REWARD_MULTIPLIER * score_mult * stats.xp_gain_multiplier).floor() as u64;

    let processing_power = if score >= PROCESSING_POWER_MIN_SCORE
        && target.security_level >= PROCESSING_POWER_MIN_SECURITY
    {
        let (lo, hi) = PROCESSING_POWER_ROLL;
        let roll = rng.gen_range(lo..=hi);
        Some(((roll as f64 * season_multiplier).floor() as u64).max(1))
    } else {
        None
    };

    RewardBundle {
        credits,
        data,
        reputation,
        xp,
        processing_power,
    }
}

/// Effective primary detection chance in percent, clamped to the
/// configured band. Only meaningful when the score-based detection
/// multiplier is positive.
fn effective_detection(target: &ScanTarget, stats: &StatsSnapshot, detection_mult: f64) -> f64 {
    let (floor, ceil) = DETECTION_CLAMP;
    ((target.detection_chance - stats.stealth as f64 / 2.0)
        * stats.detection_chance_multiplier
        * detection_mult)
        .clamp(floor, ceil)
}

/// Residual trace chance in percent for a clean high-score exit.
/// Hardened targets log breach signatures even when the run itself
/// tripped nothing; stealth routing masks them.
fn residual_trace(security_level: u8, stealth: i64) -> f64 {
    ((f64::from(security_level) - RESIDUAL_TRACE.security_floor) * RESIDUAL_TRACE.security_scale
        - stealth as f64 / RESIDUAL_TRACE.stealth_divisor)
        .max(0.0)
}

/// Runs the detection gauntlet for a resolved session.
///
/// Low scores face the primary roll at full or half weight; scores of
/// 50 and above skip it entirely but still face the residual trace
/// roll against hardened targets.
pub fn roll_detection<R: Rng>(
    rng: &mut R,
    target: &ScanTarget,
    stats: &StatsSnapshot,
    score: u32,
) -> bool {
    let detection_mult = detection_multiplier(score);
    let mut detected = false;

    if detection_mult > 0.0 {
        let effective = effective_detection(target, stats, detection_mult);
        let roll: u32 = rng.gen_range(1..=100);
        detected = f64::from(roll) <= effective;
    }

    if !detected && score >= 50 {
        let residual = residual_trace(target.security_level, stats.stealth);
        if residual > 0.0 {
            let roll: u32 = rng.gen_range(1..=100);
            detected = f64::from(roll) <= residual;
        }
    }

    detected
}

/// Rolls countermeasure damage against a random subset of the player's
/// systems. Heat level picks the tier; the tier caps how many systems
/// are hit and how hard. Health floors at 0.
pub fn roll_damage<R: Rng>(rng: &mut R, heat_level: u32, systems: &[SystemState]) -> DamageReport {
    let tier = heat_damage_tier(heat_level);

    let mut pool = systems.to_vec();
    pool.shuffle(rng);
    pool.truncate(tier.systems_affected);

    let systems = pool
        .iter()
        .map(|sys| {
            let damage = rng.gen_range(tier.min_damage..=tier.max_damage);
            let new_health = (sys.health - i64::from(damage)).max(0);
            SystemDamage {
                system: sys.system,
                damage,
                new_health,
                new_status: SystemStatus::for_health(new_health),
            }
        })
        .collect();

    DamageReport { systems }
}

/// Decides the heat adjustment for a resolved session.
pub fn heat_change(score: u32, detected: bool) -> HeatChange {
    if detected {
        HeatChange::Raise
    } else if resets_heat(score, detected) {
        HeatChange::Reset
    } else {
        HeatChange::Keep
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backend::SystemType;
    use crate::game::target::TargetKind;

    fn target(security: u8, detection_chance: f64) -> ScanTarget {
        ScanTarget::new(0, "test-node", TargetKind::Financial, security, detection_chance)
    }

    fn six_systems() -> Vec<SystemState> {
        [
            SystemType::NeuralCore,
            SystemType::MemoryBanks,
            SystemType::QuantumProcessor,
            SystemType::SecurityProtocols,
            SystemType::DataPathways,
            SystemType::EnergyDistribution,
        ]
        .iter()
        .map(|&system| SystemState { system, health: 100 })
        .collect()
    }

    #[test]
    fn test_rewards_perfect_run() {
        // Security 50 bases out at 56/34/6/20. A perfect score multiplies
        // by 3.0 * 1.25, credits additionally by the 10% bonus.
        // These values must never change!
        let mut rng = rand::thread_rng();
        let mut stats = StatsSnapshot::baseline(30, 20);
        stats.credit_bonus = 10.0;

        let bundle = assemble_rewards(&mut rng, &target(50, 40.0), &stats, 100, true, 1.0);
        assert_eq!(bundle.credits, 231);
        assert_eq!(bundle.data, 127);
        assert_eq!(bundle.reputation, 22);
        assert_eq!(bundle.xp, 75);
        // Security 50 is below the processing power floor.
        assert_eq!(bundle.processing_power, None);
    }

    #[test]
    fn test_rewards_zero_score_pays_nothing() {
        let mut rng = rand::thread_rng();
        let stats = StatsSnapshot::baseline(30, 20);
        let bundle = assemble_rewards(&mut rng, &target(50, 40.0), &stats, 0, true, 1.0);
        assert_eq!(bundle.credits, 0);
        assert_eq!(bundle.data, 0);
        assert_eq!(bundle.reputation, 0);
        assert_eq!(bundle.xp, 0);
    }

    #[test]
    fn test_rewards_ineligible_pays_nothing() {
        // A session with no moves forfeits the payout even at top score.
        let mut rng = rand::thread_rng();
        let stats = StatsSnapshot::baseline(30, 20);
        let bundle = assemble_rewards(&mut rng, &target(50, 40.0), &stats, 100, false, 1.0);
        assert_eq!(bundle.credits, 0);
        assert_eq!(bundle.xp, 0);
    }

    #[test]
    fn test_season_multiplier_spares_reputation_and_xp() {
        let mut rng = rand::thread_rng();
        let stats = StatsSnapshot::baseline(30, 20);
        let bundle = assemble_rewards(&mut rng, &target(50, 40.0), &stats, 100, true, 2.0);
        // 56 * 3 * 1.25 doubles to 420; reputation and XP ignore the season.
        assert_eq!(bundle.credits, 420);
        assert_eq!(bundle.reputation, 22);
        assert_eq!(bundle.xp, 75);
    }

    #[test]
    fn test_processing_power_gate() {
        let mut rng = rand::thread_rng();
        let stats = StatsSnapshot::baseline(30, 20);

        let bundle = assemble_rewards(&mut rng, &target(80, 40.0), &stats, 75, true, 1.0);
        let drop = bundle.processing_power.unwrap();
        assert!((1..=2).contains(&drop));

        // One point short on either axis drops nothing.
        let bundle = assemble_rewards(&mut rng, &target(80, 40.0), &stats, 74, true, 1.0);
        assert_eq!(bundle.processing_power, None);
        let bundle = assemble_rewards(&mut rng, &target(64, 40.0), &stats, 100, true, 1.0);
        assert_eq!(bundle.processing_power, None);
    }

    #[test]
    fn test_effective_detection_clamps() {
        let stats = StatsSnapshot::baseline(30, 0);
        // 40 - 0/2 = 40, untouched by the clamp.
        assert_eq!(effective_detection(&target(50, 40.0), &stats, 1.0), 40.0);
        // Half weight lands at 20.
        assert_eq!(effective_detection(&target(50, 40.0), &stats, 0.5), 20.0);
        // Far past the ceiling clamps to 95.
        assert_eq!(effective_detection(&target(50, 500.0), &stats, 1.0), 95.0);
        // Heavy stealth clamps to the 5 percent floor.
        let ghost = StatsSnapshot::baseline(30, 200);
        assert_eq!(effective_detection(&target(50, 40.0), &ghost, 1.0), 5.0);
    }

    #[test]
    fn test_residual_trace_curve() {
        // These values must never change!
        assert_eq!(residual_trace(60, 0), 0.0);
        assert_eq!(residual_trace(80, 0), 10.0);
        assert_eq!(residual_trace(80, 20), 5.0);
        assert_eq!(residual_trace(80, 40), 0.0);
        assert_eq!(residual_trace(40, 0), 0.0);
    }

    #[test]
    fn test_clean_low_security_run_is_never_detected() {
        // Score 50+ skips the primary roll and security 40 leaves no
        // residual, so no dice can produce a detection.
        let mut rng = rand::thread_rng();
        let stats = StatsSnapshot::baseline(30, 0);
        for _ in 0..100 {
            assert!(!roll_detection(&mut rng, &target(40, 90.0), &stats, 50));
        }
    }

    #[test]
    fn test_detection_rates_follow_the_clamp() {
        let mut rng = rand::thread_rng();
        let stats = StatsSnapshot::baseline(30, 0);

        // Effective 95: all but certain over 500 rolls.
        let hot = target(30, 500.0);
        let hits = (0..500)
            .filter(|_| roll_detection(&mut rng, &hot, &stats, 0))
            .count();
        assert!(hits > 300, "expected mostly detections, got {hits}");

        // Effective 5: rare, but present over 500 rolls.
        let ghost = StatsSnapshot::baseline(30, 200);
        let cold = target(30, 10.0);
        let hits = (0..500)
            .filter(|_| roll_detection(&mut rng, &cold, &ghost, 0))
            .count();
        assert!(hits < 200, "expected few detections, got {hits}");
        assert!(hits > 0, "5 percent floor should still fire over 500 rolls");
    }

    #[test]
    fn test_damage_tier_scaling() {
        let mut rng = rand::thread_rng();
        let systems = six_systems();

        let report = roll_damage(&mut rng, 0, &systems);
        assert_eq!(report.systems.len(), 1);
        for hit in &report.systems {
            assert!((5..=10).contains(&hit.damage));
            assert_eq!(hit.new_health, 100 - i64::from(hit.damage));
            assert_eq!(hit.new_status, SystemStatus::for_health(hit.new_health));
        }

        let report = roll_damage(&mut rng, 1, &systems);
        assert_eq!(report.systems.len(), 2);

        // Heat past the table saturates at the last tier.
        let report = roll_damage(&mut rng, 9, &systems);
        assert_eq!(report.systems.len(), 3);
        for hit in &report.systems {
            assert!((20..=40).contains(&hit.damage));
        }
    }

    #[test]
    fn test_damage_hits_distinct_systems() {
        let mut rng = rand::thread_rng();
        let systems = six_systems();
        for _ in 0..50 {
            let report = roll_damage(&mut rng, 9, &systems);
            let mut seen: Vec<&str> = report.systems.iter().map(|d| d.system.as_str()).collect();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 3);
        }
    }

    #[test]
    fn test_damage_floors_health_at_zero() {
        let mut rng = rand::thread_rng();
        let frail = vec![SystemState {
            system: SystemType::NeuralCore,
            health: 3,
        }];
        let report = roll_damage(&mut rng, 0, &frail);
        assert_eq!(report.systems.len(), 1);
        assert_eq!(report.systems[0].new_health, 0);
        assert_eq!(report.systems[0].new_status, SystemStatus::Corrupted);
    }

    #[test]
    fn test_damage_with_fewer_systems_than_tier() {
        let mut rng = rand::thread_rng();
        let one = vec![SystemState {
            system: SystemType::DataPathways,
            health: 50,
        }];
        let report = roll_damage(&mut rng, 9, &one);
        assert_eq!(report.systems.len(), 1);

        let report = roll_damage(&mut rng, 9, &[]);
        assert!(report.systems.is_empty());
    }

    #[test]
    fn test_heat_change_rules() {
        assert_eq!(heat_change(100, true), HeatChange::Raise);
        assert_eq!(heat_change(0, true), HeatChange::Raise);
        assert_eq!(heat_change(50, false), HeatChange::Reset);
        assert_eq!(heat_change(100, false), HeatChange::Reset);
        assert_eq!(heat_change(49, false), HeatChange::Keep);
        assert_eq!(heat_change(0, false), HeatChange::Keep);
    }
}
