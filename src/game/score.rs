//! Scoring Curves
//!
//! Every session resolves to a 0-100 score, and resolution turns that
//! score into payout and detection multipliers. All curves are pure
//! functions, so balance changes stay reviewable in one place.

/// Code breaking: 100 for a first-guess solve, sliding down to 50 for
/// using the whole budget. An unsolved code scores 0.
pub fn code_breaking_score(guesses_used: u32, max_guesses: u32, solved: bool) -> u32 {
    if !solved {
        return 0;
    }
    if max_guesses <= 1 {
        return 100;
    }
    let max = f64::from(max_guesses);
    let used = f64::from(guesses_used);
    (50.0 + 50.0 * (max - used) / (max - 1.0)).round() as u32
}

/// Grid search: half the score for coverage, half for probe efficiency.
/// Zero probes means the session was never really played, so 0.
pub fn grid_search_score(
    ports_found: u32,
    total_ports: u32,
    probes_used: u32,
    max_probes: u32,
) -> u32 {
    if probes_used == 0 {
        return 0;
    }

    let found = f64::from(ports_found);
    let coverage = 50.0 * found / f64::from(total_ports);

    let wasted = f64::from(probes_used) - found;
    let slack = (f64::from(max_probes) - found).max(1.0);
    let efficiency = 50.0 * (1.0 - wasted / slack).max(0.0);

    (coverage + efficiency).min(100.0).round() as u32
}

/// Path linking: 60 points for connections, 40 for board coverage scaled
/// by time efficiency.
///
/// A grace window of 2 seconds per pair keeps quick finishes at full
/// credit; past it, coverage credit decays linearly to zero at the time
/// limit.
pub fn path_linking_score(
    connected_pairs: u32,
    total_pairs: u32,
    filled_cells: u32,
    total_cells: u32,
    elapsed_ms: u64,
    time_limit_ms: u64,
) -> u32 {
    let grace_ms = u64::from(total_pairs) * 2000;
    let time_efficiency = if time_limit_ms > grace_ms {
        let over = elapsed_ms.saturating_sub(grace_ms) as f64;
        (1.0 - over / (time_limit_ms - grace_ms) as f64).max(0.0)
    } else {
        1.0
    };

    let connections = 60.0 * f64::from(connected_pairs) / f64::from(total_pairs);
    let coverage = 40.0 * (f64::from(filled_cells) / f64::from(total_cells)) * time_efficiency;
    (connections + coverage).round() as u32
}

/// Converts a score into the payout multiplier.
///
/// Piecewise linear and deliberately harsh below 50: a botched run pays
/// pennies, a clean run pays up to 1.25x.
pub fn reward_multiplier(score: u32) -> f64 {
    let s = f64::from(score.min(100));
    if s == 0.0 {
        0.0
    } else if s < 25.0 {
        (s / 25.0) * 0.08
    } else if s < 50.0 {
        0.08 + ((s - 25.0) / 25.0) * 0.62
    } else {
        0.70 + ((s - 50.0) / 50.0) * 0.55
    }
}

/// Converts a score into the detection-chance multiplier.
///
/// A score of 50 or better is a clean primary exit; 25-49 halves the
/// exposure; below that the full detection chance applies.
pub fn detection_multiplier(score: u32) -> f64 {
    if score >= 50 {
        0.0
    } else if score >= 25 {
        0.5
    } else {
        1.0
    }
}

/// Whether a resolved session clears accumulated heat.
pub fn resets_heat(score: u32, detected: bool) -> bool {
    score >= 50 && !detected
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-12
    }

    #[test]
    fn test_code_breaking_curve() {
        assert_eq!(code_breaking_score(1, 9, true), 100);
        assert_eq!(code_breaking_score(5, 9, true), 75);
        assert_eq!(code_breaking_score(9, 9, true), 50);
        assert_eq!(code_breaking_score(3, 8, true), 86);
        assert_eq!(code_breaking_score(9, 9, false), 0);
        assert_eq!(code_breaking_score(1, 1, true), 100);
    }

    #[test]
    fn test_grid_search_curve() {
        // Perfect run: all ports, no wasted probes.
        assert_eq!(grid_search_score(3, 3, 3, 15), 100);
        // Whole budget burned on misses.
        assert_eq!(grid_search_score(0, 3, 15, 15), 0);
        // Never probed at all.
        assert_eq!(grid_search_score(0, 3, 0, 15), 0);
        // Two of three found with eight misses: 33.3 + 19.2 rounds to 53.
        assert_eq!(grid_search_score(2, 3, 10, 15), 53);
        // Degenerate budget exercises the efficiency guard.
        assert_eq!(grid_search_score(2, 3, 3, 2), 33);
    }

    #[test]
    fn test_path_linking_curve() {
        // Inside the grace window, coverage keeps full credit.
        assert_eq!(path_linking_score(4, 4, 25, 25, 8_000, 90_000), 100);
        // Halfway through the decaying window: 60 + 40 * 0.5.
        assert_eq!(path_linking_score(4, 4, 25, 25, 49_000, 90_000), 80);
        // At the limit only connections count.
        assert_eq!(path_linking_score(4, 4, 25, 25, 90_000, 90_000), 60);
        // A limit shorter than the grace window never decays.
        assert_eq!(path_linking_score(4, 4, 25, 25, 500_000, 8_000), 100);
        assert_eq!(path_linking_score(0, 4, 0, 25, 0, 90_000), 0);
    }

    #[test]
    fn test_reward_multiplier_checkpoints() {
        assert!(close(reward_multiplier(0), 0.0));
        assert!(close(reward_multiplier(12), 0.0384));
        assert!(close(reward_multiplier(25), 0.08));
        assert!(close(reward_multiplier(40), 0.452));
        assert!(close(reward_multiplier(50), 0.70));
        assert!(close(reward_multiplier(75), 0.975));
        assert!(close(reward_multiplier(100), 1.25));
        // Out-of-range scores clamp instead of extrapolating.
        assert!(close(reward_multiplier(250), 1.25));
    }

    #[test]
    fn test_detection_multiplier_bands() {
        assert_eq!(detection_multiplier(0), 1.0);
        assert_eq!(detection_multiplier(24), 1.0);
        assert_eq!(detection_multiplier(25), 0.5);
        assert_eq!(detection_multiplier(49), 0.5);
        assert_eq!(detection_multiplier(50), 0.0);
        assert_eq!(detection_multiplier(100), 0.0);
    }

    #[test]
    fn test_heat_reset_rule() {
        assert!(resets_heat(50, false));
        assert!(resets_heat(100, false));
        assert!(!resets_heat(50, true));
        assert!(!resets_heat(49, false));
    }

    proptest! {
        #[test]
        fn prop_reward_multiplier_is_monotonic(score in 1u32..=100) {
            prop_assert!(reward_multiplier(score) >= reward_multiplier(score - 1));
            prop_assert!(reward_multiplier(score) <= 1.25);
        }

        #[test]
        fn prop_grid_score_bounded(
            total in 1u32..=8,
            found_pick in 0u32..=8,
            max_probes in 9u32..=25,
            wasted in 0u32..=25,
        ) {
            let found = found_pick.min(total);
            let probes = (found + wasted).min(max_probes).max(found);
            let score = grid_search_score(found, total, probes, max_probes);
            prop_assert!(score <= 100);
        }

        #[test]
        fn prop_solved_code_scores_at_least_50(
            max_guesses in 1u32..=9,
            used_pick in 1u32..=9,
        ) {
            let used = used_pick.min(max_guesses);
            let score = code_breaking_score(used, max_guesses, true);
            prop_assert!((50..=100).contains(&score));
        }

        #[test]
        fn prop_fewer_guesses_never_score_lower(
            max_guesses in 2u32..=9,
            used_pick in 1u32..=8,
        ) {
            let used = used_pick.min(max_guesses - 1);
            prop_assert!(
                code_breaking_score(used, max_guesses, true)
                    >= code_breaking_score(used + 1, max_guesses, true)
            );
        }
    }
}
