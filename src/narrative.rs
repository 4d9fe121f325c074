//! Narrative Templates
//!
//! Terminal-styled outcome text for resolved infiltrations. Templates
//! use `{{placeholder}}` tokens; the resolver picks one at random per
//! family and interpolates the run's numbers.

use rand::Rng;

/// Clean success: the hack landed and nobody noticed.
///
/// Vars: `target`, `security`, `power`, `credits`, `data`,
/// `reputation`, `processingPower`, `rounds`.
pub const HACK_SUCCESS_TEMPLATES: [&str; 7] = [
    "> Infiltration of {{target}} successful.\n> Security level {{security}} breached (hack power: {{power}}).\n> Extracted: {{credits}} CR, {{data}} DATA\n> Reputation +{{reputation}}\n> Connection terminated. No traces found.",
    "> Breach complete. {{target}} defenses bypassed in {{rounds}} cycles.\n> Payload delivered: {{credits}} CR, {{data}} DATA siphoned.\n> Reputation +{{reputation}}. Clean exit.",
    "> {{target}} firewall crumbled under sustained assault.\n> Core dump: {{credits}} CR | {{data}} DATA | +{{reputation}} REP\n> Trace logs purged. Ghost protocol engaged.",
    "> Root access obtained on {{target}}.\n> Security rating {{security}} was no match for hack power {{power}}.\n> Loot: {{credits}} CR, {{data}} DATA, +{{reputation}} REP\n> Disconnected. Zero footprint.",
    "> {{target}} compromised. Data exfiltration complete.\n> Resources acquired: {{credits}} CR, {{data}} DATA\n> Reputation increased by {{reputation}}.\n> Session scrubbed. No alerts triggered.",
    "> Tunneled through {{target}} perimeter in record time.\n> Harvest: {{credits}} CR | {{data}} DATA | {{reputation}} REP\n> All logs overwritten. The network never knew.",
    "> {{target}} (security level {{security}}) neutralized.\n> Power differential: {{power}} vs {{security}}. Outcome: inevitable.\n> Take: {{credits}} CR, {{data}} DATA, +{{reputation}} REP\n> Phantom disconnect executed.",
];

/// Traced success: the payload landed but security tagged the exit.
///
/// Vars: `target`, `security`, `credits`, `data`, `reputation`,
/// `damageReport`.
pub const HACK_SUCCESS_TRACED_TEMPLATES: [&str; 5] = [
    "> Infiltration of {{target}} successful. WARNING: trace detected.\n> Extracted: {{credits}} CR, {{data}} DATA, +{{reputation}} REP\n> Countermeasures caught your exit: {{damageReport}}\n> Heat level increased. Payload secured.",
    "> {{target}} breached. Security level {{security}} cracked.\n> Loot secured: {{credits}} CR, {{data}} DATA, +{{reputation}} REP\n> The ICE tagged you on the way out: {{damageReport}}\n> Heat rising.",
    "> Objective complete. {{target}} gave up {{credits}} CR and {{data}} DATA.\n> Reputation +{{reputation}}.\n> ALERT: hostile trace latched during extraction. Damage: {{damageReport}}\n> Recommend cooling off.",
    "> {{target}} defenses fell, but not quietly.\n> Haul: {{credits}} CR | {{data}} DATA | +{{reputation}} REP\n> Security logged your signature. Systems hit: {{damageReport}}\n> Heat signature elevated.",
    "> Smash and grab on {{target}} paid out.\n> {{credits}} CR, {{data}} DATA banked. Reputation +{{reputation}}.\n> The exit was loud. Countermeasures connected: {{damageReport}}\n> Expect heat.",
];

/// Failure with a clean withdrawal.
///
/// Vars: `target`, `security`, `stealth`, `power`.
pub const HACK_FAIL_UNDETECTED_TEMPLATES: [&str; 5] = [
    "> Infiltration of {{target}} FAILED.\n> Target security held. Hack unsuccessful.\n> Escaped undetected (stealth: {{stealth}}). No damage taken.\n> Connection terminated cleanly.",
    "> {{target}} repelled the intrusion attempt.\n> Firewall integrity maintained at security level {{security}}.\n> Stealth protocols kept you hidden. No countermeasures triggered.",
    "> Access denied. {{target}} security too robust this cycle.\n> Your stealth rating ({{stealth}}) kept you in the shadows.\n> No damage sustained. Try a different vector.",
    "> Failed to penetrate {{target}} defenses.\n> The encryption was stronger than projected.\n> Ghost mode held. You remain undetected.",
    "> {{target}} access attempt unsuccessful.\n> Security level {{security}} withstood hack power {{power}}.\n> Clean withdrawal. Stealth integrity maintained.",
];

/// Failure with countermeasures landing.
///
/// Vars: `target`, `detection`, `damageReport`.
pub const HACK_FAIL_DETECTED_TEMPLATES: [&str; 5] = [
    "> Infiltration of {{target}} FAILED.\n> DETECTED by security systems! (detection: {{detection}}%)\n> Countermeasures engaged: {{damageReport}}\n> Heat level increased.\n> Connection severed.",
    "> ALERT: {{target}} has identified your intrusion!\n> Detection probability was {{detection}}%. You rolled badly.\n> System damage: {{damageReport}}\n> Heat rising. Watch your exposure.",
    "> Breach attempt on {{target}} FAILED and DETECTED.\n> Hostile ICE traced your connection.\n> Damage sustained: {{damageReport}}\n> Heat level escalated. Recommend repairs.",
    "> {{target}} security flagged your intrusion vector.\n> Counter-intrusion deployed. Detection: {{detection}}%.\n> Systems hit: {{damageReport}}\n> Your heat signature just got louder.",
    "> CRITICAL: Detected during {{target}} infiltration.\n> Active countermeasures shredded your defenses.\n> Damage: {{damageReport}}\n> Heat increased. Go dark or go down.",
];

/// Picks one template uniformly at random.
pub fn pick_template<'a, R: Rng>(rng: &mut R, templates: &'a [&'a str]) -> &'a str {
    templates[rng.gen_range(0..templates.len())]
}

/// Fills `{{placeholder}}` tokens from the var list in one pass over
/// the template. Substituted values are never re-scanned, and tokens
/// with no matching var are left in place.
pub fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        rest = &rest[open..];

        let token = rest[2..]
            .find("}}")
            .map(|close| (&rest[2..close + 2], close + 4));
        match token {
            Some((key, token_len)) if !key.contains('{') => {
                match vars.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[..token_len]),
                }
                rest = &rest[token_len..];
            }
            _ => {
                // Unterminated or nested opener: literal braces.
                out.push_str("{{");
                rest = &rest[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_known_keys() {
        let filled = fill_template(
            "> {{target}} yielded {{credits}} CR.",
            &[("target", "Helix Vault".to_string()), ("credits", "42".to_string())],
        );
        assert_eq!(filled, "> Helix Vault yielded 42 CR.");
    }

    #[test]
    fn test_fill_leaves_unknown_keys() {
        let filled = fill_template("> {{target}} at {{depth}}.", &[("target", "node".to_string())]);
        assert_eq!(filled, "> node at {{depth}}.");
    }

    #[test]
    fn test_fill_replaces_repeated_keys() {
        let filled = fill_template(
            "{{power}} vs {{security}}: {{power}} wins.",
            &[("power", "80".to_string()), ("security", "40".to_string())],
        );
        assert_eq!(filled, "80 vs 40: 80 wins.");
    }

    #[test]
    fn test_filled_values_are_not_rescanned() {
        // A backend-supplied name can carry token syntax of its own; it
        // must come through verbatim.
        let filled = fill_template(
            "> {{target}} paid {{credits}} CR.",
            &[
                ("target", "{{credits}} Exchange".to_string()),
                ("credits", "500".to_string()),
            ],
        );
        assert_eq!(filled, "> {{credits}} Exchange paid 500 CR.");
    }

    #[test]
    fn test_pick_stays_in_bounds() {
        let templates = ["a", "b", "c"];
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let picked = pick_template(&mut rng, &templates);
            assert!(templates.contains(&picked));
        }
    }

    #[test]
    fn test_every_family_fills_clean() {
        let vars = [
            ("target", "Helix Vault".to_string()),
            ("security", "55".to_string()),
            ("power", "48".to_string()),
            ("credits", "176".to_string()),
            ("data", "105".to_string()),
            ("reputation", "18".to_string()),
            ("processingPower", "2".to_string()),
            ("rounds", "4".to_string()),
            ("stealth", "30".to_string()),
            ("detection", "35".to_string()),
            ("damageReport", "neural_core: -7HP".to_string()),
        ];
        let families: [&[&str]; 4] = [
            &HACK_SUCCESS_TEMPLATES,
            &HACK_SUCCESS_TRACED_TEMPLATES,
            &HACK_FAIL_UNDETECTED_TEMPLATES,
            &HACK_FAIL_DETECTED_TEMPLATES,
        ];
        for family in families {
            for template in family {
                let filled = fill_template(template, &vars);
                assert!(filled.starts_with("> "), "bad prefix: {filled}");
                assert!(!filled.contains("{{"), "unfilled token in: {filled}");
            }
        }
    }
}
