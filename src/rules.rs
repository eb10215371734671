//! Hensel outer-totalistic rulestring parsing, emission, and the
//! canonical D4 transition lookup table.
//!
//! A rule is a map from transition names (`"B3c"`, `"S2e"`, ...) to a
//! literal: `TRUE` if the transition is enabled, `FALSE` if banned, or a
//! free variable if the rule is "partial" (unspecified, to be decided by
//! the solver).

use std::collections::HashMap;

use crate::literal::{Lit, FALSE, TRUE};
use crate::misc::log::targets;
use crate::types::err::RuleError;

/// `rule[name]` gives the literal controlling one neighbour-count/letter
/// transition, e.g. `rule["B3c"]`.
pub type RuleTable = HashMap<String, Lit>;

/// For each neighbour count 0..=8, the alphabet of Hensel letters that
/// distinguish non-equivalent neighbourhoods of that count.
pub fn possible_transitions(count: u8) -> &'static [char] {
    match count {
        0 | 8 => &['c'],
        1 | 7 => &['c', 'e'],
        2 | 6 => &['a', 'c', 'e', 'i', 'k', 'n'],
        3 | 5 => &['a', 'c', 'e', 'i', 'j', 'k', 'n', 'q', 'r', 'y'],
        4 => &['a', 'c', 'e', 'i', 'j', 'k', 'n', 'q', 'r', 't', 'w', 'y', 'z'],
        _ => &[],
    }
}

/// The 102-entry canonical map from a neighbourhood pattern (8 signed
/// unit values, clockwise from the top, `1` alive / `-1` dead) to its
/// canonical transition name. The pattern given to this table must
/// already be the lexicographic maximum of its 8 D4 images (see
/// [`sort_neighbours`]).
fn transition_lookup(pattern: [i8; 8]) -> Option<&'static str> {
    const TABLE: &[([i8; 8], &str)] = &[
        ([-1, -1, -1, -1, -1, -1, -1, -1], "0c"),
        ([-1, 1, -1, -1, -1, -1, -1, -1], "1c"),
        ([1, -1, -1, -1, -1, -1, -1, -1], "1e"),
        ([-1, 1, -1, 1, -1, -1, -1, -1], "2c"),
        ([1, -1, 1, -1, -1, -1, -1, -1], "2e"),
        ([1, -1, -1, 1, -1, -1, -1, -1], "2k"),
        ([1, 1, -1, -1, -1, -1, -1, -1], "2a"),
        ([1, -1, -1, -1, 1, -1, -1, -1], "2i"),
        ([-1, 1, -1, -1, -1, 1, -1, -1], "2n"),
        ([-1, 1, -1, 1, -1, 1, -1, -1], "3c"),
        ([1, -1, 1, -1, 1, -1, -1, -1], "3e"),
        ([1, -1, 1, -1, -1, 1, -1, -1], "3k"),
        ([1, 1, 1, -1, -1, -1, -1, -1], "3a"),
        ([1, 1, -1, -1, -1, -1, -1, 1], "3i"),
        ([1, 1, -1, 1, -1, -1, -1, -1], "3n"),
        ([1, -1, -1, 1, -1, 1, -1, -1], "3y"),
        ([1, 1, -1, -1, -1, 1, -1, -1], "3q"),
        ([1, 1, -1, -1, -1, -1, 1, -1], "3j"),
        ([1, 1, -1, -1, 1, -1, -1, -1], "3r"),
        ([-1, 1, -1, 1, -1, 1, -1, 1], "4c"),
        ([1, -1, 1, -1, 1, -1, 1, -1], "4e"),
        ([1, 1, -1, 1, -1, -1, 1, -1], "4k"),
        ([1, 1, 1, 1, -1, -1, -1, -1], "4a"),
        ([1, 1, -1, 1, 1, -1, -1, -1], "4i"),
        ([1, 1, -1, 1, -1, -1, -1, 1], "4n"),
        ([1, 1, -1, 1, -1, 1, -1, -1], "4y"),
        ([1, 1, 1, -1, -1, 1, -1, -1], "4q"),
        ([1, 1, -1, -1, 1, -1, 1, -1], "4j"),
        ([1, 1, 1, -1, 1, -1, -1, -1], "4r"),
        ([1, 1, -1, -1, 1, -1, -1, 1], "4t"),
        ([1, 1, -1, -1, -1, 1, 1, -1], "4w"),
        ([1, 1, -1, -1, 1, 1, -1, -1], "4z"),
        ([1, 1, 1, -1, 1, -1, 1, -1], "5c"),
        ([1, 1, -1, 1, -1, 1, -1, 1], "5e"),
        ([1, 1, -1, 1, -1, 1, 1, -1], "5k"),
        ([1, 1, 1, 1, -1, -1, -1, 1], "5a"),
        ([1, 1, 1, 1, 1, -1, -1, -1], "5i"),
        ([1, 1, 1, 1, -1, -1, 1, -1], "5n"),
        ([1, 1, -1, 1, 1, -1, 1, -1], "5y"),
        ([1, 1, 1, -1, 1, 1, -1, -1], "5q"),
        ([1, 1, 1, 1, -1, 1, -1, -1], "5j"),
        ([1, 1, -1, 1, 1, 1, -1, -1], "5r"),
        ([1, 1, 1, 1, 1, -1, 1, -1], "6c"),
        ([1, 1, 1, 1, -1, 1, -1, 1], "6e"),
        ([1, 1, 1, 1, -1, 1, 1, -1], "6k"),
        ([1, 1, 1, 1, 1, 1, -1, -1], "6a"),
        ([1, 1, -1, 1, 1, 1, -1, 1], "6i"),
        ([1, 1, 1, -1, 1, 1, 1, -1], "6n"),
        ([1, 1, 1, 1, 1, 1, 1, -1], "7c"),
        ([1, 1, 1, 1, 1, 1, -1, 1], "7e"),
        ([1, 1, 1, 1, 1, 1, 1, 1], "8c"),
    ];
    TABLE
        .iter()
        .find(|(pat, _)| *pat == pattern)
        .map(|(_, name)| *name)
}

/// Index permutations for the 8 D4 rotations/reflections of an
/// 8-neighbourhood, clockwise indexed from the top. Shared by
/// [`sort_neighbours`] (over concrete `±1` states) and
/// [`crate::redundancy`] (over arbitrary literals), since the orbit
/// structure doesn't depend on what's actually stored at each position.
pub(crate) fn neighbour_permutations() -> [[usize; 8]; 8] {
    [
        [0, 1, 2, 3, 4, 5, 6, 7],
        [6, 7, 0, 1, 2, 3, 4, 5],
        [4, 5, 6, 7, 0, 1, 2, 3],
        [2, 3, 4, 5, 6, 7, 0, 1],
        [6, 5, 4, 3, 2, 1, 0, 7],
        [0, 7, 6, 5, 4, 3, 2, 1],
        [2, 1, 0, 7, 6, 5, 4, 3],
        [4, 3, 2, 1, 0, 7, 6, 5],
    ]
}

fn d4_images(n: [i8; 8]) -> [[i8; 8]; 8] {
    neighbour_permutations().map(|perm| perm.map(|i| n[i]))
}

/// Returns the lexicographically maximal D4 image of `neighbours`, the
/// canonical representative used to look transitions up.
pub fn sort_neighbours(neighbours: [i8; 8]) -> [i8; 8] {
    d4_images(neighbours).into_iter().max().unwrap()
}

/// Maps a concrete predecessor-plus-neighbour pattern to its canonical
/// transition name, e.g. `"3c"` for a standard 3-neighbour birth cell.
pub fn transition_from_cells(neighbours: [i8; 8]) -> &'static str {
    transition_lookup(sort_neighbours(neighbours))
        .expect("sort_neighbours always yields a key present in the canonical table")
}

/// Parses a Hensel rulestring (`"B3/S23"`, `"B3/S23-a"`, a partial
/// `"p..."` form, or the bracketed explicit-map form) into a
/// [`RuleTable`], allocating fresh variables for any transition left
/// unspecified by a partial rulestring.
///
/// `next_var` is called to allocate a fresh variable id whenever a
/// partial rulestring leaves a transition undetermined.
pub fn rule_from_rulestring(
    rulestring: &str,
    mut next_var: impl FnMut() -> i64,
) -> Result<RuleTable, RuleError> {
    log::debug!(target: targets::RULE, "Parsing rulestring: {rulestring}");

    let trimmed = rulestring.trim();
    if trimmed.starts_with('{') {
        return parse_explicit_map(trimmed, &mut next_var);
    }

    let mut rule = RuleTable::new();

    let (partial, body) = match rulestring.chars().next() {
        Some('p') | Some('P') => {
            let rest = &rulestring[1..];
            if rest.is_empty() {
                (true, "B012345678/S012345678".to_string())
            } else {
                (true, rest.to_string())
            }
        }
        _ => (false, rulestring.to_string()),
    };

    let body: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let body = body.to_uppercase();

    let parts: Vec<&str> = body.split('/').collect();
    let (birth_string, survival_string) = match parts.as_slice() {
        [single] => {
            if !single.contains('B') && !single.contains('S') {
                return Err(RuleError::Malformed(rulestring.to_string()));
            }
            let b_pos = single.find('B');
            let s_pos = single.find('S');
            let stripped: String = single.chars().filter(|c| *c != 'B' && *c != 'S').collect();
            // Only one of B/S can appear in a single-segment rulestring
            // without a "/", so the stripped remainder belongs to
            // whichever letter is present.
            match (b_pos, s_pos) {
                (Some(_), None) => (stripped, String::new()),
                (None, Some(_)) => (String::new(), stripped),
                _ => return Err(RuleError::Malformed(rulestring.to_string())),
            }
        }
        [first, second] => {
            if first.contains('S') || second.contains('B') {
                (second.to_string(), first.to_string())
            } else {
                (first.to_string(), second.to_string())
            }
        }
        _ => return Err(RuleError::Malformed(rulestring.to_string())),
    };

    if survival_string.contains('B') || birth_string.contains('S') {
        return Err(RuleError::Malformed(rulestring.to_string()));
    }

    let birth_string = birth_string.replace('B', "").to_lowercase();
    let survival_string = survival_string.replace('S', "").to_lowercase();

    for (letter, spec) in [('B', &birth_string), ('S', &survival_string)] {
        let transitions = split_transitions(spec);
        for transition in transitions {
            apply_transition(&mut rule, letter, &transition, partial, &mut next_var)?;
        }
        for count in b'0'..=b'8' {
            let count = count as char;
            let key = format!("{letter}{count}c");
            if !rule.contains_key(&key) {
                for ch in possible_transitions(count.to_digit(10).unwrap() as u8) {
                    rule.insert(format!("{letter}{count}{ch}"), FALSE);
                }
            }
        }
    }

    log::trace!(target: targets::RULE, "Resolved {} transitions", rule.len());
    Ok(rule)
}

/// Splits a birth/survival half of a rulestring (e.g. `"3-ce68a"`) into
/// per-neighbour-count chunks (`"3-ce"`, `"68a"` ... wait, chunked by
/// leading digit: `"3-ce"`, `"6"`, `"8a"`).
fn split_transitions(spec: &str) -> Vec<String> {
    if spec.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = spec.chars().collect();
    let mut boundaries = vec![0];
    for (i, c) in chars.iter().enumerate().skip(1) {
        if c.is_ascii_digit() {
            boundaries.push(i);
        }
    }
    boundaries.push(chars.len());
    boundaries
        .windows(2)
        .map(|w| chars[w[0]..w[1]].iter().collect())
        .collect()
}

fn apply_transition(
    rule: &mut RuleTable,
    letter: char,
    transition: &str,
    partial: bool,
    next_var: &mut impl FnMut() -> i64,
) -> Result<(), RuleError> {
    let mut chars = transition.chars();
    let count_char = chars
        .next()
        .ok_or_else(|| RuleError::Malformed(transition.to_string()))?;
    if !count_char.is_ascii_digit() {
        log::debug!(target: targets::RULE, "Rejecting malformed transition chunk: {transition}");
        return Err(RuleError::Malformed(transition.to_string()));
    }
    let count = count_char.to_digit(10).unwrap() as u8;
    let alphabet = possible_transitions(count);
    let rest: String = chars.collect();

    if !partial {
        if rest.is_empty() {
            for ch in alphabet {
                rule.insert(format!("{letter}{count}{ch}"), TRUE);
            }
        } else if let Some(banned) = rest.strip_prefix('-') {
            check_alphabet(alphabet, banned, transition)?;
            for ch in alphabet {
                let lit = if banned.contains(*ch) { FALSE } else { TRUE };
                rule.insert(format!("{letter}{count}{ch}"), lit);
            }
        } else {
            check_alphabet(alphabet, &rest, transition)?;
            for ch in alphabet {
                let lit = if rest.contains(*ch) { TRUE } else { FALSE };
                rule.insert(format!("{letter}{count}{ch}"), lit);
            }
        }
    } else if rest.is_empty() {
        for ch in alphabet {
            let var = next_var();
            rule.insert(format!("{letter}{count}{ch}"), Lit::new(var, true));
        }
    } else {
        let (allowed, banned) = match rest.split_once('-') {
            Some((a, b)) => (a, b),
            None => (rest.as_str(), ""),
        };
        for ch in alphabet {
            let key = format!("{letter}{count}{ch}");
            if allowed.contains(*ch) {
                rule.insert(key, TRUE);
            } else if banned.contains(*ch) {
                rule.insert(key, FALSE);
            } else {
                let var = next_var();
                rule.insert(key, Lit::new(var, true));
            }
        }
    }
    Ok(())
}

fn check_alphabet(alphabet: &[char], letters: &str, transition: &str) -> Result<(), RuleError> {
    if letters.chars().all(|c| alphabet.contains(&c)) {
        Ok(())
    } else {
        Err(RuleError::UnknownTransition(transition.to_string()))
    }
}

/// Every canonical transition key (`"B0c"`, `"B1c"`, ..., `"S8c"`), in a
/// fixed order shared by every pass that walks the full 102-entry table
/// (explicit-map emission/parsing, partial-rulestring distinctness
/// checks) so their output is deterministic regardless of `RuleTable`'s
/// hashmap iteration order.
fn canonical_keys() -> impl Iterator<Item = String> {
    ['B', 'S'].into_iter().flat_map(|letter| {
        (0u8..=8).flat_map(move |count| {
            possible_transitions(count)
                .iter()
                .map(move |ch| format!("{letter}{count}{ch}"))
        })
    })
}

/// Parses the bracketed explicit transition map form, `{"B3c":"1",
/// "S2c":"0", "B4a":"x", ...}`: a comma-separated list of
/// `"key":"value"` pairs where the value is a literal in the same
/// string form `standard_form_literal` accepts (`"0"`/`"1"` for the
/// constants, a bare name for a shared variable, `"-"`-prefixed for
/// negation). The same name used in two entries resolves to the same
/// variable, which is exactly what this form exists to express and a
/// partial rulestring cannot. Keys this map omits default to the
/// constant false, matching the non-partial rulestring grammar.
fn parse_explicit_map(
    body: &str,
    next_var: &mut impl FnMut() -> i64,
) -> Result<RuleTable, RuleError> {
    let inner = body
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| RuleError::InvalidExplicitMap(body.to_string()))?;

    let mut rule = RuleTable::new();
    let mut names: HashMap<String, i64> = HashMap::new();

    for entry in inner.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let mut halves = entry.splitn(2, ':');
        let key = halves
            .next()
            .ok_or_else(|| RuleError::InvalidExplicitMap(entry.to_string()))?
            .trim()
            .trim_matches('"');
        let value = halves
            .next()
            .ok_or_else(|| RuleError::InvalidExplicitMap(entry.to_string()))?
            .trim()
            .trim_matches('"');

        let parsed = crate::literal::standard_form_literal(value, |name| {
            *names.entry(name.to_string()).or_insert_with(|| next_var())
        })
        .ok_or_else(|| RuleError::InvalidExplicitMap(entry.to_string()))?;
        rule.insert(key.to_string(), parsed.lit);
    }

    for key in canonical_keys() {
        rule.entry(key).or_insert(FALSE);
    }

    Ok(rule)
}

/// Emits the bracketed explicit-map form for a rule table whose
/// non-constant entries share variables across transitions (so a
/// partial rulestring, which can only express one fresh variable per
/// omitted letter, cannot represent it faithfully).
fn explicit_map_from_rule(rule: &RuleTable) -> String {
    let mut names: HashMap<i64, String> = HashMap::new();
    let mut entries = Vec::new();
    for key in canonical_keys() {
        let lit = rule.get(&key).copied().unwrap_or(FALSE);
        let value = if lit == TRUE {
            "1".to_string()
        } else if lit == FALSE {
            "0".to_string()
        } else {
            let count = names.len();
            let name = names
                .entry(lit.variable())
                .or_insert_with(|| format!("v{}", count + 1));
            if lit.polarity() {
                name.clone()
            } else {
                format!("-{name}")
            }
        };
        entries.push(format!("\"{key}\":\"{value}\""));
    }
    format!("{{{}}}", entries.join(","))
}

/// Emits a partial rulestring (`"p..."`) for a rule table whose
/// non-constant entries each reference a distinct variable: every
/// letter left out of a mentioned count's chunk becomes a fresh
/// variable on reparse (see [`apply_transition`]'s partial branch),
/// which is exactly what an unshared variable entry needs.
///
/// A count is omitted entirely when every one of its letters is the
/// constant false (it then falls back to false through the same
/// post-loop fill [`rule_from_rulestring`] applies); a count with no
/// constant letters at all is written as a bare digit, which the
/// partial parser reads as "every letter here is a fresh variable".
fn partial_rulestring_from_rule(rule: &RuleTable) -> String {
    let mut out = String::from("p");
    for letter in ['B', 'S'] {
        out.push(letter);
        for count in 0u8..=8 {
            let alphabet = possible_transitions(count);
            let mut on = String::new();
            let mut off = String::new();
            let mut any_var = false;
            for ch in alphabet {
                let lit = rule
                    .get(&format!("{letter}{count}{ch}"))
                    .copied()
                    .unwrap_or(FALSE);
                if lit == TRUE {
                    on.push(*ch);
                } else if lit == FALSE {
                    off.push(*ch);
                } else {
                    any_var = true;
                }
            }
            if on.is_empty() && off.is_empty() {
                // every letter at this count is a free variable
                out.push_str(&count.to_string());
            } else if on.is_empty() && !any_var {
                // every letter false, no variables: omit, defaults to false
            } else {
                out.push_str(&count.to_string());
                out.push_str(&on);
                if !off.is_empty() {
                    out.push('-');
                    out.push_str(&off);
                }
            }
        }
        if letter == 'B' {
            out.push('/');
        }
    }
    out
}

/// Whether `rule` is exactly the constant, fully-specified Conway Life
/// rule (`B3/S23`) transition for transition: the Taocp and Naive
/// transition schemes are only sound against this one table.
pub fn is_life(rule: &RuleTable) -> bool {
    let life = rule_from_rulestring("B3/S23", || unreachable!("B3/S23 has no free variables"))
        .expect("B3/S23 is a well-formed rulestring");
    canonical_keys().all(|key| rule.get(&key).copied().unwrap_or(FALSE) == life[&key])
}

/// Emits a rulestring from a fully-constant (no free variables) rule
/// table, choosing the shortest of the canonical/letter-list/ban-list
/// forms per neighbour count.
pub fn rulestring_from_rule(rule: &RuleTable) -> String {
    log::trace!(target: targets::RULE, "Emitting rulestring from {} transitions", rule.len());

    let has_variable = rule.values().any(|l| *l != TRUE && *l != FALSE);
    if has_variable {
        let mut seen_variables: Vec<i64> = Vec::new();
        let mut distinct = true;
        for key in canonical_keys() {
            if let Some(lit) = rule.get(&key) {
                if *lit != TRUE && *lit != FALSE {
                    let v = lit.variable();
                    if seen_variables.contains(&v) {
                        distinct = false;
                        break;
                    }
                    seen_variables.push(v);
                }
            }
        }
        return if distinct {
            partial_rulestring_from_rule(rule)
        } else {
            explicit_map_from_rule(rule)
        };
    }

    let mut out = String::new();
    for letter in ['B', 'S'] {
        out.push(letter);
        for count in 0u8..=8 {
            let alphabet = possible_transitions(count);
            if alphabet.is_empty() {
                continue;
            }
            let on: Vec<char> = alphabet
                .iter()
                .copied()
                .filter(|ch| {
                    rule.get(&format!("{letter}{count}{ch}"))
                        .copied()
                        .unwrap_or(FALSE)
                        == TRUE
                })
                .collect();
            if on.len() == alphabet.len() {
                out.push_str(&count.to_string());
            } else if !on.is_empty() && on.len() * 2 <= alphabet.len() {
                out.push_str(&count.to_string());
                out.extend(on);
            } else if !on.is_empty() {
                let off: Vec<char> = alphabet.iter().copied().filter(|c| !on.contains(c)).collect();
                out.push_str(&count.to_string());
                out.push('-');
                out.extend(off);
            }
        }
        if letter == 'B' {
            out.push('/');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conway_life_rulestring() {
        let rule = rule_from_rulestring("B3/S23", || unreachable!()).unwrap();
        assert_eq!(rule.get("B3c"), Some(&TRUE));
        assert_eq!(rule.get("B2c"), Some(&FALSE));
        assert_eq!(rule.get("S2c"), Some(&TRUE));
        assert_eq!(rule.get("S3c"), Some(&TRUE));
        assert_eq!(rule.get("S1e"), Some(&FALSE));
    }

    #[test]
    fn round_trips_through_emission() {
        let rule = rule_from_rulestring("B3/S23", || unreachable!()).unwrap();
        let s = rulestring_from_rule(&rule);
        let reparsed = rule_from_rulestring(&s, || unreachable!()).unwrap();
        assert_eq!(rule, reparsed);
    }

    #[test]
    fn partial_rulestring_allocates_fresh_variables() {
        let mut next = 10;
        let rule = rule_from_rulestring("p", || {
            next += 1;
            next
        })
        .unwrap();
        // every transition should have been assigned a distinct variable
        let mut vars: Vec<i64> = rule.values().map(|l| l.variable()).collect();
        vars.sort_unstable();
        vars.dedup();
        assert_eq!(vars.len(), rule.len());
    }

    #[test]
    fn canonical_table_covers_all_3_neighbour_transitions() {
        assert_eq!(transition_from_cells([-1, 1, -1, 1, -1, 1, -1, -1]), "3c");
    }

    #[test]
    fn is_life_only_accepts_the_constant_life_rule() {
        let life = rule_from_rulestring("B3/S23", || unreachable!()).unwrap();
        assert!(is_life(&life));

        let highlife = rule_from_rulestring("B36/S23", || unreachable!()).unwrap();
        assert!(!is_life(&highlife));

        let mut next = 10;
        let partial = rule_from_rulestring("pB3/S23", || {
            next += 1;
            next
        })
        .unwrap();
        assert!(!is_life(&partial));
    }

    #[test]
    fn parses_bracketed_explicit_map() {
        let rule = rule_from_rulestring(r#"{"B3c":"1","S2c":"0","B4a":"x"}"#, || unreachable!())
            .unwrap();
        assert_eq!(rule.get("B3c"), Some(&TRUE));
        assert_eq!(rule.get("S2c"), Some(&FALSE));
        // unmentioned keys default false
        assert_eq!(rule.get("S3c"), Some(&FALSE));
        assert!(rule.get("B4a").unwrap().variable() > 1);
    }

    #[test]
    fn explicit_map_shares_a_variable_across_two_keys() {
        let rule = rule_from_rulestring(r#"{"B3c":"x","S3c":"x"}"#, || unreachable!()).unwrap();
        assert_eq!(rule.get("B3c"), rule.get("S3c"));
    }

    #[test]
    fn partial_rule_with_distinct_variables_emits_p_form() {
        let mut next = 10;
        let rule = rule_from_rulestring("pB3/S23", || {
            next += 1;
            next
        })
        .unwrap();
        let emitted = rulestring_from_rule(&rule);
        assert!(emitted.starts_with('p'));
        assert!(!emitted.starts_with("p{"));
    }

    #[test]
    fn rule_sharing_a_variable_across_transitions_emits_bracket_form() {
        let rule = rule_from_rulestring(r#"{"B3c":"x","S2c":"x"}"#, || unreachable!()).unwrap();
        let emitted = rulestring_from_rule(&rule);
        assert!(emitted.starts_with('{'));
        let reparsed = rule_from_rulestring(&emitted, || unreachable!()).unwrap();
        assert_eq!(reparsed.get("B3c"), reparsed.get("S2c"));
    }

    #[test]
    fn partial_rulestring_emission_round_trips_stably() {
        let mut next = 0;
        let rule = rule_from_rulestring("p", || {
            next += 1;
            next
        })
        .unwrap();
        let once = rulestring_from_rule(&rule);
        let reparsed = rule_from_rulestring(&once, || {
            next += 1;
            next
        })
        .unwrap();
        let twice = rulestring_from_rule(&reparsed);
        assert_eq!(once, twice);
    }
}
