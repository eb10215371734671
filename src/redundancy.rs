//! Parent-signature memoization: cells whose predecessor and (D4-sorted)
//! neighbourhood exactly match an earlier cell's are folded onto that
//! earlier cell instead of being constrained independently, and cells
//! whose parents are all constant are resolved directly against the
//! rule table. Run as two sweeps, background then foreground, each
//! followed by a single batch of [`crate::symmetry::EqualityForest::force_equal`].

use std::collections::HashMap;

use crate::literal::{Lit, FALSE, TRUE};
use crate::misc::log::targets;
use crate::rules;
use crate::search_pattern::{neighbours_from_background, neighbours_from_coordinates, SearchPattern};
use crate::types::err::SearchError;

/// Runs both sweeps against `pattern`, folding redundant transitions and
/// marking folded cells as ignoring their own transition clause (the
/// equality already pins them to their representative).
pub fn remove_redundancies(pattern: &mut SearchPattern) -> Result<(), SearchError> {
    log::info!(target: targets::REDUNDANCY, "Removing redundant transitions");
    sweep_background(pattern)?;
    sweep_foreground(pattern)?;
    Ok(())
}

fn canonical_neighbours(neighbours: [Lit; 8]) -> [Lit; 8] {
    rules::neighbour_permutations()
        .into_iter()
        .map(|perm| perm.map(|i| neighbours[i]))
        .max()
        .unwrap()
}

fn all_constant(predecessor: Lit, neighbours: [Lit; 8]) -> bool {
    let is_const = |l: Lit| l == TRUE || l == FALSE;
    is_const(predecessor) && neighbours.iter().all(|l| is_const(*l))
}

fn constant_state(l: Lit) -> i8 {
    if l == TRUE {
        1
    } else {
        -1
    }
}

fn sweep_background(pattern: &mut SearchPattern) -> Result<(), SearchError> {
    let mut parents: HashMap<(Lit, [Lit; 8]), Lit> = HashMap::new();
    let mut to_force_equal: Vec<(Lit, Lit)> = Vec::new();

    let duration = pattern.background.grid.duration;
    let height = pattern.background.grid.height;
    let width = pattern.background.grid.width;

    for t in 0..duration {
        for y in 0..height {
            for x in 0..width {
                if *pattern.background.ignore_transition.get(t, y, x) {
                    continue;
                }
                let predecessor = pattern.background.resolve(t as i64 - 1, y as i64, x as i64);
                let neighbours = neighbours_from_background(&pattern.background, x, y, t, -1);
                let cell = *pattern.background.grid.get(t, y, x);
                let key = (predecessor, canonical_neighbours(neighbours));

                if let Some(&representative) = parents.get(&key) {
                    log::trace!(target: targets::REDUNDANCY, "Background cell ({x},{y},{t}) folds onto an earlier representative");
                    to_force_equal.push((representative, cell));
                    pattern.background.grid.set(t, y, x, representative);
                    pattern.background.ignore_transition.set(t, y, x, true);
                } else if all_constant(predecessor, neighbours) {
                    let bs = if predecessor == FALSE { 'B' } else { 'S' };
                    let pattern_states = neighbours.map(constant_state);
                    let name = rules::transition_from_cells(pattern_states);
                    let child = pattern.rule[&format!("{bs}{name}")];
                    to_force_equal.push((cell, child));
                    pattern.background.grid.set(t, y, x, child);
                    pattern.background.ignore_transition.set(t, y, x, true);
                    parents.insert(key, child);
                } else {
                    parents.insert(key, cell);
                }
            }
        }
    }

    pattern.equalities.force_equal(&to_force_equal)?;
    pattern.rewrite_through_equalities();
    Ok(())
}

fn sweep_foreground(pattern: &mut SearchPattern) -> Result<(), SearchError> {
    let mut parents: HashMap<(Lit, [Lit; 8]), Lit> = HashMap::new();
    let mut to_force_equal: Vec<(Lit, Lit)> = Vec::new();

    let duration = pattern.grid.duration;
    let height = pattern.grid.height;
    let width = pattern.grid.width;

    for t in 1..duration {
        for y in 0..height {
            for x in 0..width {
                if *pattern.ignore_transition.get(t, y, x) {
                    continue;
                }
                let predecessor = *pattern.grid.get(t - 1, y, x);
                let neighbours = neighbours_from_coordinates(&pattern.grid, &pattern.background, x, y, t, -1);
                let cell = *pattern.grid.get(t, y, x);
                let key = (predecessor, canonical_neighbours(neighbours));

                if let Some(&representative) = parents.get(&key) {
                    log::trace!(target: targets::REDUNDANCY, "Foreground cell ({x},{y},{t}) folds onto an earlier representative");
                    to_force_equal.push((representative, cell));
                    pattern.grid.set(t, y, x, representative);
                    pattern.ignore_transition.set(t, y, x, true);
                } else if all_constant(predecessor, neighbours) {
                    let bs = if predecessor == FALSE { 'B' } else { 'S' };
                    let pattern_states = neighbours.map(constant_state);
                    let name = rules::transition_from_cells(pattern_states);
                    let child = pattern.rule[&format!("{bs}{name}")];
                    to_force_equal.push((cell, child));
                    pattern.grid.set(t, y, x, child);
                    pattern.ignore_transition.set(t, y, x, true);
                    parents.insert(key, child);
                } else {
                    parents.insert(key, cell);
                }
            }
        }
    }

    pattern.equalities.force_equal(&to_force_equal)?;
    pattern.rewrite_through_equalities();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause_store::ClauseStore;
    use crate::search_pattern::{BackgroundGrid, Grid3};
    use crate::transition::TransitionScheme;

    #[test]
    fn two_cells_with_identical_dead_parents_fold_together() {
        let store = ClauseStore::new();
        let grid = Grid3::filled(2, 1, 2, FALSE);
        let ignore = Grid3::filled(2, 1, 2, false);
        let background = BackgroundGrid {
            grid: Grid3::filled(1, 1, 1, FALSE),
            ignore_transition: Grid3::filled(1, 1, 1, true),
        };
        let mut pattern = SearchPattern::new(
            grid,
            ignore,
            background,
            store,
            "B3/S23",
            TransitionScheme::Generic,
        )
        .unwrap();

        pattern.remove_redundancies().unwrap();

        // an all-dead neighbourhood never births a cell under Life
        assert_eq!(*pattern.grid.get(1, 0, 0), FALSE);
        assert_eq!(*pattern.grid.get(1, 0, 1), FALSE);
    }

    #[test]
    fn background_sweep_is_a_no_op_on_an_already_constant_background() {
        let store = ClauseStore::new();
        let grid = Grid3::filled(1, 1, 1, TRUE);
        let ignore = Grid3::filled(1, 1, 1, true);
        let background = BackgroundGrid {
            grid: Grid3::filled(3, 1, 1, FALSE),
            ignore_transition: Grid3::filled(3, 1, 1, false),
        };
        let mut pattern = SearchPattern::new(
            grid,
            ignore,
            background,
            store,
            "B3/S23",
            TransitionScheme::Generic,
        )
        .unwrap();
        pattern.remove_redundancies().unwrap();
        assert_eq!(*pattern.background.grid.get(2, 0, 0), FALSE);
    }
}
