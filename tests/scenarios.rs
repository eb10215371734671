//! End-to-end scenarios over the public API, checked with an in-process
//! brute-force model counter rather than a real SAT solver binary: every
//! scenario here stays small enough (at most a couple dozen variables)
//! that exhaustive enumeration is a faithful, dependency-free stand-in
//! for "ask a solver".

use lls::cardinality::CardinalityCache;
use lls::clause_store::ClauseStore;
use lls::literal::Lit;
use lls::search_pattern::{blank_search_pattern, BackgroundGrid, Grid3, SearchPattern};
use lls::transition::TransitionScheme;
use lls::types::err::SearchError;

/// Exhaustively tries every assignment to variables `2..=store.variable_count()`
/// (variable 1 is always the constant true) and returns the first one
/// that satisfies every clause, or `None` if the instance is unsatisfiable.
fn brute_force_sat(store: &ClauseStore) -> Option<Vec<i64>> {
    let n = store.variable_count();
    assert!(n <= 24, "brute force is only viable for small instances");
    let free = (n - 1) as u32;

    for assignment in 0..(1u32 << free) {
        let mut values = vec![true; (n + 1) as usize];
        for v in 2..=n {
            values[v as usize] = (assignment >> (v - 2)) & 1 == 1;
        }

        let satisfied = store.clauses().iter().all(|clause| {
            clause.iter().any(|lit| values[lit.variable() as usize] == lit.polarity())
        });

        if satisfied {
            let model: Vec<i64> = (1..=n)
                .map(|v| if values[v as usize] { v } else { -v })
                .collect();
            return Some(model);
        }
    }
    None
}

/// As [`brute_force_sat`], but collects every satisfying assignment
/// instead of stopping at the first.
fn all_sat_models(store: &ClauseStore) -> Vec<Vec<i64>> {
    let n = store.variable_count();
    assert!(n <= 24, "brute force is only viable for small instances");
    let free = (n - 1) as u32;

    let mut models = Vec::new();
    for assignment in 0..(1u32 << free) {
        let mut values = vec![true; (n + 1) as usize];
        for v in 2..=n {
            values[v as usize] = (assignment >> (v - 2)) & 1 == 1;
        }

        let satisfied = store.clauses().iter().all(|clause| {
            clause.iter().any(|lit| values[lit.variable() as usize] == lit.polarity())
        });

        if satisfied {
            models.push(
                (1..=n)
                    .map(|v| if values[v as usize] { v } else { -v })
                    .collect(),
            );
        }
    }
    models
}

fn flat_background() -> BackgroundGrid {
    BackgroundGrid {
        grid: Grid3::filled(1, 1, 1, lls::literal::FALSE),
        ignore_transition: Grid3::filled(1, 1, 1, true),
    }
}

#[test]
fn conway_still_life_in_a_3x3_block_is_satisfiable() {
    let background = flat_background();
    let mut pattern = blank_search_pattern(3, 3, 2, background, "B3/S23", TransitionScheme::Naive).unwrap();

    pattern.force_period(1, 0, 0).unwrap();
    pattern.force_evolution();
    pattern.remove_redundancies().unwrap();

    let model = brute_force_sat(&pattern.store);
    assert!(model.is_some(), "a 3x3 still-life search should be satisfiable under B3/S23");
}

#[test]
fn p3_oscillator_in_a_one_wide_strip_is_unsatisfiable() {
    let background = flat_background();
    let mut pattern = blank_search_pattern(1, 5, 3, background, "B3/S23", TransitionScheme::Generic).unwrap();

    pattern.force_period(3, 0, 0).unwrap();
    pattern.force_change(0, 1);
    pattern.force_evolution();

    match pattern.remove_redundancies() {
        Err(SearchError::UnsatInPreprocessing) => {}
        Err(other) => panic!("expected UnsatInPreprocessing, got {other}"),
        Ok(()) => {
            let model = brute_force_sat(&pattern.store);
            assert!(
                model.is_none(),
                "a one-wide strip has no room for a cell to differ from itself while staying periodic"
            );
        }
    }
}

#[test]
fn partial_rulestring_introduces_free_transition_variables() {
    let background = flat_background();
    let pattern = blank_search_pattern(1, 1, 1, background, "pB3/S23", TransitionScheme::Generic).unwrap();

    // every B-transition is free, every S-transition fixed: parsing a
    // partial rulestring should allocate at least one fresh rule variable
    // beyond the two grid cells and the constant-true variable.
    assert!(pattern.store.variable_count() > 3);
}

#[test]
fn cardinality_force_exactly_matches_every_enumerated_model() {
    // Kept at |L| = 6 so every auxiliary variable the recursive splitter
    // allocates still fits comfortably under the brute-force cap; spec.md
    // §8 names exhaustive enumeration as the verification method for
    // cardinality indicators up to this size.
    let mut store = ClauseStore::new();
    let mut cardinality = CardinalityCache::new();
    let literals: Vec<Lit> = (0..6).map(|_| Lit::new(store.fresh_variable(), true)).collect();

    cardinality.force_exactly(&mut store, &literals, 2);

    let models = all_sat_models(&store);
    assert!(!models.is_empty(), "exactly-2-of-6 is satisfiable");
    for model in &models {
        let population = model
            .iter()
            .filter(|l| **l > 0 && literals.iter().any(|lit| lit.variable() == l.abs()))
            .count();
        assert_eq!(population, 2, "every model of force_exactly(2) must have population 2");
    }
}

#[test]
fn force_distinct_blocks_a_found_solution_until_none_remain() {
    // A 2x2 still life under B3/S23 has exactly one solution up to the
    // trivial all-dead grid: the empty board and the full 2x2 block both
    // reproduce themselves. force_distinct should rule out whichever
    // model is found first, the second call should find the other, and
    // a third call should exhaust the instance.
    let background = flat_background();
    let mut pattern = blank_search_pattern(2, 2, 2, background, "B3/S23", TransitionScheme::Naive).unwrap();
    pattern.force_period(1, 0, 0).unwrap();
    pattern.force_evolution();
    pattern.remove_redundancies().unwrap();

    let determined = pattern.deterministic();
    let first = brute_force_sat(&pattern.store).expect("a 2x2 still-life search is satisfiable");

    pattern.force_distinct(&first, determined);
    let second = brute_force_sat(&pattern.store);
    if let Some(second) = &second {
        assert_ne!(first, *second, "force_distinct must rule out the exact previous model");

        pattern.force_distinct(second, determined);
        let third = brute_force_sat(&pattern.store);
        assert!(third.is_none(), "a 2x2 still-life search has only two solutions up to the fixed background");
    }
}

#[test]
fn background_cells_with_identical_free_parent_signatures_coalesce() {
    // A 2-wide, 1-tall, 2-generation background where both background
    // cells at t=1 share the same (free) predecessor and an identical
    // (wrapped) neighbourhood, so the redundancy sweep should fold one
    // onto the other rather than emitting two independent transitions.
    let mut store = ClauseStore::new();
    let a = Lit::new(store.fresh_variable(), true);
    let mut background_grid = Grid3::filled(2, 1, 2, a);
    background_grid.set(1, 0, 0, Lit::new(store.fresh_variable(), true));
    background_grid.set(1, 0, 1, Lit::new(store.fresh_variable(), true));
    let background = BackgroundGrid {
        grid: background_grid,
        ignore_transition: Grid3::filled(2, 1, 2, false),
    };

    let grid = Grid3::filled(1, 1, 1, lls::literal::TRUE);
    let ignore = Grid3::filled(1, 1, 1, true);
    let mut pattern = SearchPattern::new(grid, ignore, background, store, "B3/S23", TransitionScheme::Generic).unwrap();

    pattern.remove_redundancies().unwrap();

    let left = pattern.equalities.rewrite(*pattern.background.grid.get(1, 0, 0));
    let right = pattern.equalities.rewrite(*pattern.background.grid.get(1, 0, 1));
    assert_eq!(left, right, "identical parent signatures should coalesce to one representative");
}
