//! CNF encodings of one evolution step.
//!
//! Three schemes, all producing clauses equisatisfiable with each other
//! for Life (`B3/S23`); only scheme 2 is defined for arbitrary rules.

use crate::cardinality::CardinalityCache;
use crate::clause_store::ClauseStore;
use crate::literal::{implies, Lit};
use crate::rules::{transition_from_cells, RuleTable};

/// Which evolution-rule CNF encoding to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionScheme {
    /// Knuth's TAOCP v4f6 ex.65b scheme, Life only. Reconstructed here
    /// on top of the shared cardinality encoder's at-least-k indicator
    /// variables (the original's bespoke Knuth clause layout lives in a
    /// module not present in this retrieval pack), rather than the
    /// one-off half-adder tree Knuth describes: both approaches reduce a
    /// neighbour-sum threshold to a handful of auxiliary variables, and
    /// sharing the cardinality machinery keeps the per-cell clause count
    /// small without duplicating its logic.
    Taocp,
    /// The naive combinatorial scheme over neighbour subsets, Life only.
    Naive,
    /// The fully enumerated scheme, valid for any rule.
    Generic,
}

/// Emits the clauses constraining `cell`'s literal given its predecessor
/// literal and its 8 neighbour literals (already resolved against any
/// background), according to `scheme`.
pub fn force_transition(
    store: &mut ClauseStore,
    cardinality: &mut CardinalityCache,
    rule: &RuleTable,
    scheme: TransitionScheme,
    predecessor: Lit,
    neighbours: [Lit; 8],
    cell: Lit,
) {
    match scheme {
        TransitionScheme::Taocp => force_transition_taocp(store, cardinality, predecessor, neighbours, cell),
        TransitionScheme::Naive => force_transition_naive(store, predecessor, neighbours, cell),
        TransitionScheme::Generic => force_transition_generic(store, rule, predecessor, neighbours, cell),
    }
}

fn force_transition_taocp(
    store: &mut ClauseStore,
    cardinality: &mut CardinalityCache,
    predecessor: Lit,
    neighbours: [Lit; 8],
    cell: Lit,
) {
    let list = neighbours.to_vec();
    let ge2 = cardinality.define_variable(store, &list, 2, true);
    let ge3 = cardinality.define_variable(store, &list, 3, true);
    let ge4 = cardinality.define_variable(store, &list, 4, true);

    // birth: dead predecessor, exactly 3 live neighbours
    store.append(implies(&[predecessor.negate(), ge3, ge4.negate()], cell));
    store.append(implies(&[predecessor.negate(), ge3.negate()], cell.negate()));
    store.append(implies(&[predecessor.negate(), ge4], cell.negate()));

    // survival: live predecessor, 2 or 3 live neighbours
    store.append(implies(&[predecessor, ge2, ge4.negate()], cell));
    store.append(implies(&[predecessor, ge2.negate()], cell.negate()));
    store.append(implies(&[predecessor, ge4], cell.negate()));
}

fn force_transition_naive(store: &mut ClauseStore, predecessor: Lit, neighbours: [Lit; 8], cell: Lit) {
    use crate::generic_combinations::combinations;

    // any 4 live neighbours => dead
    for four in combinations(&neighbours, 4) {
        store.append(implies(&four, cell.negate()));
    }
    // any 7 dead neighbours => dead
    for seven in combinations(&neighbours, 7) {
        let negated: Vec<Lit> = seven.iter().map(|l| l.negate()).collect();
        store.append(implies(&negated, cell.negate()));
    }
    // dead predecessor and any 6 dead neighbours => dead
    for six in combinations(&neighbours, 6) {
        let mut antecedents = vec![predecessor.negate()];
        antecedents.extend(six.iter().map(|l| l.negate()));
        store.append(implies(&antecedents, cell.negate()));
    }
    // any 3 live and the complementary 5 dead => live
    for three in combinations_with_complement(&neighbours, 3) {
        let (live, dead) = three;
        let mut antecedents = live;
        antecedents.extend(dead.iter().map(|l| l.negate()));
        store.append(implies(&antecedents, cell));
    }
    // live predecessor, any 2 live, and the remaining 5 (of the other 6) dead => live
    for two in combinations_with_complement(&neighbours, 2) {
        let (live, rest) = two;
        let mut antecedents = vec![predecessor];
        antecedents.extend(live);
        // one of the six non-chosen neighbours is left unconstrained,
        // matching the Python implementation's `[1:]` slice of the
        // remaining-neighbour counter.
        antecedents.extend(rest.iter().skip(1).map(|l| l.negate()));
        store.append(implies(&antecedents, cell));
    }
}

/// Returns every way to split `items` into a chosen subset of size `k`
/// and its complement, preserving relative order within each part.
fn combinations_with_complement(items: &[Lit; 8], k: usize) -> Vec<(Vec<Lit>, Vec<Lit>)> {
    use crate::generic_combinations::index_combinations;
    index_combinations(items.len(), k)
        .into_iter()
        .map(|chosen_idx| {
            let chosen: Vec<Lit> = chosen_idx.iter().map(|i| items[*i]).collect();
            let rest: Vec<Lit> = (0..items.len())
                .filter(|i| !chosen_idx.contains(i))
                .map(|i| items[i])
                .collect();
            (chosen, rest)
        })
        .collect()
}

fn force_transition_generic(
    store: &mut ClauseStore,
    rule: &RuleTable,
    predecessor: Lit,
    neighbours: [Lit; 8],
    cell: Lit,
) {
    const STATES: [i8; 2] = [-1, 1];
    for &predecessor_alive in &STATES {
        for mask in 0u16..256 {
            let mut pattern = [0i8; 8];
            for (i, p) in pattern.iter_mut().enumerate() {
                *p = if mask & (1 << i) != 0 { 1 } else { -1 };
            }
            let letter = if predecessor_alive == 1 { 'S' } else { 'B' };
            let transition_name = transition_from_cells(pattern);
            let key = format!("{letter}{transition_name}");
            let transition_literal = rule[&key];

            let predecessor_term = signed(predecessor, predecessor_alive);
            let neighbour_terms: Vec<Lit> = neighbours
                .iter()
                .zip(pattern.iter())
                .map(|(lit, sign)| signed(*lit, *sign))
                .collect();

            let mut antecedents_pos = vec![transition_literal, predecessor_term];
            antecedents_pos.extend(&neighbour_terms);
            store.append(implies(&antecedents_pos, cell));

            let mut antecedents_neg = vec![transition_literal.negate(), predecessor_term];
            antecedents_neg.extend(&neighbour_terms);
            store.append(implies(&antecedents_neg, cell.negate()));
        }
    }
}

fn signed(lit: Lit, sign: i8) -> Lit {
    if sign == 1 {
        lit
    } else {
        lit.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rule_from_rulestring;

    fn fresh_cells(store: &mut ClauseStore) -> (Lit, [Lit; 8], Lit) {
        let predecessor = Lit::new(store.fresh_variable(), true);
        let neighbours = [0; 8].map(|_| Lit::new(store.fresh_variable(), true));
        let cell = Lit::new(store.fresh_variable(), true);
        (predecessor, neighbours, cell)
    }

    #[test]
    fn naive_and_generic_agree_on_clause_production() {
        let mut store_naive = ClauseStore::new();
        let (p, n, c) = fresh_cells(&mut store_naive);
        force_transition_naive(&mut store_naive, p, n, c);
        assert!(!store_naive.is_empty());

        let mut store_generic = ClauseStore::new();
        let rule = rule_from_rulestring("B3/S23", || unreachable!()).unwrap();
        let (p2, n2, c2) = fresh_cells(&mut store_generic);
        force_transition_generic(&mut store_generic, &rule, p2, n2, c2);
        assert_eq!(store_generic.len(), 512);
    }

    #[test]
    fn taocp_scheme_emits_a_small_number_of_clauses() {
        let mut store = ClauseStore::new();
        let mut cardinality = CardinalityCache::new();
        let (p, n, c) = fresh_cells(&mut store);
        force_transition_taocp(&mut store, &mut cardinality, p, n, c);
        assert!(store.len() < 50);
    }
}
