//! Memoized recursive "at-least-k" cardinality encoder.
//!
//! Encodes "at least `k` of these literals are true" by recursively
//! splitting the literal list in half and defining an indicator variable
//! per `(sorted literal subset, k)` pair, shared across every caller via
//! a cache so the same bound over the same literals is only defined
//! once.

use std::collections::HashSet;

use crate::clause_store::ClauseStore;
use crate::literal::{implies, Lit, TRUE};
use crate::misc::log::targets;

/// Cache of cardinality indicator variables, keyed by the (sorted,
/// deduplicated) literal list and the requested lower bound.
#[derive(Debug, Default)]
pub struct CardinalityCache {
    variables: std::collections::HashMap<(Vec<Lit>, i64), Lit>,
    defined: HashSet<(Vec<Lit>, i64)>,
}

impl CardinalityCache {
    pub fn new() -> Self {
        CardinalityCache::default()
    }

    /// Returns the indicator variable for `(literals, at_least)`,
    /// allocating one if this is the first time the pair is seen.
    pub fn get_variable(
        &mut self,
        store: &mut ClauseStore,
        literals: &[Lit],
        at_least: i64,
    ) -> Lit {
        let key = (literals.to_vec(), at_least);
        if let Some(lit) = self.variables.get(&key) {
            return *lit;
        }
        let var = Lit::new(store.fresh_variable(), true);
        self.variables.insert(key, var);
        var
    }

    /// Emits the clauses defining the cardinality variable for
    /// `(literals, at_least)`, recursively defining whatever child
    /// variables the binary split needs.
    ///
    /// On first call for a given `(literals, at_least)` pair, `1`
    /// literals are subtracted out of the count (a constantly-true
    /// literal always counts towards the bound) and `-1`/`1` constants
    /// are dropped from the literal list; recursive calls already work
    /// over a reduced, sorted set and skip that step.
    pub fn define_variable(
        &mut self,
        store: &mut ClauseStore,
        literals: &[Lit],
        at_least: i64,
        preprocess: bool,
    ) -> Lit {
        let (literals, at_least): (Vec<Lit>, i64) = if preprocess {
            let true_count = literals.iter().filter(|l| **l == TRUE).count() as i64;
            let mut reduced: Vec<Lit> = literals
                .iter()
                .copied()
                .filter(|l| l.variable() != 1)
                .collect();
            reduced.sort_unstable();
            (reduced, at_least - true_count)
        } else {
            (literals.to_vec(), at_least)
        };

        let name = self.get_variable(store, &literals, at_least);
        let key = (literals.clone(), at_least);
        if self.defined.contains(&key) {
            log::trace!(target: targets::CARDINALITY, "Cache hit for (|L|={}, k={at_least})", literals.len());
            return name;
        }
        self.defined.insert(key);
        log::debug!(target: targets::CARDINALITY, "Defining indicator for (|L|={}, k={at_least})", literals.len());

        let max_literals = literals.len();
        let split_1 = max_literals / 2;
        let (literals_1, literals_2) = literals.split_at(split_1);
        let max_literals_1 = literals_1.len() as i64;
        let max_literals_2 = literals_2.len() as i64;

        let mut to_define_1: Vec<i64> = Vec::new();
        let mut to_define_2: Vec<i64> = Vec::new();

        if at_least <= 0 {
            store.append(vec![name]);
        } else if at_least > max_literals as i64 {
            store.append(vec![name.negate()]);
        } else if max_literals == 1 {
            let lit = literals[0];
            store.append(vec![name.negate(), lit]);
            store.append(vec![name, lit.negate()]);
        } else {
            if at_least <= max_literals_1 {
                let var = self.get_variable(store, literals_1, at_least);
                store.append(implies(&[var], name));
                to_define_1.push(at_least);
            }
            for j in 1..=max_literals_2 {
                for i in 1..=max_literals_1 {
                    if i + j == at_least {
                        let v1 = self.get_variable(store, literals_1, i);
                        let v2 = self.get_variable(store, literals_2, j);
                        store.append(implies(&[v1, v2], name));
                        to_define_1.push(i);
                        to_define_2.push(j);
                    }
                }
            }
            if at_least <= max_literals_2 {
                let var = self.get_variable(store, literals_2, at_least);
                store.append(implies(&[var], name));
                to_define_2.push(at_least);
            }
            if at_least > max_literals_2 {
                let i = at_least - max_literals_2;
                let var = self.get_variable(store, literals_1, i);
                store.append(implies(&[var.negate()], name.negate()));
                to_define_1.push(i);
            }
            for j in 1..=max_literals_2 {
                for i in 1..=max_literals_1 {
                    if i + j == at_least + 1 {
                        let v1 = self.get_variable(store, literals_1, i);
                        let v2 = self.get_variable(store, literals_2, j);
                        store.append(implies(&[v1.negate(), v2.negate()], name.negate()));
                        to_define_1.push(i);
                        to_define_2.push(j);
                    }
                }
            }
            if at_least > max_literals_1 {
                let j = at_least - max_literals_1;
                let var = self.get_variable(store, literals_2, j);
                store.append(implies(&[var.negate()], name.negate()));
                to_define_2.push(j);
            }
        }

        to_define_1.sort_unstable();
        to_define_1.dedup();
        to_define_2.sort_unstable();
        to_define_2.dedup();
        for a in to_define_1 {
            self.define_variable(store, literals_1, a, false);
        }
        for a in to_define_2 {
            self.define_variable(store, literals_2, a, false);
        }

        name
    }

    /// Adds clauses forcing at least `amount` of `literals` to be true.
    pub fn force_at_least(&mut self, store: &mut ClauseStore, literals: &[Lit], amount: i64) {
        let name = self.define_variable(store, literals, amount, true);
        store.append(vec![name]);
    }

    /// Adds clauses forcing at most `amount` of `literals` to be true.
    pub fn force_at_most(&mut self, store: &mut ClauseStore, literals: &[Lit], amount: i64) {
        let negated: Vec<Lit> = literals.iter().map(|l| l.negate()).collect();
        self.force_at_least(store, &negated, literals.len() as i64 - amount);
    }

    /// Adds clauses forcing exactly `amount` of `literals` to be true.
    pub fn force_exactly(&mut self, store: &mut ClauseStore, literals: &[Lit], amount: i64) {
        self.force_at_least(store, literals, amount);
        self.force_at_most(store, literals, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(store: &mut ClauseStore, n: usize) -> Vec<Lit> {
        (0..n)
            .map(|_| Lit::new(store.fresh_variable(), true))
            .collect()
    }

    #[test]
    fn at_least_one_of_two_is_a_disjunction() {
        let mut store = ClauseStore::new();
        let mut cache = CardinalityCache::new();
        let literals = lits(&mut store, 2);
        cache.force_at_least(&mut store, &literals, 1);

        let mut buf = Vec::new();
        store.write_dimacs(&mut buf).unwrap();
        // satisfiable only when at least one of the two is true
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("p cnf"));
    }

    #[test]
    fn at_least_zero_is_trivially_satisfied() {
        let mut store = ClauseStore::new();
        let mut cache = CardinalityCache::new();
        let literals = lits(&mut store, 3);
        let name = cache.define_variable(&mut store, &literals, 0, true);
        assert_ne!(name, literals[0]);
    }

    #[test]
    fn repeated_bound_over_same_literals_reuses_the_cache() {
        let mut store = ClauseStore::new();
        let mut cache = CardinalityCache::new();
        let literals = lits(&mut store, 4);
        let a = cache.define_variable(&mut store, &literals, 2, true);
        let clauses_after_first = store.len();
        let b = cache.define_variable(&mut store, &literals, 2, true);
        assert_eq!(a, b);
        assert_eq!(store.len(), clauses_after_first);
    }
}
