//! The eight D4 grid transformations, and the equality/inequality
//! substitution engine used to enforce them (and arbitrary other
//! "these two cells are equal/unequal" constraints).

use std::collections::HashMap;

use crate::clause_store::ClauseStore;
use crate::literal::{Lit, FALSE, TRUE};
use crate::misc::log::targets;
use crate::types::err::SearchError;

/// One of the 8 elements of the dihedral group D4: 4 rotations and 4
/// reflections, named the way the pattern-grid symmetry declarations do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Ro0,
    Ro1,
    Ro2,
    Ro3,
    ReDash,
    ReBackslash,
    RePipe,
    ReSlash,
}

impl Transform {
    /// Forward coordinate map, parameterized by grid `width`/`height`
    /// and a translation `(dx, dy)`.
    pub fn forward(self, width: i64, height: i64, dx: i64, dy: i64, x: i64, y: i64) -> (i64, i64) {
        match self {
            Transform::Ro0 => (x + dx, y + dy),
            Transform::Ro1 => ((height - 1) - y + dx, x + dy),
            Transform::Ro2 => ((width - 1) - x + dx, (height - 1) - y + dy),
            Transform::Ro3 => (y + dx, (height - 1) - x + dy),
            Transform::ReDash => (x + dx, (height - 1) - y + dy),
            Transform::ReBackslash => (y + dx, x + dy),
            Transform::RePipe => ((width - 1) - x + dx, y + dy),
            Transform::ReSlash => ((height - 1) - y + dx, (height - 1) - x + dy),
        }
    }

    /// Inverse of [`Transform::forward`] for the same parameters.
    pub fn inverse(self, width: i64, height: i64, dx: i64, dy: i64, x: i64, y: i64) -> (i64, i64) {
        match self {
            Transform::Ro0 => (x - dx, y - dy),
            Transform::Ro1 => (y - dy, (height - 1) - (x - dx)),
            Transform::Ro2 => ((width - 1) - (x - dx), (height - 1) - (y - dy)),
            Transform::Ro3 => ((height - 1) - (y - dy), x - dx),
            Transform::ReDash => (x - dx, (height - 1) - (y - dy)),
            Transform::ReBackslash => (y - dy, x - dx),
            Transform::RePipe => ((width - 1) - (x - dx), y - dy),
            Transform::ReSlash => ((height - 1) - (y - dy), (height - 1) - (x - dx)),
        }
    }
}

/// The substitution graph maintained by [`EqualityForest::force_equal`]:
/// `replacement[v]` is the literal variable `v` has been folded into;
/// `replaces[v]` lists every variable currently aliased (directly) to
/// `v`, so that when `v` itself gets folded into something else every
/// alias can be rerouted in one pass instead of walking the whole map.
#[derive(Debug, Default)]
pub struct EqualityForest {
    replacement: HashMap<i64, Lit>,
    replaces: HashMap<i64, Vec<i64>>,
}

fn mul(lit: Lit, sign: i64) -> Lit {
    Lit(lit.as_int() * sign)
}

impl EqualityForest {
    pub fn new() -> Self {
        EqualityForest::default()
    }

    /// Walks `lit` through the current substitution map until it
    /// reaches a fixed point or a constant.
    fn walk(&self, mut lit: Lit) -> Lit {
        while !lit.is_true() && !lit.is_false() {
            let variable = lit.variable();
            let sign = if lit.polarity() { 1 } else { -1 };
            match self.replacement.get(&variable) {
                Some(target) => lit = mul(*target, sign),
                None => break,
            }
        }
        lit
    }

    /// Asserts every pair in `pairs` is equal, folding one side of each
    /// pair into the other (preferring to eliminate the larger variable
    /// id) and rerouting any existing aliases transitively.
    pub fn force_equal(&mut self, pairs: &[(Lit, Lit)]) -> Result<(), SearchError> {
        for &(a, b) in pairs {
            let var_a = a.variable();
            let var_b = b.variable();
            let sign_a = if a.polarity() { 1 } else { -1 };
            let sign_b = if b.polarity() { 1 } else { -1 };

            let bigger = var_a.max(var_b);
            let smaller = var_a.min(var_b);
            let mut cell_0 = Lit(bigger);
            let mut cell_1 = Lit(smaller * sign_a * sign_b);

            cell_0 = self.walk(cell_0);
            cell_1 = self.walk(cell_1);

            if cell_0 == cell_1 {
                continue;
            }
            if cell_0 == cell_1.negate() {
                log::debug!(target: targets::SYMMETRY, "force_equal({a}, {b}) contradicts an earlier substitution");
                return Err(SearchError::UnsatInPreprocessing);
            }

            let (mut cell_0, mut cell_1) = (cell_0, cell_1);
            if cell_0.is_true() || cell_0.is_false() {
                std::mem::swap(&mut cell_0, &mut cell_1);
            }

            let variable_0 = cell_0.variable();
            let sign_0 = if cell_0.polarity() { 1 } else { -1 };
            cell_1 = mul(cell_1, sign_0);

            if !cell_1.is_true() && !cell_1.is_false() {
                self.replaces.entry(cell_1.variable()).or_default();
            }

            if let Some(aliases) = self.replaces.remove(&variable_0) {
                for var in aliases {
                    let current = self.replacement[&var];
                    let replacement_sign = if current.polarity() { 1 } else { -1 };
                    let new_target = mul(cell_1, replacement_sign);
                    self.replacement.insert(var, new_target);
                    if !cell_1.is_true() && !cell_1.is_false() {
                        self.replaces.get_mut(&cell_1.variable()).unwrap().push(var);
                    }
                }
            }

            self.replacement.insert(variable_0, cell_1);
            if !cell_1.is_true() && !cell_1.is_false() {
                self.replaces
                    .get_mut(&cell_1.variable())
                    .unwrap()
                    .push(variable_0);
            }
        }
        Ok(())
    }

    /// Rewrites a single literal through the current substitution map.
    /// Unlike [`EqualityForest::walk`] (used internally while absorbing
    /// new pairs), this is the one-step lookup used once pairs have
    /// been absorbed: `replacement` entries always point directly at
    /// their final target, by construction.
    pub fn rewrite(&self, lit: Lit) -> Lit {
        if lit.is_true() || lit.is_false() {
            return lit;
        }
        let variable = lit.variable();
        let sign = if lit.polarity() { 1 } else { -1 };
        match self.replacement.get(&variable) {
            Some(target) if *target != Lit(variable) => mul(*target, sign),
            _ => lit,
        }
    }

    /// Asserts that not every pair in `pairs` is equal: introduces one
    /// fresh equality indicator per pair and a clause forbidding all of
    /// them from holding simultaneously.
    pub fn force_unequal(&mut self, store: &mut ClauseStore, pairs: &[(Lit, Lit)]) {
        log::debug!(target: targets::SYMMETRY, "force_unequal over {} pairs", pairs.len());
        let mut blocking = Vec::with_capacity(pairs.len());
        for &(a, b) in pairs {
            let indicator = Lit::new(store.fresh_variable(), true);
            store.append(vec![a.negate(), b.negate(), indicator]);
            store.append(vec![a, b, indicator]);
            blocking.push(indicator.negate());
        }
        store.append(blocking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_pair_folds_the_larger_variable() {
        let mut forest = EqualityForest::new();
        let a = Lit::new(5, true);
        let b = Lit::new(3, true);
        forest.force_equal(&[(a, b)]).unwrap();
        assert_eq!(forest.rewrite(a), b);
    }

    #[test]
    fn conflicting_equalities_are_unsat() {
        let mut forest = EqualityForest::new();
        let a = Lit::new(2, true);
        forest.force_equal(&[(a, TRUE)]).unwrap();
        let err = forest.force_equal(&[(a, FALSE)]).unwrap_err();
        assert_eq!(err, SearchError::UnsatInPreprocessing);
    }

    #[test]
    fn alias_chains_reroute_through_intermediate_folds() {
        let mut forest = EqualityForest::new();
        let a = Lit::new(10, true);
        let b = Lit::new(5, true);
        let c = Lit::new(3, true);
        forest.force_equal(&[(a, b)]).unwrap();
        forest.force_equal(&[(b, c)]).unwrap();
        assert_eq!(forest.rewrite(a), c);
        assert_eq!(forest.rewrite(b), c);
    }

    #[test]
    fn ro0_is_a_pure_translation() {
        assert_eq!(Transform::Ro0.forward(10, 10, 1, 2, 3, 4), (4, 6));
        assert_eq!(Transform::Ro0.inverse(10, 10, 1, 2, 4, 6), (3, 4));
    }
}
