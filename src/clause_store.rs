//! Append-only clause list and DIMACS emission.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::literal::{Lit, FALSE, TRUE};
use crate::misc::log::targets;

/// An append-only CNF clause list with fresh-variable allocation.
///
/// Clauses are kept exactly as appended; all simplification (dropping
/// satisfied/tautological clauses, dense renumbering, dedup) happens in
/// one pass at [`ClauseStore::write_dimacs`] time, not on every append.
#[derive(Debug, Default, Clone)]
pub struct ClauseStore {
    clauses: Vec<Vec<Lit>>,
    next_var: i64,
}

impl ClauseStore {
    /// Builds an empty store with variable `1` already reserved and
    /// wired to the constant `true` (see [`crate::literal::TRUE`]): the
    /// unit clause `[1]` is appended up front, so any caller allocating
    /// variables from this store before building its own grid/rule gets
    /// variable ids consistent with the rest of the crate.
    pub fn new() -> Self {
        let mut store = ClauseStore {
            clauses: Vec::new(),
            next_var: 0,
        };
        let true_var = store.fresh_variable();
        store.append(vec![Lit(true_var)]);
        store
    }

    /// Allocates and returns a fresh variable id.
    pub fn fresh_variable(&mut self) -> i64 {
        self.next_var += 1;
        self.next_var
    }

    /// The highest variable id allocated so far.
    pub fn variable_count(&self) -> i64 {
        self.next_var
    }

    /// Appends a clause verbatim.
    pub fn append(&mut self, clause: Vec<Lit>) {
        self.clauses.push(clause);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Runs the full DIMACS simplification pipeline and writes `p cnf N
    /// M` plus the surviving clauses.
    ///
    /// Steps, applied per clause, then across the whole set:
    /// 1. drop clauses containing the constant `TRUE` literal (already
    ///    satisfied);
    /// 2. drop clauses containing both a literal and its negation
    ///    (tautologies);
    /// 3. strip occurrences of the constant `FALSE` literal (never
    ///    satisfies anything, safe to remove from a clause);
    /// 4. remap surviving variables to a dense `1..=N` range;
    /// 5. sort and deduplicate each clause's literals, then dedup
    ///    clauses against each other;
    /// 6. emit the header and body.
    pub fn write_dimacs(&self, out: &mut impl Write) -> io::Result<()> {
        log::debug!(target: targets::CLAUSE_STORE, "Simplifying {} clauses for DIMACS emission", self.clauses.len());
        let mut survivors: Vec<Vec<Lit>> = Vec::with_capacity(self.clauses.len());

        for clause in &self.clauses {
            if clause.iter().any(|l| *l == TRUE) {
                continue;
            }
            let stripped: Vec<Lit> = clause.iter().copied().filter(|l| *l != FALSE).collect();
            if stripped
                .iter()
                .any(|l| stripped.contains(&l.negate()))
            {
                continue;
            }
            survivors.push(stripped);
        }

        let mut seen_vars: Vec<i64> = Vec::new();
        for clause in &survivors {
            for lit in clause {
                let v = lit.variable();
                if !seen_vars.contains(&v) {
                    seen_vars.push(v);
                }
            }
        }
        seen_vars.sort_unstable();
        let mut dense: HashMap<i64, i64> = HashMap::new();
        for (i, v) in seen_vars.iter().enumerate() {
            dense.insert(*v, i as i64 + 1);
        }

        let mut final_clauses: Vec<Vec<i64>> = Vec::with_capacity(survivors.len());
        for clause in &survivors {
            let mut remapped: Vec<i64> = clause
                .iter()
                .map(|l| {
                    let new_var = dense[&l.variable()];
                    if l.polarity() {
                        new_var
                    } else {
                        -new_var
                    }
                })
                .collect();
            remapped.sort_unstable();
            remapped.dedup();
            final_clauses.push(remapped);
        }
        final_clauses.sort();
        final_clauses.dedup();

        log::info!(
            target: targets::CLAUSE_STORE,
            "Writing p cnf {} {}",
            dense.len(),
            final_clauses.len()
        );
        writeln!(out, "p cnf {} {}", dense.len(), final_clauses.len())?;
        for clause in &final_clauses {
            let line: Vec<String> = clause.iter().map(|l| l.to_string()).collect();
            writeln!(out, "{} 0", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::implies;

    #[test]
    fn drops_satisfied_and_tautological_clauses() {
        let mut store = ClauseStore::new();
        let a = Lit::new(store.fresh_variable(), true);
        let b = Lit::new(store.fresh_variable(), true);
        store.append(vec![TRUE, b]);
        store.append(vec![a, a.negate()]);
        store.append(vec![a, b]);

        let mut buf = Vec::new();
        store.write_dimacs(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("p cnf 2 1"));
    }

    #[test]
    fn strips_constant_false_literal() {
        let mut store = ClauseStore::new();
        let a = Lit::new(store.fresh_variable(), true);
        store.append(implies(&[FALSE], a));

        let mut buf = Vec::new();
        store.write_dimacs(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "p cnf 1 1\n1 0\n");
    }

    #[test]
    fn dedups_identical_clauses_across_appends() {
        let mut store = ClauseStore::new();
        let a = Lit::new(store.fresh_variable(), true);
        let b = Lit::new(store.fresh_variable(), true);
        store.append(vec![a, b]);
        store.append(vec![b, a]);

        let mut buf = Vec::new();
        store.write_dimacs(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "p cnf 2 1\n1 2 0\n");
    }
}
