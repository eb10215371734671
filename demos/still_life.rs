//! Searches for a 3x3 still life under Conway's rule: nine free cells,
//! two generations, forced to repeat with period 1 so the evolution
//! rule's only solutions are configurations that reproduce themselves.
//!
//! Writes the resulting DIMACS instance to stdout rather than invoking
//! a solver, so running this demo doesn't depend on one being on PATH.

use lls::search_pattern::{blank_search_pattern, BackgroundGrid, Grid3};
use lls::transition::TransitionScheme;

fn main() {
    let background = BackgroundGrid {
        grid: Grid3::filled(1, 1, 1, lls::literal::FALSE),
        ignore_transition: Grid3::filled(1, 1, 1, true),
    };

    let mut pattern = blank_search_pattern(3, 3, 2, background, "B3/S23", TransitionScheme::Taocp)
        .expect("B3/S23 is a well-formed rulestring");

    pattern.force_period(1, 0, 0).expect("a fresh grid has no conflicting equalities");
    pattern.force_evolution();
    if let Err(e) = pattern.remove_redundancies() {
        eprintln!("preprocessing proved unsatisfiability: {e}");
        return;
    }

    eprintln!("undetermined cells: {}", pattern.number_of_cells());
    eprintln!("variables: {}", pattern.store.variable_count());
    eprintln!("clauses: {}", pattern.store.len());

    let mut out = Vec::new();
    pattern.store.write_dimacs(&mut out).expect("writing to a Vec<u8> cannot fail");
    print!("{}", String::from_utf8(out).expect("DIMACS output is ASCII"));
}
