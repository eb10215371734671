//! Searches for a period-3 oscillator confined to a single-wide strip,
//! under a rule contrived to make the search unsatisfiable: `force_period`
//! demands every cell repeat every three generations, `force_change`
//! demands generation 0 and 1 differ somewhere, and a one-cell-wide strip
//! leaves each cell only two neighbours within the grid. Demonstrates a
//! search that preprocessing alone can resolve, without reaching a solver.

use lls::search_pattern::{blank_search_pattern, BackgroundGrid, Grid3};
use lls::transition::TransitionScheme;

fn main() {
    let background = BackgroundGrid {
        grid: Grid3::filled(1, 1, 1, lls::literal::FALSE),
        ignore_transition: Grid3::filled(1, 1, 1, true),
    };

    let mut pattern = blank_search_pattern(1, 5, 3, background, "B3/S23", TransitionScheme::Generic)
        .expect("B3/S23 is a well-formed rulestring");

    pattern.force_period(3, 0, 0).expect("a fresh grid has no conflicting equalities");
    pattern.force_change(0, 1);
    pattern.force_evolution();

    match pattern.remove_redundancies() {
        Ok(()) => {
            eprintln!("preprocessing did not rule out a solution on its own");
            eprintln!("variables: {}", pattern.store.variable_count());
            eprintln!("clauses: {}", pattern.store.len());
        }
        Err(e) => eprintln!("preprocessing proved unsatisfiability: {e}"),
    }
}
