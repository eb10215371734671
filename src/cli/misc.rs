//! Small CLI-only helpers: progress messages and solution rendering.

use lls::config::Config;
use lls::io::{make_blk, make_csv, make_rle, OutputFormat};
use lls::search_pattern::{CellState, Grid3, SearchPattern};
use lls::solver::SolverOutcome;

/// Prints the undetermined-cell/variable/clause counts of a pattern
/// once constraints have been applied but before the solver runs.
pub fn print_problem_statistics(pattern: &SearchPattern) {
    println!("Number of undetermined cells: {}", pattern.number_of_cells());
    println!("Number of variables: {}", pattern.store.variable_count());
    println!("Number of clauses: {}", pattern.store.len());
}

/// Renders a resolved solution grid in the configured output format.
pub fn render_solution(
    config: &Config,
    pattern: &SearchPattern,
    grid: &Grid3<CellState>,
    determined: bool,
) -> String {
    let rule = Some(&pattern.rule);
    match config.pattern_output_format {
        OutputFormat::Rle => make_rle(grid, rule, determined),
        OutputFormat::Csv => make_csv(grid, rule, determined),
        OutputFormat::Blk => make_blk(grid, rule),
    }
}

/// The one-line status message printed for a non-satisfiable outcome.
pub fn outcome_message(outcome: &SolverOutcome) -> &'static str {
    match outcome {
        SolverOutcome::Sat(_) => "Satisfiable",
        SolverOutcome::Unsat => "Unsatisfiable",
        SolverOutcome::Timeout => "Timed Out",
        SolverOutcome::Interrupted => "Interrupted",
    }
}
