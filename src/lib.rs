/*!
A library for searching spatio-temporal patterns in 2D outer-totalistic
cellular automata (Conway's Life and its many Hensel-notation relatives)
by encoding the search as a boolean satisfiability problem and
delegating solving to an external SAT solver.

# Orientation

A search starts from a [`search_pattern::SearchPattern`], built from a
symbolic pattern grid (cells may be constant, free, or shared
variables) and a rulestring. Constraints (symmetry, population bounds,
change bounds, the evolution rule itself) are added as methods on the
pattern, each appending clauses to its internal clause store. Once
constrained, [`solver::run`] writes the accumulated clauses to a DIMACS
file and drives an external solver subprocess over them.

Useful starting points:
- [`literal`] for the signed-literal algebra every other module builds on.
- [`rules`] for rulestring parsing and the canonical transition table.
- [`search_pattern`] for the orchestration tying everything together.
- [`solver`] for how an external SAT solver is invoked and its output parsed.

# Logs

Calls to [log!](log) are made throughout the library under the targets
listed in [`misc::log`]. For example, with
[env_logger](https://docs.rs/env_logger):
`RUST_LOG=cardinality=debug` narrows output to the cardinality encoder.
*/

pub mod cardinality;
pub mod clause_store;
pub mod config;
pub mod generic_combinations;
pub mod io;
pub mod literal;
pub mod misc;
pub mod redundancy;
pub mod rules;
pub mod search_pattern;
pub mod solver;
pub mod symmetry;
pub mod transition;
pub mod types;
