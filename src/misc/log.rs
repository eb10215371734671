/*!
Miscellaneous items related to [logging](log).

Calls to the log macro are made throughout the library, gated behind the
targets below so `RUST_LOG=rule=debug` (or similar, with
[env_logger](https://docs.rs/env_logger)) narrows output to one
subsystem at a time.

No log implementation is provided by this crate; see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to rule parsing and the transition lookup table.
    pub const RULE: &str = "rule";

    /// Logs related to the cardinality encoder's cache hits/misses.
    pub const CARDINALITY: &str = "cardinality";

    /// Logs related to the symmetry/equality substitution engine.
    pub const SYMMETRY: &str = "symmetry";

    /// Logs related to the redundancy-folding pass.
    pub const REDUNDANCY: &str = "redundancy";

    /// Logs related to transition (evolution-rule) clause encoding.
    pub const TRANSITION: &str = "transition";

    /// Logs related to the clause store and DIMACS emission.
    pub const CLAUSE_STORE: &str = "clause_store";

    /// Logs related to invoking and reading from the external solver.
    pub const SOLVER: &str = "solver";
}
