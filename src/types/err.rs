/*!
Error types used in the library.

Each subsystem gets its own error enum; `ErrorKind` is a union of them,
with a `From` impl per variant so `?` composes across module boundaries.
*/

use std::fmt;

/// A union of varied error kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An error parsing or emitting a rulestring.
    Rule(RuleError),

    /// An error in the cardinality encoder.
    Cardinality(CardinalityError),

    /// An error while building or constraining a search pattern.
    Search(SearchError),

    /// An error invoking or reading from an external solver.
    Solver(SolverError),

    /// An error parsing or formatting pattern/DIMACS text.
    Format(FormatError),

    /// A Life-specific transition scheme ([`crate::transition::TransitionScheme::Taocp`]
    /// or [`crate::transition::TransitionScheme::Naive`]) was requested
    /// for a rulestring other than plain Life (`B3/S23`).
    UnsupportedRuleScheme(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Rule(e) => write!(f, "{e}"),
            ErrorKind::Cardinality(e) => write!(f, "{e}"),
            ErrorKind::Search(e) => write!(f, "{e}"),
            ErrorKind::Solver(e) => write!(f, "{e}"),
            ErrorKind::Format(e) => write!(f, "{e}"),
            ErrorKind::UnsupportedRuleScheme(rulestring) => write!(
                f,
                "the Taocp/Naive transition schemes only support Life (B3/S23); got {rulestring}"
            ),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// An error parsing or emitting a Hensel outer-totalistic rulestring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// The rulestring did not match either supported layout.
    Malformed(String),
    /// A neighbour count or transition letter is not in the canonical
    /// alphabet for that count.
    UnknownTransition(String),
    /// A bracketed explicit rule map failed to parse.
    InvalidExplicitMap(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::Malformed(s) => write!(f, "malformed rulestring: {s}"),
            RuleError::UnknownTransition(s) => write!(f, "unknown transition: {s}"),
            RuleError::InvalidExplicitMap(s) => write!(f, "invalid explicit rule map: {s}"),
        }
    }
}

impl From<RuleError> for ErrorKind {
    fn from(e: RuleError) -> Self {
        ErrorKind::Rule(e)
    }
}

/// An error in the cardinality encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardinalityError {
    /// A bound was requested that is impossible for the literal count
    /// given (e.g. at-least-5-of-3).
    ImpossibleBound { requested: i64, available: usize },
}

impl fmt::Display for CardinalityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardinalityError::ImpossibleBound {
                requested,
                available,
            } => write!(
                f,
                "cardinality bound {requested} impossible over {available} literals"
            ),
        }
    }
}

impl From<CardinalityError> for ErrorKind {
    fn from(e: CardinalityError) -> Self {
        ErrorKind::Cardinality(e)
    }
}

/// An error while building or constraining a search pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// Preprocessing (redundancy folding, equality substitution, or
    /// constant propagation) derived a direct contradiction before any
    /// solver was invoked.
    UnsatInPreprocessing,
    /// A pattern-grid's generations/rows/cells were not cuboidal.
    NonCuboidal,
    /// A coordinate fell outside the grid and no background was
    /// available to resolve it.
    OutOfBounds { x: i64, y: i64, t: i64 },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::UnsatInPreprocessing => {
                write!(f, "preprocessing derived a direct contradiction")
            }
            SearchError::NonCuboidal => write!(f, "pattern grid is not cuboidal"),
            SearchError::OutOfBounds { x, y, t } => {
                write!(f, "coordinate ({x}, {y}, {t}) is out of bounds")
            }
        }
    }
}

impl From<SearchError> for ErrorKind {
    fn from(e: SearchError) -> Self {
        ErrorKind::Search(e)
    }
}

/// An error invoking or reading from an external SAT solver process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// The solver binary could not be spawned, or exited with output
    /// this crate doesn't recognize. Carries stderr text where available.
    Process(String),
    /// The solver was killed after exceeding its timeout.
    Timeout,
    /// The solver was killed by a user interrupt (Ctrl+C).
    Interrupted,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Process(msg) => write!(f, "solver process error: {msg}"),
            SolverError::Timeout => write!(f, "solver timed out"),
            SolverError::Interrupted => write!(f, "solver interrupted"),
        }
    }
}

impl From<SolverError> for ErrorKind {
    fn from(e: SolverError) -> Self {
        ErrorKind::Solver(e)
    }
}

/// An error parsing or formatting pattern/DIMACS text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// An I/O failure reading or writing a pattern/recipe/DIMACS file.
    Io(String),
    /// The requested output format name is not recognized.
    UnknownFormat(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Io(msg) => write!(f, "io error: {msg}"),
            FormatError::UnknownFormat(name) => write!(f, "unknown output format: {name}"),
        }
    }
}

impl From<FormatError> for ErrorKind {
    fn from(e: FormatError) -> Self {
        ErrorKind::Format(e)
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e.to_string())
    }
}
