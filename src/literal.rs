//! Signed-integer literal algebra.
//!
//! A literal is a nonzero signed integer: the sign is the polarity, the
//! absolute value is the variable. Variable `1` is wired to the constant
//! `true`, so literal `1` is "always true" and `-1` is "always false",
//! letting preprocessing fold constants into the same representation
//! used for ordinary variables instead of a separate `Constant` case.

use std::fmt;

/// A single signed literal. `Lit(3)` is the positive occurrence of
/// variable 3; `Lit(-3)` is its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(pub i64);

/// The constant "true" literal.
pub const TRUE: Lit = Lit(1);
/// The constant "false" literal.
pub const FALSE: Lit = Lit(-1);

impl Lit {
    /// Builds a literal from a variable id and polarity.
    ///
    /// # Panics
    /// Panics if `variable` is zero; zero has no sign and cannot be a
    /// variable id.
    pub fn new(variable: i64, polarity: bool) -> Self {
        assert_ne!(variable, 0, "variable id 0 is not a valid literal");
        let magnitude = variable.abs();
        Lit(if polarity { magnitude } else { -magnitude })
    }

    /// The variable this literal refers to (always positive).
    pub fn variable(self) -> i64 {
        self.0.abs()
    }

    /// `true` for a positive occurrence, `false` for a negated one.
    pub fn polarity(self) -> bool {
        self.0 > 0
    }

    /// Negates the literal in place value.
    pub fn negate(self) -> Lit {
        Lit(-self.0)
    }

    pub fn is_true(self) -> bool {
        self == TRUE
    }

    pub fn is_false(self) -> bool {
        self == FALSE
    }

    /// Raw DIMACS integer for this literal.
    pub fn as_int(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Lit {
    fn from(value: i64) -> Self {
        assert_ne!(value, 0, "variable id 0 is not a valid literal");
        Lit(value)
    }
}

/// A parsed pattern-grid cell: a literal plus the "ignore transition on
/// this cell" flag carried by a trailing `'` in the text grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLiteral {
    pub lit: Lit,
    pub ignore_transition: bool,
}

/// Builds an implication clause `antecedents => consequent`, i.e. the
/// clause `(-a1 | -a2 | ... | consequent)`.
pub fn implies(antecedents: &[Lit], consequent: Lit) -> Vec<Lit> {
    let mut clause: Vec<Lit> = antecedents.iter().map(|l| l.negate()).collect();
    clause.push(consequent);
    clause
}

/// Parses a cell token from the pattern-grid text grammar into a literal
/// and its ignore-transition flag, folding the redundant encodings the
/// grammar allows into one canonical form:
///
/// - a lone `*` means "free variable", callers allocate a fresh one;
/// - repeated trailing `'` collapse to a single flag;
/// - leading `-` chains cancel pairwise;
/// - `-0` / `-0'` become `1` / `1'` (negated false is true);
/// - `-1` / `-1'` become `0` / `0'` (negated true is false);
/// - bare `0` / `1` map to the constant literals.
///
/// `variable` resolves a symbolic name (anything other than `0`/`1`/`*`)
/// to a dense internal variable id.
pub fn standard_form_literal(
    token: &str,
    mut variable: impl FnMut(&str) -> i64,
) -> Option<ParsedLiteral> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let ignore_transition = token.ends_with('\'') || token.ends_with('\u{2019}');
    let mut body = token.trim_end_matches(['\'', '\u{2019}']);

    let mut negated = false;
    while let Some(rest) = body.strip_prefix('-') {
        negated = !negated;
        body = rest;
    }

    if body == "*" {
        // Wildcards are resolved to a fresh variable by the caller via
        // `variable("*")`, which must return a distinct id per call.
        let var = variable("*");
        let lit = Lit::new(var, !negated);
        return Some(ParsedLiteral {
            lit,
            ignore_transition,
        });
    }

    let lit = if body == "0" {
        if negated {
            TRUE
        } else {
            FALSE
        }
    } else if body == "1" {
        if negated {
            FALSE
        } else {
            TRUE
        }
    } else {
        let var = variable(body);
        Lit::new(var, !negated)
    };

    Some(ParsedLiteral {
        lit,
        ignore_transition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_round_trips() {
        let l = Lit::new(5, true);
        assert_eq!(l.negate().negate(), l);
        assert_eq!(l.negate(), Lit(-5));
    }

    #[test]
    fn implies_negates_antecedents() {
        let a = Lit(1);
        let b = Lit(2);
        let c = Lit(3);
        let clause = implies(&[a, b], c);
        assert_eq!(clause, vec![Lit(-1), Lit(-2), Lit(3)]);
    }

    #[test]
    fn standard_form_folds_double_negative_constants() {
        let mut next = 100;
        let mut fresh = move |_: &str| {
            next += 1;
            next
        };
        assert_eq!(
            standard_form_literal("-0", &mut fresh).unwrap().lit,
            TRUE
        );
        assert_eq!(
            standard_form_literal("-1", &mut fresh).unwrap().lit,
            FALSE
        );
        assert_eq!(
            standard_form_literal("--a", &mut fresh).unwrap().lit.polarity(),
            true
        );
    }

    #[test]
    fn standard_form_strips_ignore_transition_flag() {
        let mut fresh = |name: &str| if name == "a" { 7 } else { 0 };
        let parsed = standard_form_literal("-a'", &mut fresh).unwrap();
        assert!(parsed.ignore_transition);
        assert_eq!(parsed.lit, Lit(-7));
    }
}
