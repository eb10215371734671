//! CLI-specific argument parsing and the TOML search recipe.
//!
//! Arguments are parsed by hand with `arg.split('=')` rather than
//! reaching for `clap`.

use std::path::PathBuf;

use serde::Deserialize;

use lls::config::Config;
use lls::symmetry::Transform;
use lls::types::err::FormatError;

/// Options controlling how the CLI drives one invocation of the
/// library, as opposed to [`Config`]'s solver/output defaults.
#[derive(Default)]
pub struct CliOptions {
    /// Path to the pattern-grid text file (the only required
    /// positional argument).
    pub pattern_path: Option<PathBuf>,
    /// Path to a background-grid text file, parsed with the same
    /// grammar as the search pattern. Falls back to a flat, all-dead,
    /// non-periodic background when not given.
    pub background_path: Option<PathBuf>,
    /// Optional TOML recipe of search constraints.
    pub recipe_path: Option<PathBuf>,
    /// Overrides [`Config::rulestring`] when given.
    pub rulestring: Option<String>,
    /// Write the DIMACS file and skip invoking the solver.
    pub dry_run: bool,
    /// Retain the scratch DIMACS file at this path instead of deleting it.
    pub save_dimacs: Option<PathBuf>,
    /// Append each found solution to this file, in addition to printing it.
    pub output_path: Option<PathBuf>,
    /// How many distinct solutions to search for (`None` means one).
    pub number_of_solutions: Option<u32>,
}

/// An error parsing a CLI argument.
pub enum ArgError {
    Unrecognised(String),
    MissingValue(&'static str),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ArgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgError::Unrecognised(s) => write!(f, "unrecognised argument: {s}"),
            ArgError::MissingValue(flag) => write!(f, "{flag} requires a value"),
            ArgError::InvalidValue(flag, value) => write!(f, "{flag} given an invalid value: {value}"),
        }
    }
}

/// Parses `args` (as from [`std::env::args`], `argv[0]` included) into
/// [`CliOptions`] plus any `--`-prefixed [`Config`] override. The last
/// non-flag argument, if any, is taken as the pattern file path.
pub fn parse_args(args: &[String]) -> Result<(CliOptions, Config), ArgError> {
    let mut options = CliOptions::default();
    let mut config = Config::default();
    let mut positional = None;

    for arg in args.iter().skip(1) {
        let mut split = arg.split('=');
        match split.next() {
            Some("--dry-run") => options.dry_run = true,

            Some("--recipe") => {
                let value = split.next().ok_or(ArgError::MissingValue("--recipe"))?;
                options.recipe_path = Some(PathBuf::from(value));
            }

            Some("--background") => {
                let value = split.next().ok_or(ArgError::MissingValue("--background"))?;
                options.background_path = Some(PathBuf::from(value));
            }

            Some("--rulestring") => {
                let value = split.next().ok_or(ArgError::MissingValue("--rulestring"))?;
                options.rulestring = Some(value.to_string());
            }

            Some("--save-dimacs") => {
                let value = split.next().ok_or(ArgError::MissingValue("--save-dimacs"))?;
                options.save_dimacs = Some(PathBuf::from(value));
            }

            Some("--output") => {
                let value = split.next().ok_or(ArgError::MissingValue("--output"))?;
                options.output_path = Some(PathBuf::from(value));
            }

            Some("--solutions") => {
                let value = split.next().ok_or(ArgError::MissingValue("--solutions"))?;
                let parsed = value
                    .parse::<u32>()
                    .map_err(|_| ArgError::InvalidValue("--solutions", value.to_string()))?;
                options.number_of_solutions = Some(parsed);
            }

            Some("--format") => {
                let value = split.next().ok_or(ArgError::MissingValue("--format"))?;
                config.pattern_output_format = lls::io::OutputFormat::parse(value)
                    .map_err(|_| ArgError::InvalidValue("--format", value.to_string()))?;
            }

            Some("--solver") => {
                let value = split.next().ok_or(ArgError::MissingValue("--solver"))?;
                config.solver = value.to_string();
            }

            Some("--timeout") => {
                let value = split.next().ok_or(ArgError::MissingValue("--timeout"))?;
                let seconds = value
                    .parse::<u64>()
                    .map_err(|_| ArgError::InvalidValue("--timeout", value.to_string()))?;
                config.timeout = Some(std::time::Duration::from_secs(seconds));
            }

            Some(other) if other.starts_with("--") => {
                return Err(ArgError::Unrecognised(other.to_string()));
            }

            Some(other) => positional = Some(PathBuf::from(other)),

            None => {}
        }
    }

    options.pattern_path = positional;
    Ok((options, config))
}

/// One geometric constraint drawn from a [`SearchRecipe`]'s `symmetry`
/// or `asymmetry` list: a D4 transform plus the translation/period
/// parameters `lls::search_pattern::SearchPattern::force_symmetry` needs.
#[derive(Debug, Clone, Deserialize)]
pub struct SymmetryEntry {
    pub transform: String,
    #[serde(default)]
    pub dx: i64,
    #[serde(default)]
    pub dy: i64,
    #[serde(default = "default_period")]
    pub period: i64,
}

fn default_period() -> i64 {
    1
}

impl SymmetryEntry {
    pub fn transform(&self) -> Result<Transform, FormatError> {
        match self.transform.to_uppercase().as_str() {
            "RO0" => Ok(Transform::Ro0),
            "RO1" => Ok(Transform::Ro1),
            "RO2" => Ok(Transform::Ro2),
            "RO3" => Ok(Transform::Ro3),
            "RE-" | "RE_DASH" => Ok(Transform::ReDash),
            "RE\\" | "RE_BACKSLASH" => Ok(Transform::ReBackslash),
            "RE|" | "RE_PIPE" => Ok(Transform::RePipe),
            "RE/" | "RE_SLASH" => Ok(Transform::ReSlash),
            other => Err(FormatError::UnknownFormat(format!("unknown symmetry transform: {other}"))),
        }
    }
}

/// A cardinality constraint over a set of generations: `force_population_*(generations, population)`.
#[derive(Debug, Clone, Deserialize)]
pub struct PopulationEntry {
    pub generations: Vec<usize>,
    pub population: i64,
}

/// A pair of generations a `force_change` constraint applies between.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEntry {
    pub from: usize,
    pub to: usize,
}

/// The full set of search constraints a TOML recipe may describe,
/// mirroring the keyword arguments `original_source/src/main.py`'s
/// `LLS`/`preprocess` pass to `SearchPattern`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRecipe {
    #[serde(default)]
    pub symmetry: Vec<SymmetryEntry>,
    #[serde(default)]
    pub asymmetry: Vec<SymmetryEntry>,
    #[serde(default)]
    pub population_at_least: Vec<PopulationEntry>,
    #[serde(default)]
    pub population_at_most: Vec<PopulationEntry>,
    #[serde(default)]
    pub population_exactly: Vec<PopulationEntry>,
    #[serde(default)]
    pub force_change: Vec<ChangeEntry>,
    pub max_change: Option<i64>,
    pub max_decay: Option<i64>,
    pub max_growth: Option<i64>,
}

impl SearchRecipe {
    pub fn from_str(text: &str) -> Result<Self, FormatError> {
        toml::from_str(text).map_err(|e| FormatError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_positional_invocation() {
        let args = vec!["lls".to_string(), "pattern.txt".to_string()];
        let (options, _config) = parse_args(&args).unwrap();
        assert_eq!(options.pattern_path, Some(PathBuf::from("pattern.txt")));
        assert!(!options.dry_run);
    }

    #[test]
    fn parses_flags_and_keeps_the_positional_argument() {
        let args = vec![
            "lls".to_string(),
            "--dry-run".to_string(),
            "--solutions=3".to_string(),
            "pattern.txt".to_string(),
        ];
        let (options, _config) = parse_args(&args).unwrap();
        assert!(options.dry_run);
        assert_eq!(options.number_of_solutions, Some(3));
        assert_eq!(options.pattern_path, Some(PathBuf::from("pattern.txt")));
    }

    #[test]
    fn parses_background_path() {
        let args = vec![
            "lls".to_string(),
            "--background=bg.txt".to_string(),
            "pattern.txt".to_string(),
        ];
        let (options, _config) = parse_args(&args).unwrap();
        assert_eq!(options.background_path, Some(PathBuf::from("bg.txt")));
    }

    #[test]
    fn rejects_unrecognised_flags() {
        let args = vec!["lls".to_string(), "--not-a-real-flag".to_string()];
        assert!(matches!(parse_args(&args), Err(ArgError::Unrecognised(_))));
    }

    #[test]
    fn deserialises_a_symmetry_recipe() {
        let text = "[[symmetry]]\ntransform = \"RO0\"\ndx = 1\nperiod = 2\n";
        let recipe = SearchRecipe::from_str(text).unwrap();
        assert_eq!(recipe.symmetry.len(), 1);
        assert_eq!(recipe.symmetry[0].dx, 1);
        assert_eq!(recipe.symmetry[0].period, 2);
        assert!(matches!(recipe.symmetry[0].transform(), Ok(Transform::Ro0)));
    }
}
