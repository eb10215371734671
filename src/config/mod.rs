/*!
Search configuration: the defaults every search starts from, and a
TOML recipe file to override them.

Each option is wrapped in a [`ConfigOption`] so a recipe loader can
validate a requested value against a known range before accepting it.
*/

mod config_option;
pub use config_option::ConfigOption;

use serde::Deserialize;

use crate::io::OutputFormat;
use crate::transition::TransitionScheme;
use crate::types::err::FormatError;

/// How verbose progress logging should be, independent of the `log`
/// crate's own level filter: `0` silent, `3` most detailed.
pub type Verbosity = u8;

/// The full set of search defaults, loadable from a TOML recipe.
#[derive(Clone)]
pub struct Config {
    /// How much progress detail to print.
    pub verbosity: ConfigOption<Verbosity>,

    /// Format used when printing a found solution.
    pub pattern_output_format: OutputFormat,

    /// Which CNF encoding of the evolution rule to use.
    pub life_encoding_method: TransitionScheme,

    /// The rulestring new searches default to when none is given.
    pub rulestring: String,

    /// Name of the external SAT solver binary to invoke.
    pub solver: String,

    /// Solver binaries this crate knows how to invoke and parse output
    /// from.
    pub supported_solvers: Vec<String>,

    /// Name of the bundled background pattern to fall back on when a
    /// search doesn't pass `--background` explicitly. Currently
    /// informational only: no bundled `backgrounds/` directory ships
    /// with this crate, so a search with no explicit `--background`
    /// still gets the flat all-dead background.
    pub background: String,

    /// Wall-clock limit for a single solver invocation. `None` disables
    /// the timeout.
    pub timeout: Option<std::time::Duration>,
}

impl Default for Config {
    /// Roughly the defaults of a full-search CLI run: moderate logging,
    /// RLE output, the TAOCP-derived encoding for plain Life, and
    /// `kissat` as the solver.
    fn default() -> Self {
        Config {
            verbosity: ConfigOption {
                name: "verbosity",
                min: 0,
                max: 3,
                value: 2,
            },
            pattern_output_format: OutputFormat::Rle,
            life_encoding_method: TransitionScheme::Taocp,
            rulestring: "B3/S23".to_string(),
            solver: "kissat".to_string(),
            supported_solvers: [
                "kissat",
                "cadical",
                "glucose",
                "glucose-syrup",
                "lingeling",
                "plingeling",
                "treengeling",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            background: "possible_strobing".to_string(),
            timeout: None,
        }
    }
}

/// The subset of [`Config`] a recipe file may override; any field left
/// out keeps [`Config::default`]'s value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeOverrides {
    pub verbosity: Option<Verbosity>,
    pub pattern_output_format: Option<String>,
    pub life_encoding_method: Option<u8>,
    pub rulestring: Option<String>,
    pub solver: Option<String>,
    pub background: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Config {
    /// Parses a TOML recipe string and applies it over [`Config::default`].
    pub fn from_recipe_str(text: &str) -> Result<Self, FormatError> {
        let overrides: RecipeOverrides =
            toml::from_str(text).map_err(|e| FormatError::Io(e.to_string()))?;
        let mut config = Config::default();
        config.apply(overrides)?;
        Ok(config)
    }

    fn apply(&mut self, overrides: RecipeOverrides) -> Result<(), FormatError> {
        if let Some(verbosity) = overrides.verbosity {
            self.verbosity.set(verbosity).map_err(FormatError::Io)?;
        }
        if let Some(format) = overrides.pattern_output_format {
            self.pattern_output_format = OutputFormat::parse(&format)?;
        }
        if let Some(method) = overrides.life_encoding_method {
            self.life_encoding_method = match method {
                0 => TransitionScheme::Taocp,
                1 => TransitionScheme::Naive,
                2 => TransitionScheme::Generic,
                other => return Err(FormatError::Io(format!("unknown encoding method {other}"))),
            };
        }
        if let Some(rulestring) = overrides.rulestring {
            self.rulestring = rulestring;
        }
        if let Some(solver) = overrides.solver {
            if !self.supported_solvers.iter().any(|s| s == &solver) {
                return Err(FormatError::Io(format!("solver not recognised: {solver}")));
            }
            self.solver = solver;
        }
        if let Some(background) = overrides.background {
            self.background = background;
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.timeout = Some(std::time::Duration::from_secs(seconds));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_baseline() {
        let config = Config::default();
        assert_eq!(config.rulestring, "B3/S23");
        assert_eq!(config.solver, "kissat");
        assert_eq!(config.pattern_output_format, OutputFormat::Rle);
    }

    #[test]
    fn recipe_overrides_only_the_named_fields() {
        let config = Config::from_recipe_str("rulestring = \"B36/S23\"\nverbosity = 0\n").unwrap();
        assert_eq!(config.rulestring, "B36/S23");
        assert_eq!(config.verbosity.value, 0);
        assert_eq!(config.solver, "kissat");
    }

    #[test]
    fn unsupported_solver_is_rejected() {
        let err = Config::from_recipe_str("solver = \"made-up\"\n").unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
