/*!
A simple CLI interface to the library.

# Use

```sh
lls [--option(=value)]* pattern.txt
```

## Options

- `--recipe=PATH` a TOML file of search constraints (symmetry, population
  bounds, change bounds) applied before the evolution rule itself.
- `--background=PATH` a background-grid text file, parsed with the same
  grammar as the pattern itself. Falls back to a flat, all-dead,
  non-periodic background when not given.
- `--rulestring=RULE` overrides the configured default rulestring.
- `--dry-run` writes the DIMACS file and skips invoking a solver.
- `--save-dimacs=PATH` retains the DIMACS file at `PATH` instead of deleting it.
- `--output=PATH` appends each found solution to `PATH`, in addition to
  printing it.
- `--solutions=N` keeps searching (via `force_distinct`) until `N` distinct
  solutions are found.
- `--format=rle|csv|blk`, `--solver=NAME`, `--timeout=SECONDS` override the
  matching [`lls::config::Config`] fields.

For full documentation of the supported options, see the source of
[`config::parse_args`].
*/

use std::path::Path;

use lls::clause_store::ClauseStore;
use lls::io;
use lls::search_pattern::{BackgroundGrid, Grid3, SearchPattern};
use lls::solver::{self, RunOptions};
use lls::types::err::ErrorKind;

mod config;
use config::{parse_args, SearchRecipe};

mod misc;
use misc::{outcome_message, print_problem_statistics, render_solution};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let (options, mut config) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("c {e}");
            std::process::exit(1);
        }
    };

    if let Some(rulestring) = &options.rulestring {
        config.rulestring = rulestring.clone();
    }

    let pattern_path = match &options.pattern_path {
        Some(path) => path,
        None => {
            eprintln!("c No pattern file given.");
            std::process::exit(1);
        }
    };

    let recipe = match &options.recipe_path {
        Some(path) => match io::read_to_string(path).and_then(|text| SearchRecipe::from_str(&text)) {
            Ok(recipe) => recipe,
            Err(e) => {
                eprintln!("c Failed to read recipe: {e}");
                std::process::exit(1);
            }
        },
        None => SearchRecipe::default(),
    };

    match run(pattern_path, &config, &options, &recipe) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("c {e}");
            std::process::exit(2);
        }
    }
}

fn run(
    pattern_path: &Path,
    config: &lls::config::Config,
    options: &config::CliOptions,
    recipe: &SearchRecipe,
) -> Result<(), ErrorKind> {
    let pattern_text = io::read_to_string(pattern_path)?;

    let mut store = ClauseStore::new();
    let parsed = io::parse_pattern_text(&pattern_text, &mut store)?;
    let background = match &options.background_path {
        Some(path) => {
            let text = io::read_to_string(path)?;
            let parsed = io::parse_pattern_text(&text, &mut store)?;
            BackgroundGrid {
                grid: parsed.grid,
                ignore_transition: parsed.ignore_transition,
            }
        }
        None => flat_background(),
    };

    let mut pattern = SearchPattern::new(
        parsed.grid,
        parsed.ignore_transition,
        background,
        store,
        &config.rulestring,
        config.life_encoding_method,
    )?;

    preprocess(&mut pattern, recipe)?;
    print_problem_statistics(&pattern);

    if options.dry_run {
        if let Some(save_path) = &options.save_dimacs {
            let mut file = std::fs::File::create(save_path).map_err(|e| ErrorKind::Format(e.into()))?;
            pattern.store.write_dimacs(&mut file).map_err(|e| ErrorKind::Format(e.into()))?;
        }
        println!("Dry run");
        return Ok(());
    }

    let family = solver::family_for(&config.solver).unwrap_or(solver::SolverFamily::Standard);
    let run_options = RunOptions {
        solver_path: Path::new(&config.solver),
        family,
        extra_args: &[],
        timeout: config.timeout,
    };

    let outcome = if let Some(save_path) = &options.save_dimacs {
        let mut file = std::fs::File::create(save_path).map_err(|e| ErrorKind::Format(e.into()))?;
        pattern.store.write_dimacs(&mut file).map_err(|e| ErrorKind::Format(e.into()))?;
        solver::run_on_file(save_path, &run_options)?
    } else {
        solver::run(&pattern.store, &run_options)?
    };

    let determined = pattern.deterministic();
    let show_solution = |pattern: &SearchPattern, solution: &[i64]| -> String {
        let grid = pattern.substitute_solution(solution);
        render_solution(config, pattern, &grid, determined)
    };

    let solution = match &outcome {
        solver::SolverOutcome::Sat(solution) => solution.clone(),
        other => {
            println!("{}", outcome_message(other));
            return Ok(());
        }
    };

    let mut found = 1u32;
    let target = options.number_of_solutions.unwrap_or(1);
    let text = show_solution(&pattern, &solution);
    println!("{text}");
    if let Some(output_path) = &options.output_path {
        io::append_string(output_path, &text)?;
    }

    let mut current = solution;
    while found < target {
        pattern.force_distinct(&current, determined);
        let outcome = solver::run(&pattern.store, &run_options)?;
        match outcome {
            solver::SolverOutcome::Sat(next) => {
                let text = show_solution(&pattern, &next);
                println!("{text}");
                if let Some(output_path) = &options.output_path {
                    io::append_string(output_path, &text)?;
                }
                current = next;
                found += 1;
            }
            other => {
                println!("{}", outcome_message(&other));
                break;
            }
        }
    }

    Ok(())
}

/// The flat, all-dead, non-periodic background used when a search
/// doesn't supply its own (every out-of-bounds neighbour resolves to
/// dead).
fn flat_background() -> BackgroundGrid {
    BackgroundGrid {
        grid: Grid3::filled(1, 1, 1, lls::literal::FALSE),
        ignore_transition: Grid3::filled(1, 1, 1, true),
    }
}

/// Applies a [`SearchRecipe`]'s constraints to `pattern`, mirroring
/// `original_source/src/main.py`'s `preprocess`: symmetry first (it
/// rewrites the grid), then redundancy removal, then every clause-level
/// constraint, then the evolution rule itself.
fn preprocess(pattern: &mut SearchPattern, recipe: &SearchRecipe) -> Result<(), ErrorKind> {
    for entry in &recipe.symmetry {
        let transform = entry.transform()?;
        pattern.force_symmetry(transform, entry.dx, entry.dy, entry.period)?;
    }

    pattern.remove_redundancies()?;

    for entry in &recipe.asymmetry {
        let transform = entry.transform()?;
        pattern.force_asymmetry(transform, entry.dx, entry.dy, entry.period);
    }

    for entry in &recipe.population_at_least {
        pattern.force_population_at_least(&entry.generations, entry.population);
    }
    for entry in &recipe.population_at_most {
        pattern.force_population_at_most(&entry.generations, entry.population);
    }
    for entry in &recipe.population_exactly {
        pattern.force_population_exactly(&entry.generations, entry.population);
    }

    if let Some(bound) = recipe.max_change {
        pattern.force_max_delta(bound, lls::search_pattern::DeltaDirection::Change);
    }
    if let Some(bound) = recipe.max_decay {
        pattern.force_max_delta(bound, lls::search_pattern::DeltaDirection::Decay);
    }
    if let Some(bound) = recipe.max_growth {
        pattern.force_max_delta(bound, lls::search_pattern::DeltaDirection::Growth);
    }

    for change in &recipe.force_change {
        pattern.force_change(change.from, change.to);
    }

    pattern.force_evolution();
    Ok(())
}
