//! Drives an external SAT solver subprocess over a DIMACS file: writes
//! a scratch file, builds the solver's command line, races completion
//! against a timeout, and parses its stdout into a [`SolverOutcome`].

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Once;
use std::thread;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::clause_store::ClauseStore;
use crate::misc::log::targets;
use crate::types::err::SolverError;

/// The outcome of one solver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverOutcome {
    /// Satisfiable, with the raw signed-literal model.
    Sat(Vec<i64>),
    Unsat,
    Timeout,
    Interrupted,
}

/// Solver binaries differ only in the one extra flag glucose needs to
/// print a model; everything else is read from standard DIMACS-style
/// `s`/`v` output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverFamily {
    Standard,
    Glucose,
}

/// Resolves a solver name (as found in [`crate::config::Config::supported_solvers`])
/// to the family governing its command line.
pub fn family_for(solver: &str) -> Option<SolverFamily> {
    match solver {
        "lingeling" | "plingeling" | "treengeling" | "cadical" | "kissat" => Some(SolverFamily::Standard),
        "glucose" | "glucose-syrup" => Some(SolverFamily::Glucose),
        _ => None,
    }
}

pub struct RunOptions<'a> {
    pub solver_path: &'a Path,
    pub family: SolverFamily,
    pub extra_args: &'a [String],
    pub timeout: Option<Duration>,
}

/// Writes `store`'s clauses to a scratch DIMACS file (deleted on
/// return) and drives the solver named in `options` over it.
pub fn run(store: &ClauseStore, options: &RunOptions) -> Result<SolverOutcome, SolverError> {
    let mut scratch = NamedTempFile::new().map_err(|e| SolverError::Process(e.to_string()))?;
    store
        .write_dimacs(&mut scratch)
        .map_err(|e| SolverError::Process(e.to_string()))?;
    scratch.flush().map_err(|e| SolverError::Process(e.to_string()))?;
    run_on_file(scratch.path(), options)
}

/// As [`run`], but against an already-written DIMACS file (used by
/// `--save-dimacs`, so the file isn't deleted afterwards).
pub fn run_on_file(path: &Path, options: &RunOptions) -> Result<SolverOutcome, SolverError> {
    log::info!(target: targets::SOLVER, "Invoking {} on {}", options.solver_path.display(), path.display());
    let mut command = Command::new(options.solver_path);
    command.arg(path);
    if options.family == SolverFamily::Glucose {
        command.arg("-model");
    }
    command.args(options.extra_args);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| SolverError::Process(e.to_string()))?;
    install_interrupt_handler();
    INTERRUPTED.store(false, Ordering::SeqCst);

    let (tx, rx) = mpsc::channel();
    let mut stdout = child.stdout.take().expect("stdout was piped");
    let mut stderr = child.stderr.take().expect("stderr was piped");
    let reader = thread::spawn(move || {
        let mut out = String::new();
        let mut err = String::new();
        let _ = stdout.read_to_string(&mut out);
        let _ = stderr.read_to_string(&mut err);
        let _ = tx.send((out, err));
    });

    // No-timeout is modeled as a very long one rather than `Duration::MAX`,
    // which overflows when `recv_timeout` adds it to the current instant.
    let limit = options.timeout.unwrap_or(Duration::from_secs(315_360_000));

    match rx.recv_timeout(limit) {
        Ok((out, _err)) => {
            finish(&mut child, reader);
            if INTERRUPTED.load(Ordering::SeqCst) {
                Ok(SolverOutcome::Interrupted)
            } else {
                Ok(parse_output(&out, options.family))
            }
        }
        Err(_) => {
            log::warn!(target: targets::SOLVER, "Solver exceeded its timeout, killing child");
            let _ = child.kill();
            finish(&mut child, reader);
            if INTERRUPTED.load(Ordering::SeqCst) {
                Ok(SolverOutcome::Interrupted)
            } else {
                Ok(SolverOutcome::Timeout)
            }
        }
    }
}

fn finish(child: &mut Child, reader: thread::JoinHandle<()>) {
    let _ = child.wait();
    let _ = reader.join();
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INTERRUPT_HANDLER: Once = Once::new();

fn install_interrupt_handler() {
    INTERRUPT_HANDLER.call_once(|| {
        let _ = ctrlc::set_handler(|| {
            INTERRUPTED.store(true, Ordering::SeqCst);
        });
    });
}

/// Parses a solver's combined stdout into a [`SolverOutcome`]. Modern
/// builds of every supported solver (including glucose, despite the
/// original's more convoluted string-splitting worked around an older
/// release) print a DIMACS-standard `s SATISFIABLE`/`s UNSATISFIABLE`
/// status line and zero or more `v ...` model lines, so one parser
/// covers every family; [`SolverFamily`] only changes the command line.
fn parse_output(out: &str, _family: SolverFamily) -> SolverOutcome {
    let unsat = out
        .lines()
        .any(|line| line.starts_with('s') && line.to_uppercase().contains("UNSAT"));
    if unsat {
        return SolverOutcome::Unsat;
    }

    let mut literals = Vec::new();
    for line in out.lines() {
        if let Some(values) = line.strip_prefix("v ") {
            for token in values.split_whitespace() {
                if let Ok(n) = token.parse::<i64>() {
                    if n != 0 {
                        literals.push(n);
                    }
                }
            }
        }
    }
    SolverOutcome::Sat(literals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_lookup_distinguishes_glucose() {
        assert_eq!(family_for("kissat"), Some(SolverFamily::Standard));
        assert_eq!(family_for("glucose"), Some(SolverFamily::Glucose));
        assert_eq!(family_for("not-a-solver"), None);
    }

    #[test]
    fn parses_unsat_status_line() {
        let outcome = parse_output("c comment\ns UNSATISFIABLE\n", SolverFamily::Standard);
        assert_eq!(outcome, SolverOutcome::Unsat);
    }

    #[test]
    fn parses_satisfying_model_literals() {
        let outcome = parse_output("s SATISFIABLE\nv 1 -2 3 0\n", SolverFamily::Standard);
        assert_eq!(outcome, SolverOutcome::Sat(vec![1, -2, 3]));
    }
}
