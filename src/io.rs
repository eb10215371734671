//! The pattern-grid text grammar (generations separated by a blank
//! line, rows by a newline, cells by whitespace/commas), and the RLE/CSV
//! formatters used to print a resolved solution back out.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::clause_store::ClauseStore;
use crate::literal::{Lit, TRUE};
use crate::rules::{rulestring_from_rule, RuleTable};
use crate::search_pattern::{resolve_cell, CellState, Grid3};
use crate::types::err::{FormatError, SearchError};

/// A pattern grid and its per-cell "ignore transition" flags, parsed
/// from the text grammar but not yet wired into a [`crate::search_pattern::SearchPattern`].
pub struct ParsedPattern {
    pub grid: Grid3<Lit>,
    pub ignore_transition: Grid3<bool>,
}

/// Parses a pattern-grid string, allocating a fresh variable per named
/// cell (first occurrence) or wildcard (`*`, every occurrence) via
/// `store`.
pub fn parse_pattern_text(text: &str, store: &mut ClauseStore) -> Result<ParsedPattern, SearchError> {
    let cleaned = strip_comments(text);
    let generations = split_generations(&cleaned);
    if generations.is_empty() {
        return Err(SearchError::NonCuboidal);
    }

    let rows: Vec<Vec<Vec<String>>> = generations.iter().map(|g| split_rows(g)).collect();

    let duration = rows.len();
    let height = rows[0].len();
    let width = if height > 0 { rows[0][0].len() } else { 0 };

    let cuboidal = rows.iter().all(|generation| {
        generation.len() == height && generation.iter().all(|row| row.len() == width)
    });
    if !cuboidal || height == 0 || width == 0 {
        return Err(SearchError::NonCuboidal);
    }

    let mut names: HashMap<String, i64> = HashMap::new();
    let mut grid = Grid3::filled(duration, height, width, TRUE);
    let mut ignore = Grid3::filled(duration, height, width, false);

    for (t, generation) in rows.iter().enumerate() {
        for (y, row) in generation.iter().enumerate() {
            for (x, token) in row.iter().enumerate() {
                let parsed = resolve_cell(token, &mut names, store).ok_or(SearchError::NonCuboidal)?;
                grid.set(t, y, x, parsed.lit);
                ignore.set(t, y, x, parsed.ignore_transition);
            }
        }
    }

    Ok(ParsedPattern {
        grid,
        ignore_transition: ignore,
    })
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find('#') {
            Some(i) => &line[..i],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits text into generations: runs of non-blank lines, separated by
/// one or more blank (or comma/whitespace-only) lines.
fn split_generations(text: &str) -> Vec<Vec<String>> {
    let mut generations = Vec::new();
    let mut current = Vec::new();
    for raw_line in text.lines() {
        let line = raw_line.trim_matches(|c: char| c.is_whitespace() || c == ',');
        if line.is_empty() {
            if !current.is_empty() {
                generations.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        generations.push(current);
    }
    generations
}

fn split_rows(generation: &[String]) -> Vec<Vec<String>> {
    generation
        .iter()
        .map(|line| {
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Which text format to render a resolved solution in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Rle,
    Csv,
    Blk,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Result<Self, FormatError> {
        match name.to_ascii_lowercase().as_str() {
            "rle" => Ok(OutputFormat::Rle),
            "csv" => Ok(OutputFormat::Csv),
            "blk" => Ok(OutputFormat::Blk),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

/// Renders a resolved solution as RLE: an `x = W, y = H[, rule = ...]`
/// header, generation 0's rows joined by `$`, a trailing `!`, and (when
/// the pattern isn't fully [`crate::search_pattern::SearchPattern::deterministic`])
/// every other generation underneath.
pub fn make_rle(grid: &Grid3<CellState>, rule: Option<&RuleTable>, determined: bool) -> String {
    let mut out = format!("x = {}, y = {}", grid.width, grid.height);
    if let Some(rule) = rule {
        out.push_str(&format!(", rule = {}", rulestring_from_rule(rule)));
    }
    out.push('\n');
    out.push_str(&render_rle_generation(grid, 0));
    out.push_str("!\n");

    if !determined && grid.duration > 1 {
        out.push_str("\nOther generations:\n");
        let rest: Vec<String> = (1..grid.duration).map(|t| render_rle_generation(grid, t)).collect();
        out.push_str(&rest.join("\n"));
    }
    out
}

fn render_rle_generation(grid: &Grid3<CellState>, t: usize) -> String {
    let rows: Vec<String> = (0..grid.height)
        .map(|y| {
            (0..grid.width)
                .map(|x| if *grid.get(t, y, x) == CellState::Alive { 'o' } else { 'b' })
                .collect::<String>()
        })
        .collect();
    rows.join("$\n") + "\n"
}

/// Renders a resolved solution as CSV: `0`/`1` per cell, rows joined by
/// newlines, generations separated by a blank line.
pub fn make_csv(grid: &Grid3<CellState>, rule: Option<&RuleTable>, determined: bool) -> String {
    let mut out = String::new();
    if let Some(rule) = rule {
        out.push_str(&format!("Rule = {}\n", rulestring_from_rule(rule)));
    }
    out.push_str(&render_csv_generation(grid, 0));

    if !determined && grid.duration > 1 {
        for t in 1..grid.duration {
            out.push('\n');
            out.push_str(&render_csv_generation(grid, t));
        }
    }
    out
}

fn render_csv_generation(grid: &Grid3<CellState>, t: usize) -> String {
    let rows: Vec<String> = (0..grid.height)
        .map(|y| {
            (0..grid.width)
                .map(|x| if *grid.get(t, y, x) == CellState::Alive { "1" } else { "0" })
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    rows.join("\n") + "\n"
}

/// Renders generation 0 of a resolved solution as a block of Unicode
/// "██"/"  " pairs, two characters per cell so the result reads roughly
/// square in a monospace terminal.
pub fn make_blk(grid: &Grid3<CellState>, rule: Option<&RuleTable>) -> String {
    let mut out = String::new();
    if let Some(rule) = rule {
        out.push_str(&format!("Rule = {}\n", rulestring_from_rule(rule)));
    }
    for y in 0..grid.height {
        for x in 0..grid.width {
            out.push_str(if *grid.get(0, y, x) == CellState::Alive {
                "\u{2588}\u{2588}"
            } else {
                "  "
            });
        }
        out.push('\n');
    }
    out
}

/// Reads an entire file into a string.
pub fn read_to_string(path: &Path) -> Result<String, FormatError> {
    fs::read_to_string(path).map_err(FormatError::from)
}

/// Writes a string to a file, overwriting any existing contents.
pub fn write_string(path: &Path, contents: &str) -> Result<(), FormatError> {
    fs::write(path, contents).map_err(FormatError::from)
}

/// Appends a string to a file, creating it if necessary.
pub fn append_string(path: &Path, contents: &str) -> Result<(), FormatError> {
    use std::io::Write as _;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(FormatError::from)?;
    file.write_all(contents.as_bytes()).map_err(FormatError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_two_generation_pattern_with_a_wildcard() {
        let mut store = ClauseStore::new();
        let text = "0,1,0\n1,1,1\n0,*,0\n\n0,1,0\n1,1,1\n0,1,0\n";
        let parsed = parse_pattern_text(text, &mut store).unwrap();
        assert_eq!(parsed.grid.duration, 2);
        assert_eq!(parsed.grid.height, 3);
        assert_eq!(parsed.grid.width, 3);
    }

    #[test]
    fn rejects_a_non_cuboidal_pattern() {
        let mut store = ClauseStore::new();
        let text = "0,1,0\n1,1\n";
        let err = parse_pattern_text(text, &mut store).unwrap_err();
        assert_eq!(err, SearchError::NonCuboidal);
    }

    #[test]
    fn strips_trailing_ignore_transition_marker() {
        let mut store = ClauseStore::new();
        let text = "a'\n";
        let parsed = parse_pattern_text(text, &mut store).unwrap();
        assert!(*parsed.ignore_transition.get(0, 0, 0));
    }

    #[test]
    fn renders_a_still_life_as_rle() {
        let mut grid = Grid3::filled(1, 2, 2, CellState::Dead);
        grid.set(0, 0, 0, CellState::Alive);
        let text = make_rle(&grid, None, true);
        assert!(text.starts_with("x = 2, y = 2"));
        assert!(text.contains("ob$\nbb\n!"));
    }

    #[test]
    fn renders_a_still_life_as_blk() {
        let mut grid = Grid3::filled(1, 2, 2, CellState::Dead);
        grid.set(0, 0, 0, CellState::Alive);
        let text = make_blk(&grid, None);
        assert_eq!(text, "\u{2588}\u{2588}  \n    \n");
    }

    #[test]
    fn output_format_recognises_blk() {
        assert_eq!(OutputFormat::parse("blk").unwrap(), OutputFormat::Blk);
    }
}
