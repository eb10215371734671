//! Orchestration: owns the symbolic grid, background, rule table, clause
//! store, cardinality cache and equality forest for one search, and
//! exposes the constraint API used to build up a CNF instance.

use std::collections::HashMap;

use crate::cardinality::CardinalityCache;
use crate::clause_store::ClauseStore;
use crate::literal::{implies, Lit, ParsedLiteral, FALSE, TRUE};
use crate::misc::log::targets;
use crate::redundancy;
use crate::rules::{self, RuleTable};
use crate::symmetry::{EqualityForest, Transform};
use crate::transition::{self, TransitionScheme};
use crate::types::err::{ErrorKind, SearchError};

/// A dense `[t][y][x]`-indexed grid of literals (or, for
/// [`Grid3<bool>`], ignore-transition flags).
#[derive(Debug, Clone)]
pub struct Grid3<T> {
    pub duration: usize,
    pub height: usize,
    pub width: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid3<T> {
    pub fn filled(duration: usize, height: usize, width: usize, value: T) -> Self {
        Grid3 {
            duration,
            height,
            width,
            cells: vec![value; duration * height * width],
        }
    }

    fn index(&self, t: usize, y: usize, x: usize) -> usize {
        (t * self.height + y) * self.width + x
    }

    pub fn get(&self, t: usize, y: usize, x: usize) -> &T {
        &self.cells[self.index(t, y, x)]
    }

    pub fn set(&mut self, t: usize, y: usize, x: usize, value: T) {
        let i = self.index(t, y, x);
        self.cells[i] = value;
    }

    pub fn iter_coords(&self) -> impl Iterator<Item = (usize, usize, usize)> {
        let (d, h, w) = (self.duration, self.height, self.width);
        (0..d).flat_map(move |t| (0..h).flat_map(move |y| (0..w).map(move |x| (t, y, x))))
    }
}

/// A periodic background, resolved outside the bounds of the main grid
/// via `rem_euclid` in all three dimensions.
#[derive(Debug, Clone)]
pub struct BackgroundGrid {
    pub grid: Grid3<Lit>,
    pub ignore_transition: Grid3<bool>,
}

impl BackgroundGrid {
    /// Resolves a (possibly out-of-range, possibly negative) coordinate
    /// against the background's own period.
    pub fn resolve(&self, t: i64, y: i64, x: i64) -> Lit {
        let t = t.rem_euclid(self.grid.duration as i64) as usize;
        let y = y.rem_euclid(self.grid.height as i64) as usize;
        let x = x.rem_euclid(self.grid.width as i64) as usize;
        *self.grid.get(t, y, x)
    }
}

const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Resolves the 8 neighbours of `(x, y, t + t_offset)` in `grid`,
/// falling back to `background` for any neighbour outside `grid`'s
/// spatial bounds.
pub fn neighbours_from_coordinates(
    grid: &Grid3<Lit>,
    background: &BackgroundGrid,
    x: usize,
    y: usize,
    t: usize,
    t_offset: i64,
) -> [Lit; 8] {
    let mut out = [TRUE; 8];
    let nt = t as i64 + t_offset;
    for (i, (dx, dy)) in NEIGHBOUR_OFFSETS.iter().enumerate() {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        out[i] = if nx >= 0 && (nx as usize) < grid.width && ny >= 0 && (ny as usize) < grid.height {
            *grid.get(nt as usize, ny as usize, nx as usize)
        } else {
            background.resolve(nt, ny, nx)
        };
    }
    out
}

/// Resolves the 8 neighbours of a background cell against the
/// background's own period (used when folding redundant background
/// transitions).
pub fn neighbours_from_background(background: &BackgroundGrid, x: usize, y: usize, t: usize, t_offset: i64) -> [Lit; 8] {
    let nt = t as i64 + t_offset;
    let mut out = [TRUE; 8];
    for (i, (dx, dy)) in NEIGHBOUR_OFFSETS.iter().enumerate() {
        out[i] = background.resolve(nt, y as i64 + dy, x as i64 + dx);
    }
    out
}

/// Owns everything needed to build and constrain one search instance.
pub struct SearchPattern {
    pub grid: Grid3<Lit>,
    pub ignore_transition: Grid3<bool>,
    pub background: BackgroundGrid,
    pub rule: RuleTable,
    pub store: ClauseStore,
    pub cardinality: CardinalityCache,
    pub equalities: EqualityForest,
    pub scheme: TransitionScheme,
}

impl SearchPattern {
    /// Builds a search pattern from a parsed symbolic grid, a
    /// (possibly already variable-resolved) background, an
    /// already-built clause store (use [`ClauseStore::new`] so that any
    /// variables allocated while building `grid`/`background` line up
    /// with this crate's "variable 1 is true" convention), and a
    /// rulestring.
    pub fn new(
        grid: Grid3<Lit>,
        ignore_transition: Grid3<bool>,
        background: BackgroundGrid,
        mut store: ClauseStore,
        rulestring: &str,
        scheme: TransitionScheme,
    ) -> Result<Self, ErrorKind> {
        let rule = rules::rule_from_rulestring(rulestring, || store.fresh_variable())?;

        if scheme != TransitionScheme::Generic && !rules::is_life(&rule) {
            return Err(ErrorKind::UnsupportedRuleScheme(rulestring.to_string()));
        }

        Ok(SearchPattern {
            grid,
            ignore_transition,
            background,
            rule,
            store,
            cardinality: CardinalityCache::new(),
            equalities: EqualityForest::new(),
            scheme,
        })
    }

    /// Number of distinct non-constant cell variables across the
    /// (non-background) grid.
    pub fn number_of_cells(&self) -> usize {
        let mut vars: Vec<i64> = self
            .grid
            .iter_coords()
            .map(|(t, y, x)| *self.grid.get(t, y, x))
            .filter(|l| *l != TRUE && *l != FALSE)
            .map(|l| l.variable())
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars.len()
    }

    /// Whether the background carries any non-constant cell (i.e. is
    /// more than a flat dead/alive field), and is at least 2x2 so a
    /// border actually exists.
    pub fn background_nontrivial(&self) -> bool {
        self.background.grid.height > 1
            && self.background.grid.width > 1
            && self
                .background
                .grid
                .iter_coords()
                .any(|(t, y, x)| {
                    let cell = *self.background.grid.get(t, y, x);
                    cell != TRUE && cell != FALSE
                })
    }

    /// Emits the clauses forcing this instance to obey its evolution
    /// rule, for every non-initial foreground cell and every background
    /// cell not flagged to ignore its transition.
    pub fn force_evolution(&mut self) {
        log::info!(
            target: targets::TRANSITION,
            "Forcing evolution over a {}x{}x{} grid with {:?}",
            self.grid.width,
            self.grid.height,
            self.grid.duration,
            self.scheme
        );
        for t in 1..self.grid.duration {
            for y in 0..self.grid.height {
                for x in 0..self.grid.width {
                    if *self.ignore_transition.get(t, y, x) {
                        continue;
                    }
                    let predecessor = *self.grid.get(t - 1, y, x);
                    let neighbours =
                        neighbours_from_coordinates(&self.grid, &self.background, x, y, t, -1);
                    let cell = *self.grid.get(t, y, x);
                    transition::force_transition(
                        &mut self.store,
                        &mut self.cardinality,
                        &self.rule,
                        self.scheme,
                        predecessor,
                        neighbours,
                        cell,
                    );
                }
            }
        }

        for t in 0..self.background.grid.duration {
            for y in 0..self.background.grid.height {
                for x in 0..self.background.grid.width {
                    if *self.background.ignore_transition.get(t, y, x) {
                        continue;
                    }
                    let predecessor = self.background.resolve(t as i64 - 1, y as i64, x as i64);
                    let neighbours = neighbours_from_background(&self.background, x, y, t, -1);
                    let cell = *self.background.grid.get(t, y, x);
                    transition::force_transition(
                        &mut self.store,
                        &mut self.cardinality,
                        &self.rule,
                        self.scheme,
                        predecessor,
                        neighbours,
                        cell,
                    );
                }
            }
        }
    }

    /// Adds clauses forcing at least one cell to differ between
    /// generations `t0` and `t1`.
    pub fn force_change(&mut self, t0: usize, t1: usize) {
        log::debug!(target: targets::SYMMETRY, "Forcing a change between generations {t0} and {t1}");
        let mut pairs = Vec::new();
        for y in 0..self.grid.height {
            for x in 0..self.grid.width {
                pairs.push((*self.grid.get(t0, y, x), *self.grid.get(t1, y, x)));
            }
        }
        self.equalities.force_unequal(&mut self.store, &pairs);
    }

    /// Forces a symmetry: cells at `(x, y, t)` equal cells at
    /// `transform(x, y), t + period` (and the corresponding inverse
    /// mapping at the other end of the duration), wrapping against the
    /// background outside the grid.
    pub fn force_symmetry(
        &mut self,
        transform: Transform,
        dx: i64,
        dy: i64,
        period: i64,
    ) -> Result<(), SearchError> {
        let pairs = self.cell_pairs_from_transformation(transform, dx, dy, period);
        self.equalities.force_equal(&pairs)?;
        self.rewrite_through_equalities();
        Ok(())
    }

    /// Shorthand for [`SearchPattern::force_symmetry`] with
    /// [`Transform::Ro0`]: the pattern repeats itself, translated by
    /// `(dx, dy)`, every `period` generations.
    pub fn force_period(&mut self, period: i64, dx: i64, dy: i64) -> Result<(), SearchError> {
        log::debug!(target: targets::SYMMETRY, "Forcing period {period} with translation ({dx}, {dy})");
        self.force_symmetry(Transform::Ro0, dx, dy, period)
    }

    /// Forces an asymmetry: the cell pairs a [`force_symmetry`] call
    /// would equate are instead asserted not-all-equal.
    pub fn force_asymmetry(&mut self, transform: Transform, dx: i64, dy: i64, period: i64) {
        let pairs = self.cell_pairs_from_transformation(transform, dx, dy, period);
        self.equalities.force_unequal(&mut self.store, &pairs);
    }

    fn cell_pairs_from_transformation(
        &self,
        transform: Transform,
        dx: i64,
        dy: i64,
        period: i64,
    ) -> Vec<(Lit, Lit)> {
        let width = self.grid.width as i64;
        let height = self.grid.height as i64;
        let duration = self.grid.duration as i64;
        let mut pairs = Vec::new();

        for x0 in 0..width {
            for y0 in 0..height {
                for t in 0..duration {
                    let cell_0 = *self.grid.get(t as usize, y0 as usize, x0 as usize);

                    if t < duration - period {
                        let (x1, y1) = transform.forward(width, height, dx, dy, x0, y0);
                        let other = self.resolve_grid_or_background(x1, y1, t + period);
                        pairs.push((cell_0, other));
                    }
                    if t >= period {
                        let (x1, y1) = transform.inverse(width, height, dx, dy, x0, y0);
                        let other = self.resolve_grid_or_background(x1, y1, t - period);
                        pairs.push((cell_0, other));
                    }
                }
            }
        }
        pairs
    }

    fn resolve_grid_or_background(&self, x: i64, y: i64, t: i64) -> Lit {
        if x >= 0 && (x as usize) < self.grid.width && y >= 0 && (y as usize) < self.grid.height {
            *self.grid.get(t as usize, y as usize, x as usize)
        } else {
            self.background.resolve(t, y, x)
        }
    }

    /// Rewrites the grid, background, and rule table through the
    /// current equality substitutions. Cheap to call repeatedly: a
    /// no-op for any cell whose variable has no active substitution.
    pub(crate) fn rewrite_through_equalities(&mut self) {
        for (t, y, x) in self.grid.iter_coords() {
            let cell = *self.grid.get(t, y, x);
            let rewritten = self.equalities.rewrite(cell);
            if rewritten != cell {
                self.grid.set(t, y, x, rewritten);
            }
        }
        for (t, y, x) in self.background.grid.iter_coords() {
            let cell = *self.background.grid.get(t, y, x);
            let rewritten = self.equalities.rewrite(cell);
            if rewritten != cell {
                self.background.grid.set(t, y, x, rewritten);
            }
        }
        for lit in self.rule.values_mut() {
            *lit = self.equalities.rewrite(*lit);
        }
    }

    /// Two-sweep redundancy fold: first the background, then the
    /// foreground, coalescing cells with identical predecessor
    /// neighbourhoods to a single representative.
    pub fn remove_redundancies(&mut self) -> Result<(), SearchError> {
        redundancy::remove_redundancies(self)
    }

    pub fn force_population_at_least(&mut self, times: &[usize], population: i64) {
        let literals = self.population_literals(times);
        self.cardinality.force_at_least(&mut self.store, &literals, population);
    }

    pub fn force_population_at_most(&mut self, times: &[usize], population: i64) {
        let literals = self.population_literals(times);
        self.cardinality.force_at_most(&mut self.store, &literals, population);
    }

    pub fn force_population_exactly(&mut self, times: &[usize], population: i64) {
        let literals = self.population_literals(times);
        self.cardinality.force_exactly(&mut self.store, &literals, population);
    }

    fn population_literals(&self, times: &[usize]) -> Vec<Lit> {
        let mut literals = Vec::new();
        for &t in times {
            for y in 0..self.grid.height {
                for x in 0..self.grid.width {
                    literals.push(*self.grid.get(t, y, x));
                }
            }
        }
        literals
    }

    /// Forces that generation `t` differs from generation 0 in at most
    /// `bound` cells where `direction` selects growth (more live cells),
    /// decay (fewer live cells), or either ("change").
    pub fn force_max_delta(&mut self, bound: i64, direction: DeltaDirection) {
        for t in 1..self.grid.duration {
            let mut indicators = Vec::new();
            for y in 0..self.grid.height {
                for x in 0..self.grid.width {
                    let now = *self.grid.get(t, y, x);
                    let then = *self.grid.get(0, y, x);
                    let indicator = Lit::new(self.store.fresh_variable(), true);
                    match direction {
                        DeltaDirection::Growth => {
                            self.store.append(implies(&[now, then.negate()], indicator));
                        }
                        DeltaDirection::Decay => {
                            self.store.append(implies(&[now.negate(), then], indicator));
                        }
                        DeltaDirection::Change => {
                            self.store.append(implies(&[now, then.negate()], indicator));
                            self.store.append(implies(&[now.negate(), then], indicator));
                        }
                    }
                    indicators.push(indicator);
                }
            }
            self.cardinality.force_at_most(&mut self.store, &indicators, bound);
        }
    }

    /// Blocks a previously found solution (given as a raw solver
    /// literal assignment) from being found again. If `determined` is
    /// true, only generation 0 (plus background and rule variables)
    /// needs to differ, since the rest of the grid follows
    /// deterministically.
    pub fn force_distinct(&mut self, solution: &[i64], determined: bool) {
        let mut variables: Vec<i64> = Vec::new();
        for t in 0..self.grid.duration {
            if t == 0 || !determined {
                for y in 0..self.grid.height {
                    for x in 0..self.grid.width {
                        variables.push(self.grid.get(t, y, x).variable());
                    }
                }
            }
        }
        for (t, y, x) in self.background.grid.iter_coords() {
            variables.push(self.background.grid.get(t, y, x).variable());
        }
        for lit in self.rule.values() {
            variables.push(lit.variable());
        }
        variables.sort_unstable();
        variables.dedup();

        let blocking: Vec<Lit> = solution
            .iter()
            .filter(|l| variables.binary_search(&l.abs()).is_ok())
            .map(|l| Lit(-l))
            .collect();
        self.store.append(blocking);
    }

    /// Fixed-point pass determining whether generation 0 plus the rule
    /// and background fully determine every later generation.
    pub fn deterministic(&self) -> bool {
        let mut determined = Grid3::filled(self.grid.duration, self.grid.height, self.grid.width, false);
        let mut determined_vars: Vec<i64> = Vec::new();

        loop {
            let before = determined.clone();
            for t in 0..self.grid.duration {
                for y in 0..self.grid.height {
                    for x in 0..self.grid.width {
                        if *determined.get(t, y, x) {
                            continue;
                        }
                        let cell = *self.grid.get(t, y, x);
                        if cell == TRUE || cell == FALSE {
                            determined.set(t, y, x, true);
                            continue;
                        }
                        let variable = cell.variable();
                        if t == 0 {
                            determined.set(t, y, x, true);
                            determined_vars.push(variable);
                        } else if determined_vars.contains(&variable) {
                            determined.set(t, y, x, true);
                        } else {
                            // a cell's parents are its predecessor plus all
                            // 8 neighbours at t-1; a neighbour falling
                            // outside the grid resolves against the
                            // background, which never depends on
                            // generation 0 and so is always determined.
                            let mut all_parents_determined = *determined.get(t - 1, y, x);
                            for (dx, dy) in NEIGHBOUR_OFFSETS {
                                let nx = x as i64 + dx;
                                let ny = y as i64 + dy;
                                if nx >= 0
                                    && (nx as usize) < self.grid.width
                                    && ny >= 0
                                    && (ny as usize) < self.grid.height
                                    && !*determined.get(t - 1, ny as usize, nx as usize)
                                {
                                    all_parents_determined = false;
                                }
                            }
                            if all_parents_determined && !*self.ignore_transition.get(t, y, x) {
                                determined.set(t, y, x, true);
                                determined_vars.push(variable);
                            }
                        }
                    }
                }
            }
            if determined.iter_coords().all(|(t, y, x)| *determined.get(t, y, x) == *before.get(t, y, x)) {
                break;
            }
        }

        let result = determined.iter_coords().all(|(t, y, x)| *determined.get(t, y, x));
        log::debug!(target: targets::SYMMETRY, "deterministic() = {result}");
        result
    }

    /// Renders a solver's raw literal assignment back over the grid,
    /// producing one `CellState` per symbolic cell.
    pub fn substitute_solution(&self, solution: &[i64]) -> Grid3<CellState> {
        let mut valuation: HashMap<i64, bool> = HashMap::new();
        for lit in solution {
            valuation.insert(lit.abs(), *lit > 0);
        }
        let mut out = Grid3::filled(self.grid.duration, self.grid.height, self.grid.width, CellState::Dead);
        for (t, y, x) in self.grid.iter_coords() {
            let cell = *self.grid.get(t, y, x);
            let state = if cell == TRUE {
                CellState::Alive
            } else if cell == FALSE {
                CellState::Dead
            } else {
                let truth = valuation.get(&cell.variable()).copied().unwrap_or(false);
                if truth == cell.polarity() {
                    CellState::Alive
                } else {
                    CellState::Dead
                }
            };
            out.set(t, y, x, state);
        }
        out
    }
}

/// A resolved cell value after substituting a solver's model back over
/// the symbolic grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Alive,
    Dead,
}

/// Which direction of change a `force_max_*` constraint bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaDirection {
    Growth,
    Decay,
    Change,
}

/// A blank, all-free search pattern of the given dimensions: every
/// foreground cell is a fresh variable.
pub fn blank_search_pattern(
    width: usize,
    height: usize,
    duration: usize,
    background: BackgroundGrid,
    rulestring: &str,
    scheme: TransitionScheme,
) -> Result<SearchPattern, ErrorKind> {
    let mut store = ClauseStore::new();
    let mut cells = Vec::with_capacity(duration * height * width);
    for _ in 0..(duration * height * width) {
        cells.push(Lit::new(store.fresh_variable(), true));
    }
    let grid = Grid3 {
        duration,
        height,
        width,
        cells,
    };
    let ignore_transition = Grid3::filled(duration, height, width, false);
    SearchPattern::new(grid, ignore_transition, background, store, rulestring, scheme)
}

/// Resolves a parsed pattern-grid cell token into a literal, allocating
/// a fresh variable for `*` wildcards and interning named variables
/// densely.
pub fn resolve_cell(
    token: &str,
    names: &mut HashMap<String, i64>,
    store: &mut ClauseStore,
) -> Option<ParsedLiteral> {
    crate::literal::standard_form_literal(token, |name| {
        if name == "*" {
            store.fresh_variable()
        } else {
            *names.entry(name.to_string()).or_insert_with(|| store.fresh_variable())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TransitionScheme;

    fn flat_background(lit: Lit) -> BackgroundGrid {
        BackgroundGrid {
            grid: Grid3::filled(1, 1, 1, lit),
            ignore_transition: Grid3::filled(1, 1, 1, true),
        }
    }

    #[test]
    fn number_of_cells_ignores_constants() {
        let mut store = ClauseStore::new();
        let a = Lit::new(store.fresh_variable(), true);
        let mut grid = Grid3::filled(1, 1, 2, TRUE);
        grid.set(0, 0, 0, a);
        let ignore = Grid3::filled(1, 1, 2, true);
        let pattern = SearchPattern::new(
            grid,
            ignore,
            flat_background(FALSE),
            store,
            "B3/S23",
            TransitionScheme::Generic,
        )
        .unwrap();
        assert_eq!(pattern.number_of_cells(), 1);
    }

    #[test]
    fn background_nontrivial_detects_free_background_cells() {
        let mut store = ClauseStore::new();
        let free = Lit::new(store.fresh_variable(), true);
        let background = BackgroundGrid {
            grid: Grid3::filled(1, 2, 2, free),
            ignore_transition: Grid3::filled(1, 2, 2, false),
        };
        let grid = Grid3::filled(1, 1, 1, TRUE);
        let ignore = Grid3::filled(1, 1, 1, true);
        let pattern = SearchPattern::new(
            grid,
            ignore,
            background,
            store,
            "B3/S23",
            TransitionScheme::Generic,
        )
        .unwrap();
        assert!(pattern.background_nontrivial());
    }

    #[test]
    fn force_period_is_shorthand_for_ro0_symmetry() {
        let mut store = ClauseStore::new();
        let a = Lit::new(store.fresh_variable(), true);
        let b = Lit::new(store.fresh_variable(), true);
        let mut grid = Grid3::filled(2, 1, 1, TRUE);
        grid.set(0, 0, 0, a);
        grid.set(1, 0, 0, b);
        let ignore = Grid3::filled(2, 1, 1, true);
        let mut pattern = SearchPattern::new(
            grid,
            ignore,
            flat_background(FALSE),
            store,
            "B3/S23",
            TransitionScheme::Generic,
        )
        .unwrap();
        pattern.force_period(1, 0, 0).unwrap();
        assert_eq!(pattern.equalities.rewrite(a), pattern.equalities.rewrite(b));
    }

    #[test]
    fn taocp_scheme_rejects_a_non_life_rulestring() {
        let store = ClauseStore::new();
        let grid = Grid3::filled(1, 1, 1, TRUE);
        let ignore = Grid3::filled(1, 1, 1, true);
        let err = SearchPattern::new(
            grid,
            ignore,
            flat_background(FALSE),
            store,
            "B36/S23",
            TransitionScheme::Taocp,
        )
        .unwrap_err();
        assert!(matches!(err, ErrorKind::UnsupportedRuleScheme(_)));
    }

    #[test]
    fn deterministic_is_true_for_an_all_constant_still_life() {
        let store = ClauseStore::new();
        let grid = Grid3::filled(2, 1, 1, FALSE);
        let ignore = Grid3::filled(2, 1, 1, true);
        let pattern = SearchPattern::new(
            grid,
            ignore,
            flat_background(FALSE),
            store,
            "B3/S23",
            TransitionScheme::Generic,
        )
        .unwrap();
        assert!(pattern.deterministic());
    }
}
