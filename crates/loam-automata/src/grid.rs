//! Double-buffered tile grid and the rule-driven stepping engine.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, Tile, TileId};
use crate::error::AutomataError;
use crate::rules::RuleSet;

/// Moore neighborhood offsets in pattern slot order, row-major:
/// NW, N, NE, W, C, E, SW, S, SE.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A fixed-size rectangular grid of tiles, advanced one generation at
/// a time by matching each cell's 3×3 neighborhood against a
/// [`RuleSet`].
///
/// The grid keeps two owned buffers and an index flag marking which is
/// current; a step writes the coming generation into the off buffer
/// and flips the flag, so the swap is O(1) and a partially evaluated
/// generation is never observable. Out-of-bounds neighbor reads
/// resolve to a configurable boundary tile (the empty tile by default,
/// conventionally reconfigured to wall).
///
/// `step`, `set_cell`, and the reset operations take `&mut self`:
/// exclusive borrows are what serializes ticks and painting, so no
/// runtime busy/in-flight state exists.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    alphabet: Alphabet,
    width: usize,
    height: usize,
    buffers: [Vec<TileId>; 2],
    current: usize,
    boundary: TileId,
}

impl Grid {
    /// Builds a grid from map text: one line per row, trailing
    /// whitespace stripped, width = the longest line. Cells beyond a
    /// short line and literal space characters both map to the
    /// alphabet's empty tile.
    pub fn from_text(alphabet: &Alphabet, text: &str) -> Result<Self, AutomataError> {
        let empty = alphabet.empty().ok_or(AutomataError::NoEmptyTile)?;
        let lines: Vec<&str> = text.lines().map(|line| line.trim_end()).collect();
        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        let mut cells = vec![empty; width * height];
        for (y, line) in lines.iter().enumerate() {
            for (x, c) in line.chars().enumerate() {
                if c == ' ' {
                    continue;
                }
                let id = alphabet.lookup(c)?;
                if alphabet.wildcard() == Some(id) {
                    return Err(AutomataError::WildcardInGrid(c));
                }
                cells[y * width + x] = id;
            }
        }
        Ok(Self::from_cells(alphabet.clone(), width, height, cells, empty))
    }

    /// Builds an all-empty grid of the given dimensions.
    pub fn blank(alphabet: &Alphabet, width: usize, height: usize) -> Result<Self, AutomataError> {
        let empty = alphabet.empty().ok_or(AutomataError::NoEmptyTile)?;
        let cells = vec![empty; width * height];
        Ok(Self::from_cells(alphabet.clone(), width, height, cells, empty))
    }

    fn from_cells(
        alphabet: Alphabet,
        width: usize,
        height: usize,
        cells: Vec<TileId>,
        boundary: TileId,
    ) -> Self {
        let spare = cells.clone();
        Self {
            alphabet,
            width,
            height,
            buffers: [cells, spare],
            current: 0,
            boundary,
        }
    }

    /// Sets the boundary tile and returns the grid, for construction
    /// chains.
    pub fn with_boundary(mut self, symbol: char) -> Result<Self, AutomataError> {
        self.set_boundary(symbol)?;
        Ok(self)
    }

    /// Reconfigures the tile substituted for out-of-bounds neighbor
    /// reads.
    pub fn set_boundary(&mut self, symbol: char) -> Result<(), AutomataError> {
        let id = self.alphabet.lookup(symbol)?;
        if self.alphabet.wildcard() == Some(id) {
            return Err(AutomataError::WildcardInGrid(symbol));
        }
        self.boundary = id;
        Ok(())
    }

    /// The tile surrounding the grid.
    pub fn boundary(&self) -> &Tile {
        self.alphabet.tile(self.boundary)
    }

    /// The alphabet this grid was built against.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Advances the grid by exactly one generation.
    ///
    /// The coming generation starts as a wholesale copy of the current
    /// one; each cell is then evaluated in raster order against the
    /// rule list, first match wins, and the result lands in the off
    /// buffer. Neighborhoods are always read from the pre-step
    /// snapshot, so no cell's update can observe another cell's update
    /// from the same generation. Cells no rule matches keep their
    /// tile.
    pub fn step(&mut self, rules: &RuleSet) {
        let width = self.width;
        let height = self.height;
        let boundary = self.boundary;

        let [first, second] = &mut self.buffers;
        let (cur, next) = if self.current == 0 {
            (&*first, second)
        } else {
            (&*second, first)
        };
        next.copy_from_slice(cur);

        for y in 0..height {
            for x in 0..width {
                let mut neighborhood = [boundary; 9];
                for (slot, &(dx, dy)) in neighborhood.iter_mut().zip(&NEIGHBOR_OFFSETS) {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                        *slot = cur[ny as usize * width + nx as usize];
                    }
                }
                for rule in rules.rules() {
                    if rule.pattern().matches(&neighborhood) {
                        next[y * width + x] = rule.result();
                        break;
                    }
                }
            }
        }

        self.current ^= 1;
    }

    /// Advances multiple generations.
    pub fn steps(&mut self, n: usize, rules: &RuleSet) {
        for _ in 0..n {
            self.step(rules);
        }
    }

    /// Overwrites one cell of the current generation directly,
    /// bypassing rule evaluation (brush painting).
    pub fn set_cell(&mut self, x: usize, y: usize, symbol: char) -> Result<(), AutomataError> {
        if x >= self.width || y >= self.height {
            return Err(AutomataError::OutOfBounds { x, y });
        }
        let id = self.alphabet.lookup(symbol)?;
        if self.alphabet.wildcard() == Some(id) {
            return Err(AutomataError::WildcardInGrid(symbol));
        }
        let idx = y * self.width + x;
        self.buffers[self.current][idx] = id;
        Ok(())
    }

    /// The tile at a position, or `None` out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let id = self.buffers[self.current][y * self.width + x];
        Some(self.alphabet.tile(id))
    }

    /// The symbol at a position, or `None` out of bounds.
    pub fn symbol_at(&self, x: usize, y: usize) -> Option<char> {
        self.get(x, y).map(Tile::symbol)
    }

    /// Read-only raster-order iteration over every cell, for
    /// renderers.
    pub fn for_each_cell(&self, mut f: impl FnMut(usize, usize, &Tile)) {
        let cur = &self.buffers[self.current];
        for y in 0..self.height {
            for x in 0..self.width {
                f(x, y, self.alphabet.tile(cur[y * self.width + x]));
            }
        }
    }

    /// Counts cells holding the tile with the given symbol. Unknown
    /// symbols count zero.
    pub fn count(&self, symbol: char) -> usize {
        match self.alphabet.lookup(symbol) {
            Ok(id) => self.buffers[self.current]
                .iter()
                .filter(|&&cell| cell == id)
                .count(),
            Err(_) => 0,
        }
    }

    /// Renders the current generation as map text: one line per row of
    /// canonical tile symbols. Inverse of [`Grid::from_text`] for maps
    /// written with canonical symbols; space cells normalize to the
    /// empty tile's symbol.
    pub fn serialize(&self) -> String {
        let cur = &self.buffers[self.current];
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..self.width {
                out.push(self.alphabet.symbol(cur[y * self.width + x]));
            }
        }
        out
    }

    /// Replaces contents and dimensions from map text, discarding all
    /// prior state. The configured boundary tile is retained. On error
    /// the grid is left untouched.
    pub fn reset_from_text(&mut self, text: &str) -> Result<(), AutomataError> {
        let mut fresh = Grid::from_text(&self.alphabet, text)?;
        fresh.boundary = self.boundary;
        *self = fresh;
        Ok(())
    }

    /// Replaces the grid with a blank one of new dimensions, keeping
    /// the configured boundary tile.
    pub fn reset_blank(&mut self, width: usize, height: usize) -> Result<(), AutomataError> {
        let mut fresh = Grid::blank(&self.alphabet, width, height)?;
        fresh.boundary = self.boundary;
        *self = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_alphabet() -> Alphabet {
        let mut alphabet = Alphabet::new();
        alphabet.register('.', ' ', "empty").unwrap();
        alphabet.register('~', '~', "water").unwrap();
        alphabet.register('v', '~', "water").unwrap();
        alphabet.register('#', '#', "wall").unwrap();
        alphabet.register_wildcard('?').unwrap();
        alphabet.set_empty('.').unwrap();
        alphabet
    }

    fn compile(alphabet: &Alphabet, source: &str) -> RuleSet {
        RuleSet::compile(alphabet, source).unwrap()
    }

    #[test]
    fn test_from_text_dimensions_and_padding() {
        let alphabet = water_alphabet();
        // Second line is shorter; width comes from the longest line.
        let grid = Grid::from_text(&alphabet, "~~~\n#").unwrap();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.symbol_at(0, 1), Some('#'));
        assert_eq!(grid.symbol_at(1, 1), Some('.'));
        assert_eq!(grid.symbol_at(2, 1), Some('.'));
    }

    #[test]
    fn test_space_maps_to_empty() {
        let alphabet = water_alphabet();
        let grid = Grid::from_text(&alphabet, "# #\n#~#").unwrap();
        assert_eq!(grid.symbol_at(1, 0), Some('.'));
        assert_eq!(grid.symbol_at(1, 1), Some('~'));
    }

    #[test]
    fn test_from_text_rejects_unknown_and_wildcard() {
        let alphabet = water_alphabet();
        assert_eq!(
            Grid::from_text(&alphabet, "x").unwrap_err(),
            AutomataError::UnknownSymbol('x')
        );
        assert_eq!(
            Grid::from_text(&alphabet, "?").unwrap_err(),
            AutomataError::WildcardInGrid('?')
        );
    }

    #[test]
    fn test_from_text_requires_empty_tile() {
        let mut alphabet = Alphabet::new();
        alphabet.register('#', '#', "wall").unwrap();
        assert_eq!(
            Grid::from_text(&alphabet, "#").unwrap_err(),
            AutomataError::NoEmptyTile
        );
    }

    #[test]
    fn test_blank_grid() {
        let alphabet = water_alphabet();
        let grid = Grid::blank(&alphabet, 4, 3).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.count('.'), 12);
    }

    #[test]
    fn test_serialize_round_trip() {
        let alphabet = water_alphabet();
        let text = "..~~\n#..#\n####";
        let grid = Grid::from_text(&alphabet, text).unwrap();
        assert_eq!(grid.serialize(), text);
    }

    #[test]
    fn test_set_cell() {
        let alphabet = water_alphabet();
        let mut grid = Grid::blank(&alphabet, 2, 2).unwrap();

        grid.set_cell(1, 1, '~').unwrap();
        assert_eq!(grid.symbol_at(1, 1), Some('~'));

        assert_eq!(
            grid.set_cell(2, 0, '~').unwrap_err(),
            AutomataError::OutOfBounds { x: 2, y: 0 }
        );
        assert_eq!(
            grid.set_cell(0, 0, '?').unwrap_err(),
            AutomataError::WildcardInGrid('?')
        );
    }

    #[test]
    fn test_step_moves_water_down_one_row_per_generation() {
        let alphabet = water_alphabet();
        // Water falls: a cell below water fills, a water cell above
        // emptiness drains.
        let rules = compile(
            &alphabet,
            "? ~ ?\n\
             ? . ? ~\n\
             ? ? ?\n\
             \n\
             ? ? ?\n\
             ? ~ ? .\n\
             ? . ?",
        );

        let mut grid = Grid::from_text(&alphabet, "~\n.\n.").unwrap();

        grid.step(&rules);
        // One row per step: the snapshot rule keeps the middle cell's
        // fill from cascading further down within the same pass.
        assert_eq!(grid.serialize(), ".\n~\n.");

        grid.step(&rules);
        assert_eq!(grid.serialize(), ".\n.\n~");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let alphabet = water_alphabet();
        // Both rules match a lone water cell; the first one listed is
        // the one that applies.
        let rules = compile(
            &alphabet,
            "? ? ?\n\
             ? ~ ? #\n\
             ? ? ?\n\
             \n\
             ? ? ?\n\
             ? ~ ? v\n\
             ? ? ?",
        );

        let mut grid = Grid::from_text(&alphabet, "~").unwrap();
        grid.step(&rules);
        assert_eq!(grid.serialize(), "#");
    }

    #[test]
    fn test_unmatched_cells_are_unchanged() {
        let alphabet = water_alphabet();
        let rules = compile(&alphabet, "? ? ?\n? ~ ? #\n? ? ?");

        let mut grid = Grid::from_text(&alphabet, ".#.").unwrap();
        grid.step(&rules);
        assert_eq!(grid.serialize(), ".#.");
    }

    #[test]
    fn test_empty_ruleset_is_identity() {
        let alphabet = water_alphabet();
        let rules = compile(&alphabet, "");

        let mut grid = Grid::from_text(&alphabet, "~#.").unwrap();
        grid.step(&rules);
        assert_eq!(grid.serialize(), "~#.");
    }

    #[test]
    fn test_corner_sees_boundary_in_all_offgrid_slots() {
        let alphabet = water_alphabet();
        // Matches only when every neighbor of the lone cell, corners
        // included, is the wall boundary.
        let rules = compile(
            &alphabet,
            "# # #\n\
             # . # ~\n\
             # # #",
        );

        let mut grid = Grid::from_text(&alphabet, ".").unwrap().with_boundary('#').unwrap();
        grid.step(&rules);
        assert_eq!(grid.serialize(), "~");
    }

    #[test]
    fn test_boundary_change_affects_edge_cells_only() {
        let alphabet = water_alphabet();
        // A cell becomes water when a wall is directly north of it.
        let rules = compile(
            &alphabet,
            "? # ?\n\
             ? . ? ~\n\
             ? ? ?",
        );

        let mut walled = Grid::blank(&alphabet, 3, 3).unwrap().with_boundary('#').unwrap();
        walled.step(&rules);
        // Top row sees the wall boundary to its north; inner rows see
        // ordinary empty cells and stay unchanged.
        assert_eq!(walled.serialize(), "~~~\n...\n...");

        let mut open = Grid::blank(&alphabet, 3, 3).unwrap();
        open.step(&rules);
        assert_eq!(open.serialize(), "...\n...\n...");
    }

    #[test]
    fn test_water_column_reaches_fixed_point() {
        let alphabet = water_alphabet();
        // Empty over water fills; with a wall boundary nothing drains
        // out, so a full column is stable.
        let rules = compile(
            &alphabet,
            "? ? ?\n\
             ? . ? ~\n\
             ? ~ ?",
        );

        let mut grid = Grid::from_text(&alphabet, ".\n~").unwrap().with_boundary('#').unwrap();
        grid.step(&rules);
        assert_eq!(grid.serialize(), "~\n~");

        grid.step(&rules);
        assert_eq!(grid.serialize(), "~\n~");
    }

    #[test]
    fn test_steps_convenience() {
        let alphabet = water_alphabet();
        let rules = compile(
            &alphabet,
            "? ~ ?\n\
             ? . ? ~\n\
             ? ? ?\n\
             \n\
             ? ? ?\n\
             ? ~ ? .\n\
             ? . ?",
        );

        let mut grid = Grid::from_text(&alphabet, "~\n.\n.\n.").unwrap();
        grid.steps(3, &rules);
        assert_eq!(grid.serialize(), ".\n.\n.\n~");
    }

    #[test]
    fn test_for_each_cell_raster_order() {
        let alphabet = water_alphabet();
        let grid = Grid::from_text(&alphabet, "~#\n.~").unwrap();

        let mut seen = Vec::new();
        grid.for_each_cell(|x, y, tile| seen.push((x, y, tile.symbol())));
        assert_eq!(
            seen,
            vec![(0, 0, '~'), (1, 0, '#'), (0, 1, '.'), (1, 1, '~')]
        );
    }

    #[test]
    fn test_reset_replaces_dimensions_and_keeps_boundary() {
        let alphabet = water_alphabet();
        let mut grid = Grid::blank(&alphabet, 2, 2).unwrap().with_boundary('#').unwrap();

        grid.reset_from_text("~~~\n...").unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.boundary().symbol(), '#');

        grid.reset_blank(1, 4).unwrap();
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.count('.'), 4);
        assert_eq!(grid.boundary().symbol(), '#');
    }

    #[test]
    fn test_reset_error_leaves_grid_untouched() {
        let alphabet = water_alphabet();
        let mut grid = Grid::from_text(&alphabet, "~#").unwrap();

        assert!(grid.reset_from_text("x").is_err());
        assert_eq!(grid.serialize(), "~#");
    }
}
