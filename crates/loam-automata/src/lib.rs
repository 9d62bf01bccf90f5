//! Rule-driven 2D tile automata.
//!
//! A cellular automaton whose transition function is not hard-coded
//! but compiled from a small textual rule language: each cell's next
//! tile is decided by matching its 3×3 neighborhood against an ordered
//! list of patterns, first match wins. Patterns support wildcard
//! slots, negated symbols, and bracket groups that expand into the
//! cartesian product of their members.
//!
//! Three pieces:
//!
//! - [`Alphabet`] — the registry mapping one-character symbols to tile
//!   identities, including the pattern-only wildcard.
//! - [`RuleSet`] — the rule compiler and the compiled, ordered rule
//!   list.
//! - [`Grid`] — the double-buffered grid engine: stepping, painting,
//!   map text in and out.
//!
//! # Example
//!
//! ```
//! use loam_automata::{Alphabet, Grid, RuleSet};
//!
//! let mut alphabet = Alphabet::new();
//! alphabet.register('.', ' ', "empty")?;
//! alphabet.register('~', '~', "water")?;
//! alphabet.register_wildcard('?')?;
//! alphabet.set_empty('.')?;
//!
//! // an empty cell with water above it fills
//! let rules = RuleSet::compile(
//!     &alphabet,
//!     "? ~ ?\n\
//!      ? . ? ~\n\
//!      ? ? ?",
//! )?;
//!
//! let mut grid = Grid::from_text(&alphabet, "~\n.")?;
//! grid.step(&rules);
//! assert_eq!(grid.serialize(), "~\n~");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod alphabet;
mod error;
mod grid;
pub mod presets;
mod rules;

pub use alphabet::{Alphabet, Tile, TileId};
pub use error::{AutomataError, CompileError};
pub use grid::Grid;
pub use rules::{COMMENT_MARKER, Pattern, Rule, RuleSet, Slot};
