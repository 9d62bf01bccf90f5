//! Error types for alphabets, rule compilation, and grids.

use thiserror::Error;

/// Errors produced by rule-source compilation.
///
/// Compilation is all-or-nothing: the first error aborts the whole rule
/// set and no partial list is ever returned. Line numbers are 1-based
/// positions in the original source text, counting blank and comment
/// lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A rule block's lines have inconsistent term counts, the
    /// effective line count is not a multiple of three, or a term is
    /// structurally invalid where a concrete one is required.
    #[error("malformed rule block at line {line}: {reason}")]
    MalformedRuleBlock { line: usize, reason: String },

    /// A bracket group was opened but never closed, or a stray `]`
    /// appeared outside any group.
    #[error("unterminated bracket at line {line}")]
    UnterminatedBracket { line: usize },

    /// A bracket group with no member symbols.
    #[error("empty bracket at line {line}")]
    EmptyBracket { line: usize },

    /// Negation applied to the wildcard marker. The wildcard already
    /// matches everything; its complement matches nothing.
    #[error("negated wildcard at line {line}")]
    NegatedWildcard { line: usize },

    /// A term or result symbol not present in the alphabet.
    #[error("unknown symbol '{symbol}' at line {line}")]
    UnknownSymbol { symbol: char, line: usize },
}

/// Errors from alphabet registration and grid operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomataError {
    /// The symbol is already registered, or a second wildcard was
    /// requested.
    #[error("duplicate symbol '{0}'")]
    DuplicateSymbol(char),

    /// The symbol is not registered in the alphabet.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(char),

    /// Grid coordinates outside the current dimensions.
    #[error("position ({x}, {y}) out of bounds")]
    OutOfBounds { x: usize, y: usize },

    /// The wildcard belongs in rule patterns only, never in a grid
    /// cell or as the boundary tile.
    #[error("wildcard '{0}' cannot be placed in a grid")]
    WildcardInGrid(char),

    /// An operation needed the designated empty tile but the alphabet
    /// has none.
    #[error("alphabet has no empty tile")]
    NoEmptyTile,
}
