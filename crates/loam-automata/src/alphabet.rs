//! Tile alphabet: the registry mapping symbols to tile identities.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::AutomataError;

/// Identifies a tile within the [`Alphabet`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileId(u16);

impl TileId {
    /// The raw index of this tile in its alphabet.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An immutable cell state: a one-character symbol, a display glyph,
/// and a style tag for an external renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tile {
    symbol: char,
    display: char,
    style: String,
    wildcard: bool,
}

impl Tile {
    /// The symbol identifying this tile in map and rule text.
    pub fn symbol(&self) -> char {
        self.symbol
    }

    /// The glyph a renderer should draw for this tile.
    pub fn display(&self) -> char {
        self.display
    }

    /// The style/category tag (e.g. "water", "wall").
    pub fn style(&self) -> &str {
        &self.style
    }

    /// True for the alphabet's any-match tile.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Pattern matching between tiles. The wildcard matches every
    /// tile; any other tile matches only itself. The asymmetry
    /// matters: a concrete tile does not match the wildcard, which
    /// only ever appears on the pattern side.
    pub fn matches(&self, observed: &Tile) -> bool {
        self.wildcard || self.symbol == observed.symbol
    }
}

/// A fixed registry mapping one-character symbols to tile identities.
///
/// Built once at startup and passed by reference into rule compilation
/// and grid construction; there is no global registry. At most one
/// tile is the wildcard, and one tile may be designated "empty" — the
/// tile that blank map cells alias to.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alphabet {
    tiles: Vec<Tile>,
    by_symbol: HashMap<char, TileId>,
    wildcard: Option<TileId>,
    empty: Option<TileId>,
}

impl Alphabet {
    /// Creates an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a concrete tile. Fails if the symbol is taken.
    pub fn register(
        &mut self,
        symbol: char,
        display: char,
        style: &str,
    ) -> Result<TileId, AutomataError> {
        self.insert(Tile {
            symbol,
            display,
            style: style.to_string(),
            wildcard: false,
        })
    }

    /// Registers the any-match tile. Fails if the symbol is taken or a
    /// wildcard already exists.
    pub fn register_wildcard(&mut self, symbol: char) -> Result<TileId, AutomataError> {
        if self.wildcard.is_some() {
            return Err(AutomataError::DuplicateSymbol(symbol));
        }
        let id = self.insert(Tile {
            symbol,
            display: symbol,
            style: "any".to_string(),
            wildcard: true,
        })?;
        self.wildcard = Some(id);
        Ok(id)
    }

    fn insert(&mut self, tile: Tile) -> Result<TileId, AutomataError> {
        if self.by_symbol.contains_key(&tile.symbol) {
            return Err(AutomataError::DuplicateSymbol(tile.symbol));
        }
        let id = TileId(self.tiles.len() as u16);
        self.by_symbol.insert(tile.symbol, id);
        self.tiles.push(tile);
        Ok(id)
    }

    /// Designates which tile blank map cells alias to. The tile must
    /// already be registered and must not be the wildcard.
    pub fn set_empty(&mut self, symbol: char) -> Result<(), AutomataError> {
        let id = self.lookup(symbol)?;
        if self.wildcard == Some(id) {
            return Err(AutomataError::WildcardInGrid(symbol));
        }
        self.empty = Some(id);
        Ok(())
    }

    /// Looks up a tile by symbol.
    pub fn lookup(&self, symbol: char) -> Result<TileId, AutomataError> {
        self.by_symbol
            .get(&symbol)
            .copied()
            .ok_or(AutomataError::UnknownSymbol(symbol))
    }

    /// The any-match tile, if one is registered.
    pub fn wildcard(&self) -> Option<TileId> {
        self.wildcard
    }

    /// The designated empty tile, if one is set.
    pub fn empty(&self) -> Option<TileId> {
        self.empty
    }

    /// The tile behind an id issued by this alphabet.
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.index()]
    }

    /// The symbol of a tile by id.
    pub fn symbol(&self, id: TileId) -> char {
        self.tiles[id.index()].symbol
    }

    /// Number of registered tiles, the wildcard included.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterates over registered tiles with their ids, in registration
    /// order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (TileId(i as u16), t))
    }
}
