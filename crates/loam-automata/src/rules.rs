//! Rule-language compiler: textual 3×3 patterns to concrete rules.
//!
//! Rule source is line-oriented. Blank lines and comment lines
//! (first non-space character `;`) are ignored; the remaining
//! effective lines must form blocks of exactly three. A block encodes
//! one or more 3×3 neighborhood patterns side by side, row-major, with
//! one extra trailing term on the middle line: the result symbol every
//! pattern of the block shares.
//!
//! ```text
//! ; an empty cell with water above it fills
//! ? ~ ?
//! ? . ? ~
//! ? ? ?
//! ```
//!
//! A term is a bare tile symbol, the wildcard marker, a negated symbol
//! `!x`, a bracket group `[x y]` (any listed symbol), or a negated
//! bracket `![x y]` (any tile *not* listed). Positive bracket groups
//! expand into the cartesian product of their members; negated groups
//! compile to a single complement matcher.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, TileId};
use crate::error::CompileError;

/// Lines starting with this character (after leading whitespace) are
/// comments.
pub const COMMENT_MARKER: char = ';';

/// A compiled matcher for one neighborhood slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Slot {
    /// Matches any tile.
    Any,
    /// Matches exactly one tile.
    Is(TileId),
    /// Matches any tile not in the list. The wildcard never appears
    /// as an observed value, so it is excluded implicitly.
    Not(Vec<TileId>),
}

impl Slot {
    fn matches(&self, observed: TileId) -> bool {
        match self {
            Slot::Any => true,
            Slot::Is(id) => *id == observed,
            Slot::Not(ids) => !ids.contains(&observed),
        }
    }
}

/// A fully concrete 3×3 neighborhood pattern.
///
/// Slots are row-major: NW, N, NE, W, C, E, SW, S, SE.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pattern {
    slots: [Slot; 9],
}

impl Pattern {
    /// Positional match against an observed neighborhood in the same
    /// slot order.
    pub fn matches(&self, neighborhood: &[TileId; 9]) -> bool {
        self.slots
            .iter()
            .zip(neighborhood)
            .all(|(slot, &tile)| slot.matches(tile))
    }

    /// The slots of this pattern, row-major.
    pub fn slots(&self) -> &[Slot; 9] {
        &self.slots
    }
}

/// A transition rule: a pattern and the tile a matching cell becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    pattern: Pattern,
    result: TileId,
}

impl Rule {
    /// The neighborhood pattern this rule requires.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The tile a matching cell becomes.
    pub fn result(&self) -> TileId {
        self.result
    }
}

/// An ordered, immutable rule list. The first rule whose pattern
/// matches a cell's neighborhood determines that cell's next tile;
/// order is preserved exactly as compiled, with no deduplication.
///
/// A `RuleSet` is read-only after compilation and can be shared by
/// reference across any number of grids.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compiles rule source text against an alphabet.
    ///
    /// Compilation is all-or-nothing: any error aborts the whole set.
    pub fn compile(alphabet: &Alphabet, source: &str) -> Result<RuleSet, CompileError> {
        let effective: Vec<(usize, &str)> = source
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
            .collect();

        if effective.len() % 3 != 0 {
            let line = effective.last().map(|&(n, _)| n).unwrap_or(0);
            return Err(CompileError::MalformedRuleBlock {
                line,
                reason: "effective line count is not a multiple of three".to_string(),
            });
        }

        let mut rules = Vec::new();
        for block in effective.chunks(3) {
            compile_block(alphabet, block, &mut rules)?;
        }
        Ok(RuleSet { rules })
    }

    /// The compiled rules, in source order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of concrete rules after expansion.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rules were compiled.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A parsed term: either already concrete, or a positive bracket group
/// still awaiting expansion.
#[derive(Debug, Clone)]
enum Term {
    Slot(Slot),
    OneOf(Vec<Slot>),
}

fn compile_block(
    alphabet: &Alphabet,
    block: &[(usize, &str)],
    rules: &mut Vec<Rule>,
) -> Result<(), CompileError> {
    let (line1, raw_top) = block[0];
    let (line2, raw_middle) = block[1];
    let (line3, raw_bottom) = block[2];

    let top = tokenize(alphabet, raw_top, line1)?;
    let mut middle = tokenize(alphabet, raw_middle, line2)?;
    let bottom = tokenize(alphabet, raw_bottom, line3)?;

    if top.is_empty() || top.len() % 3 != 0 {
        return Err(CompileError::MalformedRuleBlock {
            line: line1,
            reason: format!(
                "term count must be a positive multiple of three, found {}",
                top.len()
            ),
        });
    }
    if middle.len() != top.len() + 1 {
        return Err(CompileError::MalformedRuleBlock {
            line: line2,
            reason: format!(
                "expected {} terms (line {} plus a result symbol), found {}",
                top.len() + 1,
                line1,
                middle.len()
            ),
        });
    }
    if bottom.len() != top.len() {
        return Err(CompileError::MalformedRuleBlock {
            line: line3,
            reason: format!(
                "expected {} terms (matching line {}), found {}",
                top.len(),
                line1,
                bottom.len()
            ),
        });
    }

    let result = match middle.pop() {
        Some(Term::Slot(Slot::Is(id))) => id,
        _ => {
            return Err(CompileError::MalformedRuleBlock {
                line: line2,
                reason: "result must be a single concrete symbol".to_string(),
            });
        }
    };

    // One 3×3 neighborhood per three-term column group, left to right.
    for j in 0..top.len() / 3 {
        let terms: Vec<Term> = top[3 * j..3 * j + 3]
            .iter()
            .chain(&middle[3 * j..3 * j + 3])
            .chain(&bottom[3 * j..3 * j + 3])
            .cloned()
            .collect();
        for slots in expand(&terms) {
            rules.push(Rule {
                pattern: Pattern { slots },
                result,
            });
        }
    }
    Ok(())
}

/// Expands the first positive bracket group (scanning slots row-major)
/// into one copy per member, recursing until every slot is concrete.
/// Pure: builds new term lists instead of mutating shared state, so a
/// block with bracket groups of sizes m and n yields m×n patterns in
/// member-declaration order.
fn expand(terms: &[Term]) -> Vec<[Slot; 9]> {
    debug_assert_eq!(terms.len(), 9);

    match terms.iter().position(|t| matches!(t, Term::OneOf(_))) {
        Some(i) => {
            let members = match &terms[i] {
                Term::OneOf(members) => members.clone(),
                Term::Slot(_) => Vec::new(),
            };
            let mut out = Vec::new();
            for member in members {
                let mut next = terms.to_vec();
                next[i] = Term::Slot(member);
                out.extend(expand(&next));
            }
            out
        }
        None => {
            // No groups remain; every term is a concrete slot.
            let slots = std::array::from_fn(|i| match &terms[i] {
                Term::Slot(slot) => slot.clone(),
                Term::OneOf(_) => Slot::Any,
            });
            vec![slots]
        }
    }
}

/// Splits a line into terms, reassembling bracket groups that
/// whitespace tokenization tore apart (`[`, `a b`, `c]`).
fn tokenize(alphabet: &Alphabet, line: &str, line_no: usize) -> Result<Vec<Term>, CompileError> {
    let mut terms = Vec::new();
    // Open bracket group: negation flag plus members collected so far.
    let mut bracket: Option<(bool, Vec<TileId>)> = None;

    for raw in line.split_whitespace() {
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            if let Some((negated, members)) = bracket.as_mut() {
                match c {
                    ']' => {
                        if members.is_empty() {
                            return Err(CompileError::EmptyBracket { line: line_no });
                        }
                        let negated = *negated;
                        let members = std::mem::take(members);
                        bracket = None;
                        terms.push(if negated {
                            Term::Slot(Slot::Not(members))
                        } else {
                            Term::OneOf(
                                members
                                    .into_iter()
                                    .map(|id| slot_for(alphabet, id))
                                    .collect(),
                            )
                        });
                    }
                    '[' | '!' => {
                        return Err(CompileError::MalformedRuleBlock {
                            line: line_no,
                            reason: format!("unexpected '{c}' inside bracket group"),
                        });
                    }
                    symbol => {
                        let id = resolve(alphabet, symbol, line_no)?;
                        if *negated && alphabet.wildcard() == Some(id) {
                            return Err(CompileError::NegatedWildcard { line: line_no });
                        }
                        members.push(id);
                    }
                }
            } else {
                match c {
                    '[' => bracket = Some((false, Vec::new())),
                    ']' => return Err(CompileError::UnterminatedBracket { line: line_no }),
                    '!' => match chars.next() {
                        Some('[') => bracket = Some((true, Vec::new())),
                        Some(symbol) if symbol != ']' => {
                            let id = resolve(alphabet, symbol, line_no)?;
                            if alphabet.wildcard() == Some(id) {
                                return Err(CompileError::NegatedWildcard { line: line_no });
                            }
                            terms.push(Term::Slot(Slot::Not(vec![id])));
                            expect_term_end(&mut chars, raw, line_no)?;
                        }
                        _ => {
                            return Err(CompileError::MalformedRuleBlock {
                                line: line_no,
                                reason: format!("dangling negation in \"{raw}\""),
                            });
                        }
                    },
                    symbol => {
                        let id = resolve(alphabet, symbol, line_no)?;
                        terms.push(Term::Slot(slot_for(alphabet, id)));
                        expect_term_end(&mut chars, raw, line_no)?;
                    }
                }
            }
        }
    }

    if bracket.is_some() {
        return Err(CompileError::UnterminatedBracket { line: line_no });
    }
    Ok(terms)
}

/// A bare term outside a bracket group must end its token; characters
/// glued onto it do not start a second term.
fn expect_term_end(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    raw: &str,
    line_no: usize,
) -> Result<(), CompileError> {
    if chars.peek().is_some() {
        return Err(CompileError::MalformedRuleBlock {
            line: line_no,
            reason: format!("invalid term \"{raw}\""),
        });
    }
    Ok(())
}

fn resolve(alphabet: &Alphabet, symbol: char, line_no: usize) -> Result<TileId, CompileError> {
    alphabet.lookup(symbol).map_err(|_| CompileError::UnknownSymbol {
        symbol,
        line: line_no,
    })
}

fn slot_for(alphabet: &Alphabet, id: TileId) -> Slot {
    if alphabet.wildcard() == Some(id) {
        Slot::Any
    } else {
        Slot::Is(id)
    }
}
