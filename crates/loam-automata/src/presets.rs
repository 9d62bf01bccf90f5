//! Ready-made content: the falling-water tile set, rule script, and a
//! demo map.

use crate::alphabet::Alphabet;
use crate::error::AutomataError;

/// The falling-water alphabet: `.` empty, `~` still water, `v`
/// falling water, `#` wall, `?` wildcard.
pub fn falling_water_alphabet() -> Alphabet {
    build_falling_water().expect("preset alphabet is statically valid")
}

fn build_falling_water() -> Result<Alphabet, AutomataError> {
    let mut alphabet = Alphabet::new();
    alphabet.register('.', ' ', "empty")?;
    alphabet.register('~', '~', "water")?;
    alphabet.register('v', '~', "water")?;
    alphabet.register('#', '#', "wall")?;
    alphabet.register_wildcard('?')?;
    alphabet.set_empty('.')?;
    Ok(alphabet)
}

/// Rule script for falling water, written against
/// [`falling_water_alphabet`]. Exercises wildcards, bracket groups,
/// and negation.
pub const FALLING_WATER_RULES: &str = "\
; Falling water. Rules are tried top to bottom per cell; the first
; match wins.

; an empty cell with water above it fills with falling water
? [~ v] ?
? .     ? v
? ?     ?

; water above emptiness drains away
? ?     ?
? [~ v] ? .
? .     ?

; falling water that lands becomes still water
? ?  ?
? v  ? ~
? !. ?
";

/// A small walled basin with a pocket of water, for demos and tests.
/// Use a `#` boundary so nothing leaks off the map edges.
pub const DEMO_MAP: &str = "\
#........#
#..~~~...#
#........#
#........#
##########";
