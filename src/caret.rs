//!
//! Caret boundaries and the caret resolver.
//!
//! A [CaretBoundary] tells for every caret slot of a formatted value
//! whether the caret may rest there. Slots inside a prefix, a suffix or
//! a run of mask literals are off limits.
//!
//! [caret_position] maps a caret in the raw input (what the user
//! produced by typing) to a caret in the newly formatted value.
//!

use crate::format::FieldFormat;
use crate::glyphs::graphemes;
use crate::range::{find_change_range, ChangeRange};
use crate::upos_type;

/// Direction for snapping the caret.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CaretDirection {
    Left,
    #[default]
    Right,
}

/// Per slot flag whether the caret may rest there.
///
/// Has one entry more than the formatted value has graphemes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CaretBoundary(Vec<bool>);

impl CaretBoundary {
    /// From the slot flags. The flags must cover `len + 1` slots.
    pub fn new(slots: Vec<bool>) -> Self {
        Self(slots)
    }

    /// Every slot for a value of the given length is allowed.
    pub fn all(len: upos_type) -> Self {
        Self(vec![true; len as usize + 1])
    }

    /// Length of the value the boundary was built for.
    pub fn value_len(&self) -> upos_type {
        self.0.len().saturating_sub(1) as upos_type
    }

    pub fn slots(&self) -> &[bool] {
        &self.0
    }

    /// Set the slots in the range. Out of range parts are ignored.
    pub fn fill(&mut self, start: usize, end: usize, allowed: bool) {
        let end = end.min(self.0.len());
        if start < end {
            self.0[start..end].fill(allowed);
        }
    }

    pub fn is_allowed(&self, pos: upos_type) -> bool {
        self.0.get(pos as usize).copied().unwrap_or(false)
    }

    pub fn first_allowed(&self) -> Option<upos_type> {
        self.0.iter().position(|v| *v).map(|v| v as upos_type)
    }

    pub fn last_allowed(&self) -> Option<upos_type> {
        self.0.iter().rposition(|v| *v).map(|v| v as upos_type)
    }

    /// Moves the caret to the next allowed slot in the given direction.
    ///
    /// If there is none in that direction, the first allowed slot
    /// (for Left) or the last allowed slot (for Right) is used.
    /// Without any allowed slot the caret goes to the end.
    pub fn snap(&self, caret: upos_type, direction: CaretDirection) -> upos_type {
        let len = self.value_len();
        let mut pos = caret.min(len) as i64;

        match direction {
            CaretDirection::Left => {
                while pos >= 0 && !self.is_allowed(pos as upos_type) {
                    pos -= 1;
                }
                if pos < 0 {
                    pos = self.first_allowed().map(|v| v as i64).unwrap_or(-1);
                }
            }
            CaretDirection::Right => {
                while pos <= len as i64 && !self.is_allowed(pos as upos_type) {
                    pos += 1;
                }
                if pos > len as i64 {
                    pos = self.last_allowed().map(|v| v as i64).unwrap_or(-1);
                }
            }
        }

        if pos < 0 {
            len
        } else {
            pos as upos_type
        }
    }
}

/// Data for comparing one grapheme of the raw input with one
/// grapheme of the new formatted value.
#[derive(Debug, Clone, Copy)]
pub struct CharMatch<'a> {
    /// Raw input.
    pub input: &'a [&'a str],
    /// Formatted value before the edit.
    pub last_value: &'a [&'a str],
    /// New formatted value.
    pub formatted: &'a [&'a str],
    pub input_index: usize,
    pub formatted_index: usize,
    /// Typed range between `last_value` and `input`.
    pub typed: ChangeRange,
}

impl<'a> CharMatch<'a> {
    /// Grapheme of the raw input.
    pub fn input_char(&self) -> Option<&'a str> {
        self.input.get(self.input_index).copied()
    }

    /// Grapheme of the formatted value.
    pub fn formatted_char(&self) -> Option<&'a str> {
        self.formatted.get(self.formatted_index).copied()
    }

    /// The input grapheme was typed with this edit.
    pub fn is_typed(&self) -> bool {
        let idx = self.input_index as upos_type;
        idx >= self.typed.to.start && idx < self.typed.to.end
    }
}

/// Maps the caret of the raw input to the new formatted value.
///
/// Every grapheme of the input is matched with the first still unused
/// grapheme of the formatted value that is the same according to
/// [FieldFormat::is_char_same]. From the caret the nearest matched
/// valid grapheme to the right gives one anchor, the nearest matched
/// grapheme to the left the other one. The caret goes to the closer
/// anchor, on a tie to the right one.
///
/// The result is not snapped to the caret boundary yet,
/// see [resolve_caret] for that.
pub fn caret_position<F>(
    format: &F,
    formatted: &str,
    last_formatted: &str,
    input: &str,
    caret: upos_type,
    boundary: &CaretBoundary,
) -> upos_type
where
    F: FieldFormat + ?Sized,
{
    let fmt = graphemes(formatted);
    let mut last = graphemes(last_formatted);
    let mut cur = graphemes(input);
    let mut caret = caret as usize;

    // typing into an empty field never produces the leading decoration
    let first_allowed = boundary.first_allowed().unwrap_or(0) as usize;
    let leading = &fmt[..first_allowed.min(fmt.len())];
    if last.is_empty() && !cur.starts_with(leading) {
        last = leading.to_vec();
        let mut tmp = leading.to_vec();
        tmp.extend(cur);
        cur = tmp;
        caret += leading.len();
    }
    let caret = caret.min(cur.len());

    let typed = find_change_range(&last.concat(), &cur.concat());

    let mut used = vec![false; fmt.len()];
    let mut index_map: Vec<Option<usize>> = vec![None; cur.len()];
    for i in 0..cur.len() {
        for j in 0..fmt.len() {
            if used[j] {
                continue;
            }
            let m = CharMatch {
                input: &cur,
                last_value: &last,
                formatted: &fmt,
                input_index: i,
                formatted_index: j,
                typed,
            };
            if format.is_char_same(&m) {
                index_map[i] = Some(j);
                used[j] = true;
                break;
            }
        }
    }

    let mut pos = caret;
    while pos < cur.len() && (index_map[pos].is_none() || !format.is_valid_input_char(cur[pos])) {
        pos += 1;
    }
    let end_index = match index_map.get(pos) {
        Some(Some(v)) => *v,
        _ => fmt.len(),
    };

    let mut pos = caret as i64 - 1;
    while pos > 0 && index_map[pos as usize].is_none() {
        pos -= 1;
    }
    let start_index = if pos < 0 {
        0
    } else {
        match index_map.get(pos as usize) {
            Some(Some(v)) => v + 1,
            _ => 0,
        }
    };

    let new_caret = if start_index > end_index {
        end_index
    } else if (caret as i64 - start_index as i64) < (end_index as i64 - caret as i64) {
        start_index
    } else {
        end_index
    };

    new_caret as upos_type
}

/// Resolves the caret for a new formatted value and snaps it
/// into the caret boundary.
pub fn resolve_caret<F>(
    format: &F,
    formatted: &str,
    last_formatted: &str,
    input: &str,
    caret: upos_type,
) -> upos_type
where
    F: FieldFormat + ?Sized,
{
    let boundary = format.caret_boundary(formatted);
    let pos = caret_position(format, formatted, last_formatted, input, caret, &boundary);
    boundary.snap(pos, CaretDirection::Right)
}
