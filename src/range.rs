//!
//! Finds the part of a text that was changed by an edit.
//!
//! There are two ways to get at this. Either compare the old and the
//! new text, or use the selection that was captured right before the
//! edit happened together with the caret after the edit. The second one
//! is preferred when available, diffing can't tell which of some
//! repeated characters was replaced.
//!

use crate::glyphs::{glen, graphemes};
use crate::upos_type;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half-open range of grapheme positions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextSpan {
    pub start: upos_type,
    pub end: upos_type,
}

impl TextSpan {
    pub const fn new(start: upos_type, end: upos_type) -> Self {
        Self { start, end }
    }

    /// Collapsed span.
    pub const fn caret(pos: upos_type) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    pub fn len(&self) -> upos_type {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Same as is_empty(), reads better for selections.
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Position is inside the half-open range.
    #[inline]
    pub fn contains(&self, pos: upos_type) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Changed range in the old text (`from`) and the new text (`to`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeRange {
    pub from: TextSpan,
    pub to: TextSpan,
}

impl ChangeRange {
    /// Number of graphemes removed from the old text.
    pub fn removed(&self) -> upos_type {
        self.from.len()
    }

    /// Number of graphemes inserted in the new text.
    pub fn inserted(&self) -> upos_type {
        self.to.len()
    }
}

/// Information about an edit, given to remove_formatting.
///
/// Lives for exactly one edit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeMeta {
    /// Replaced range in `last_value`.
    pub from: TextSpan,
    /// Replacing range in the new value.
    pub to: TextSpan,
    /// Formatted value before the edit.
    pub last_value: String,
}

impl ChangeMeta {
    pub fn new(range: ChangeRange, last_value: impl Into<String>) -> Self {
        Self {
            from: range.from,
            to: range.to,
            last_value: last_value.into(),
        }
    }

    /// Meta used when nothing is known about an edit.
    /// The whole value counts as inserted into an empty text.
    pub fn for_value(value: &str) -> Self {
        Self {
            from: TextSpan::caret(0),
            to: TextSpan::new(0, glen(value) as upos_type),
            last_value: String::new(),
        }
    }

    pub fn range(&self) -> ChangeRange {
        ChangeRange {
            from: self.from,
            to: self.to,
        }
    }
}

/// Compares two texts and finds the changed part.
///
/// Scans from the left as long as both texts are equal, then from the
/// right, but never past the left scan.
pub fn find_change_range(prev: &str, next: &str) -> ChangeRange {
    let prev = graphemes(prev);
    let next = graphemes(next);
    let prev_len = prev.len();
    let next_len = next.len();

    let mut i = 0;
    while i < prev_len && i < next_len && prev[i] == next[i] {
        i += 1;
    }

    let mut j = 0;
    while prev_len - j > i && next_len - j > i && prev[prev_len - 1 - j] == next[next_len - 1 - j]
    {
        j += 1;
    }

    ChangeRange {
        from: TextSpan::new(i as upos_type, (prev_len - j) as upos_type),
        to: TextSpan::new(i as upos_type, (next_len - j) as upos_type),
    }
}

/// Change range from the selection before the edit and the caret after.
///
/// Whatever was selected before got replaced by everything between
/// the start of the edit and the new caret.
pub fn change_range_from_caret(before: TextSpan, caret: upos_type) -> ChangeRange {
    let start = before.start.min(caret);
    ChangeRange {
        from: TextSpan::new(start, before.end.max(start)),
        to: TextSpan::new(start, caret),
    }
}
