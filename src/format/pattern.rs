//!
//! Pattern format.
//!
//! A pattern is a template like `+1 (###) ###-####`. Each pattern char
//! is a slot for one digit, everything else is a literal. Empty slots
//! show the mask.
//!
//! ```
//! use rat_format_input::{FieldFormat, PatternFormat};
//!
//! let fmt = PatternFormat::new("##/##").with_mask("_");
//! assert_eq!(fmt.format("123"), "12/3_");
//! assert_eq!(fmt.remove_formatting("12/3_", None), "123");
//! ```
//!

use crate::_private::NonExhaustive;
use crate::caret::{CaretBoundary, CaretDirection};
use crate::event::FieldKey;
use crate::format::{FieldFormat, KeyContext, KeyDirective};
use crate::glyphs::{extract_digits, graphemes, has_digit, is_digit, slice};
use crate::range::ChangeMeta;
use crate::{upos_type, FormatError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Placeholder for empty slots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PatternMask {
    /// Same placeholder for every slot.
    Single(String),
    /// One placeholder per slot. Missing ones are a blank.
    PerSlot(Vec<String>),
}

impl Default for PatternMask {
    fn default() -> Self {
        PatternMask::Single(" ".to_string())
    }
}

impl PatternMask {
    /// Placeholder for the n-th slot.
    pub fn at(&self, slot: usize) -> &str {
        match self {
            PatternMask::Single(s) => s.as_str(),
            PatternMask::PerSlot(v) => match v.get(slot) {
                Some(s) if !s.is_empty() => s.as_str(),
                _ => " ",
            },
        }
    }

    fn has_digit(&self) -> bool {
        match self {
            PatternMask::Single(s) => has_digit(s),
            PatternMask::PerSlot(v) => v.iter().any(|s| has_digit(s)),
        }
    }
}

impl From<&str> for PatternMask {
    fn from(value: &str) -> Self {
        PatternMask::Single(value.to_string())
    }
}

impl From<Vec<String>> for PatternMask {
    fn from(value: Vec<String>) -> Self {
        PatternMask::PerSlot(value)
    }
}

impl Display for PatternMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PatternMask::Single(s) => write!(f, "{}", s),
            PatternMask::PerSlot(v) => write!(f, "{}", v.join(",")),
        }
    }
}

/// Configuration of a pattern field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PatternFormat {
    /// Template with pattern chars and literals.
    pub pattern: String,
    /// Marks a digit slot in the pattern.
    pub pattern_char: String,
    pub mask: PatternMask,
    /// Show the pattern even for an empty value.
    pub allow_empty_formatting: bool,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub non_exhaustive: NonExhaustive,
}

impl Default for PatternFormat {
    fn default() -> Self {
        Self {
            pattern: Default::default(),
            pattern_char: "#".to_string(),
            mask: Default::default(),
            allow_empty_formatting: false,
            non_exhaustive: NonExhaustive,
        }
    }
}

impl PatternFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_pattern_char(mut self, pattern_char: impl Into<String>) -> Self {
        self.pattern_char = pattern_char.into();
        self
    }

    pub fn with_mask(mut self, mask: impl Into<PatternMask>) -> Self {
        self.mask = mask.into();
        self
    }

    pub fn with_allow_empty_formatting(mut self, allow: bool) -> Self {
        self.allow_empty_formatting = allow;
        self
    }

    /// Position is a digit slot.
    fn is_slot(&self, pattern: &[&str], pos: usize) -> bool {
        pattern.get(pos).copied() == Some(self.pattern_char.as_str())
    }

    /// Digits from the slot positions of a part of the last value.
    /// `offset` is the position of the part in the pattern.
    fn slot_digits(&self, pattern: &[&str], part: &[&str], offset: usize) -> String {
        let mut s = String::new();
        for (i, g) in part.iter().enumerate() {
            if self.is_slot(pattern, offset + i) && is_digit(g) {
                s.push_str(g);
            }
        }
        s
    }
}

impl FieldFormat for PatternFormat {
    fn format(&self, canonical: &str) -> String {
        if canonical.is_empty() && !self.allow_empty_formatting {
            return String::new();
        }

        let digits = graphemes(canonical);
        let mut slot = 0;
        let mut s = String::new();
        for g in graphemes(&self.pattern) {
            if g == self.pattern_char {
                match digits.get(slot) {
                    Some(d) => s.push_str(d),
                    None => s.push_str(self.mask.at(slot)),
                }
                slot += 1;
            } else {
                s.push_str(g);
            }
        }
        s
    }

    fn remove_formatting(&self, value: &str, change: Option<&ChangeMeta>) -> String {
        let default_meta;
        let meta = match change {
            Some(meta) => meta,
            None => {
                default_meta = ChangeMeta::for_value(value);
                &default_meta
            }
        };

        // without digit literals nothing can be mistaken for input
        if !has_digit(&self.pattern) {
            return extract_digits(value);
        }

        let pattern = graphemes(&self.pattern);
        let val = graphemes(value);
        let last = graphemes(&meta.last_value);

        // whole value replaced, check it against the pattern
        if (last.is_empty() || meta.from.len() as usize == last.len())
            && val.len() == pattern.len()
        {
            let mut s = String::new();
            for (i, g) in val.iter().enumerate() {
                if self.is_slot(&pattern, i) {
                    if is_digit(g) {
                        s.push_str(g);
                    }
                } else if *g != pattern[i] {
                    return extract_digits(value);
                }
            }
            return s;
        }

        // unchanged parts map 1:1 to the pattern, the changed part
        // is all input
        let from_start = meta.from.start as usize;
        let from_end = meta.from.end as usize;
        let first = &last[..from_start.min(last.len())];
        let middle = slice(&val, meta.to.start as usize, meta.to.end as usize);
        let tail = &last[from_end.min(last.len())..];

        let mut s = self.slot_digits(&pattern, first, 0);
        s.push_str(&extract_digits(&middle));
        s.push_str(&self.slot_digits(&pattern, tail, from_end));
        s
    }

    fn caret_boundary(&self, formatted: &str) -> CaretBoundary {
        let pattern = graphemes(&self.pattern);
        let value = graphemes(formatted);

        let mut slot = 0;
        let mut first_empty = None;
        let mut masks = Vec::with_capacity(pattern.len());
        for (i, g) in pattern.iter().enumerate() {
            if *g == self.pattern_char {
                let mask = self.mask.at(slot);
                if first_empty.is_none() && value.get(i).copied() == Some(mask) {
                    first_empty = Some(i);
                }
                masks.push(Some(mask));
                slot += 1;
            } else {
                masks.push(None);
            }
        }

        // holds a real digit
        let filled = |pos: usize| -> bool {
            self.is_slot(&pattern, pos) && value.get(pos).copied() != masks[pos]
        };

        let mut slots = vec![false; value.len() + 1];
        for (i, v) in slots.iter_mut().enumerate() {
            *v = first_empty == Some(i) || filled(i) || (i > 0 && filled(i - 1));
        }
        if let Some(first_slot) = pattern.iter().position(|g| *g == self.pattern_char) {
            if let Some(v) = slots.get_mut(first_slot) {
                *v = true;
            }
        }
        CaretBoundary::new(slots)
    }

    fn key_down(&self, ctx: &KeyContext<'_>) -> KeyDirective {
        let mut directive = KeyDirective::default();
        if !ctx.selection.is_collapsed() {
            return directive;
        }

        let pattern = graphemes(&self.pattern);
        let start = ctx.selection.start as usize;
        let mut caret = start;

        match ctx.key {
            FieldKey::Backspace => {
                while caret > 0 && !self.is_slot(&pattern, caret - 1) {
                    caret -= 1;
                }
                caret = self
                    .caret_boundary(ctx.value)
                    .snap(caret as upos_type, CaretDirection::Left) as usize;
            }
            FieldKey::Delete => {
                while caret < pattern.len() && !self.is_slot(&pattern, caret) {
                    caret += 1;
                }
                caret = self
                    .caret_boundary(ctx.value)
                    .snap(caret as upos_type, CaretDirection::Right)
                    as usize;
            }
            FieldKey::Char(_) if !self.is_slot(&pattern, caret) => {
                // typing on a literal
                caret = self
                    .caret_boundary(ctx.value)
                    .snap(caret as upos_type + 1, CaretDirection::Right)
                    as usize;
            }
            _ => {}
        }

        if caret != start {
            directive.caret = Some(caret as upos_type);
        }
        directive
    }

    fn validate(&self) -> Result<(), FormatError> {
        if self.pattern_char.is_empty() {
            return Err(FormatError::EmptyPatternChar);
        }
        if self.mask.has_digit() {
            return Err(FormatError::NumericMask(self.mask.to_string()));
        }
        Ok(())
    }
}
