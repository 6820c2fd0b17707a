//!
//! The formatting pipeline.
//!
//! A [FieldFormat] converts between the canonical value (digits, an
//! optional leading `-`, an optional single `.`) and the formatted value
//! that is shown to the user. It also knows where the caret may rest in
//! a formatted value and can adjust the caret before a key does its
//! thing.
//!
//! There are two flavors: [NumericFormat](numeric::NumericFormat) and
//! [PatternFormat](pattern::PatternFormat).
//!

use crate::caret::{CaretBoundary, CharMatch};
use crate::event::FieldKey;
use crate::glyphs::is_digit;
use crate::range::{ChangeMeta, TextSpan};
use crate::value::FieldValue;
use crate::{upos_type, FormatError};
use std::fmt::Debug;

pub mod num_str;
pub mod numeric;
pub mod pattern;

use numeric::NumericFormat;
use pattern::PatternFormat;

/// Key with the state of the field when it was pressed.
///
/// The selection is the one after the generic caret correction.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'a> {
    pub key: &'a FieldKey,
    pub value: &'a str,
    pub selection: TextSpan,
}

/// What a format wants to happen with a key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyDirective {
    /// Move the caret here before the key is applied.
    pub caret: Option<upos_type>,
    /// The key must not reach the text.
    pub prevent_default: bool,
    /// The key is not forwarded to the application.
    pub suppress_forward: bool,
}

/// Formatting rules for one kind of field.
pub trait FieldFormat: Debug {
    /// Canonical value to formatted value.
    fn format(&self, canonical: &str) -> String;

    /// Raw input to canonical value.
    ///
    /// The change describes which part of the last formatted value was
    /// replaced. Without it the whole input counts as new.
    /// Never fails, the worst case is an empty value.
    fn remove_formatting(&self, value: &str, change: Option<&ChangeMeta>) -> String;

    /// Allowed caret slots for the formatted value.
    fn caret_boundary(&self, formatted: &str) -> CaretBoundary;

    /// Can this grapheme be typed.
    fn is_valid_input_char(&self, g: &str) -> bool {
        is_digit(g)
    }

    /// Is the raw input grapheme the same as the formatted grapheme.
    fn is_char_same(&self, m: &CharMatch<'_>) -> bool {
        match (m.input_char(), m.formatted_char()) {
            (Some(c), Some(f)) => c == f,
            _ => false,
        }
    }

    /// Runs for each key press after the generic caret correction.
    fn key_down(&self, ctx: &KeyContext<'_>) -> KeyDirective {
        _ = ctx;
        KeyDirective::default()
    }

    /// Checks the configuration.
    fn validate(&self) -> Result<(), FormatError> {
        Ok(())
    }

    /// Canonical value for a value that is set by the application.
    ///
    /// `numeric_string` tells whether a text value already is a canonical
    /// value. With None the format may find out for itself.
    fn value_to_canonical(&self, value: &FieldValue, numeric_string: Option<bool>) -> String {
        match value {
            FieldValue::Empty => String::new(),
            FieldValue::Number(v) => num_str::to_numeric_string(*v),
            FieldValue::Text(s) => {
                if numeric_string.unwrap_or(false) {
                    s.clone()
                } else {
                    self.remove_formatting(s, None)
                }
            }
        }
    }

    /// Cleans up the canonical value when the field loses focus.
    fn normalize_on_blur(&self, canonical: &str) -> String {
        canonical.to_string()
    }
}

/// Formats a canonical value with a numeric format.
pub fn numeric_formatter(canonical: &str, format: &NumericFormat) -> String {
    format.format(canonical)
}

/// Removes the numeric formatting.
pub fn remove_numeric_format(
    value: &str,
    change: Option<&ChangeMeta>,
    format: &NumericFormat,
) -> String {
    format.remove_formatting(value, change)
}

/// Formats a canonical value with a pattern.
pub fn pattern_formatter(canonical: &str, format: &PatternFormat) -> String {
    format.format(canonical)
}

/// Removes the pattern formatting.
pub fn remove_pattern_format(
    value: &str,
    change: Option<&ChangeMeta>,
    format: &PatternFormat,
) -> String {
    format.remove_formatting(value, change)
}
