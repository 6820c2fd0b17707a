//!
//! Numeric format.
//!
//! Free-form numbers with prefix, suffix, thousand grouping,
//! a decimal separator and an optional fixed number of decimals.
//!
//! ```
//! use rat_format_input::{FieldFormat, NumericFormat};
//!
//! let fmt = NumericFormat::new()
//!     .with_prefix("$")
//!     .with_thousand_separator(true);
//! assert_eq!(fmt.format("12345.5"), "$12,345.5");
//! assert_eq!(fmt.remove_formatting("$12,345.5", None), "12345.5");
//! ```
//!

use crate::_private::NonExhaustive;
use crate::caret::{CaretBoundary, CharMatch};
use crate::event::FieldKey;
use crate::format::num_str::{
    apply_thousand_separator, fix_leading_zero, is_canonical_number, limit_to_scale,
    round_to_precision, split_decimal, to_numeric_string,
};
use crate::format::{FieldFormat, KeyContext, KeyDirective};
use crate::glyphs::{at, ends_with, glen, graphemes, has_digit, is_digit, slice, starts_with};
use crate::range::ChangeMeta;
use crate::value::FieldValue;
use crate::{upos_type, FormatError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Thousand separator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThousandSeparator {
    /// No grouping.
    #[default]
    Off,
    /// Group with `,`.
    On,
    /// Group with this separator.
    Sep(String),
}

impl ThousandSeparator {
    /// Effective separator.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ThousandSeparator::Off => None,
            ThousandSeparator::On => Some(","),
            ThousandSeparator::Sep(s) if s.is_empty() => None,
            ThousandSeparator::Sep(s) => Some(s.as_str()),
        }
    }
}

impl From<bool> for ThousandSeparator {
    fn from(value: bool) -> Self {
        if value {
            ThousandSeparator::On
        } else {
            ThousandSeparator::Off
        }
    }
}

impl From<&str> for ThousandSeparator {
    fn from(value: &str) -> Self {
        ThousandSeparator::Sep(value.to_string())
    }
}

/// Grouping of the integer digits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GroupStyle {
    /// Groups of 3.
    #[default]
    Thousand,
    /// Indian style, a group of 3 followed by groups of 2.
    Lakh,
    /// Groups of 4.
    Wan,
    /// No grouping, even with a separator.
    None,
}

/// Configuration of a numeric field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NumericFormat {
    /// Literal text in front of the number.
    pub prefix: String,
    /// Literal text after the number.
    pub suffix: String,
    pub thousand_separator: ThousandSeparator,
    pub decimal_separator: String,
    /// Typed once, any of these is taken as the decimal separator.
    /// Defaults to the decimal separator and `.`.
    pub allowed_decimal_separators: Option<Vec<String>>,
    pub group_style: GroupStyle,
    /// Number of decimals. None for no limit.
    pub decimal_scale: Option<u32>,
    /// Always show all decimals.
    pub fixed_decimal_scale: bool,
    /// Ignored if the prefix starts with `-`.
    pub allow_negative: bool,
    /// Keep leading zeros on blur.
    pub allow_leading_zeros: bool,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub non_exhaustive: NonExhaustive,
}

impl Default for NumericFormat {
    fn default() -> Self {
        Self {
            prefix: Default::default(),
            suffix: Default::default(),
            thousand_separator: Default::default(),
            decimal_separator: ".".to_string(),
            allowed_decimal_separators: None,
            group_style: Default::default(),
            decimal_scale: None,
            fixed_decimal_scale: false,
            allow_negative: true,
            allow_leading_zeros: false,
            non_exhaustive: NonExhaustive,
        }
    }
}

impl NumericFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_thousand_separator(mut self, sep: impl Into<ThousandSeparator>) -> Self {
        self.thousand_separator = sep.into();
        self
    }

    pub fn with_decimal_separator(mut self, sep: impl Into<String>) -> Self {
        self.decimal_separator = sep.into();
        self
    }

    pub fn with_allowed_decimal_separators<S: Into<String>>(
        mut self,
        seps: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_decimal_separators = Some(seps.into_iter().map(|v| v.into()).collect());
        self
    }

    pub fn with_group_style(mut self, style: GroupStyle) -> Self {
        self.group_style = style;
        self
    }

    pub fn with_decimal_scale(mut self, scale: u32) -> Self {
        self.decimal_scale = Some(scale);
        self
    }

    pub fn with_fixed_decimal_scale(mut self, fixed: bool) -> Self {
        self.fixed_decimal_scale = fixed;
        self
    }

    pub fn with_allow_negative(mut self, allow: bool) -> Self {
        self.allow_negative = allow;
        self
    }

    pub fn with_allow_leading_zeros(mut self, allow: bool) -> Self {
        self.allow_leading_zeros = allow;
        self
    }

    /// Negative numbers are possible.
    pub fn allows_negative(&self) -> bool {
        self.allow_negative && !self.prefix.starts_with('-')
    }

    /// Effective allowed decimal separators.
    pub fn allowed_decimal_separators(&self) -> Vec<&str> {
        match &self.allowed_decimal_separators {
            Some(v) => v.iter().map(|v| v.as_str()).collect(),
            None => vec![self.decimal_separator.as_str(), "."],
        }
    }

    /// Decimal scale with at least one decimal.
    fn positive_scale(&self) -> Option<u32> {
        self.decimal_scale.filter(|v| *v > 0)
    }

    /// Can a value set by the application be taken as canonical value.
    pub fn is_numeric_string(&self, value: &str) -> bool {
        value.is_empty()
            || (!has_digit(&self.prefix)
                && !has_digit(&self.suffix)
                && is_canonical_number(value))
    }

    /// Removes every `-` that is not part of the prefix or the suffix.
    ///
    /// A single one makes the number negative, two or more cancel
    /// each other. Positions are shifted for the removed graphemes.
    fn strip_negation<'a>(
        &self,
        value: Vec<&'a str>,
        start: usize,
        end: usize,
    ) -> (Vec<&'a str>, usize, usize, bool) {
        if self.prefix.starts_with('-') {
            return (value, start, end, false);
        }

        let prefix = graphemes(&self.prefix);
        let suffix = graphemes(&self.suffix);

        let leading = value.iter().take_while(|v| **v == "-").count();
        let prefix_range = if prefix.is_empty() {
            0..0
        } else {
            (0..=leading)
                .find(|k| starts_with(&value[*k..], &prefix))
                .map(|k| k..k + prefix.len())
                .unwrap_or(0..0)
        };
        let suffix_range = if !suffix.is_empty()
            && ends_with(&value, &suffix)
            && value.len() - suffix.len() >= prefix_range.end
        {
            value.len() - suffix.len()..value.len()
        } else {
            0..0
        };

        let mut count = 0;
        let mut new_start = start;
        let mut new_end = end;
        let mut stripped = Vec::with_capacity(value.len());
        for (i, g) in value.into_iter().enumerate() {
            if g == "-" && !prefix_range.contains(&i) && !suffix_range.contains(&i) {
                count += 1;
                if i < start {
                    new_start -= 1;
                }
                if i < end {
                    new_end -= 1;
                }
            } else {
                stripped.push(g);
            }
        }

        (stripped, new_start, new_end, count == 1)
    }

    fn round_incoming(&self, value: String) -> String {
        match self.decimal_scale {
            Some(scale) => round_to_precision(&value, scale, self.fixed_decimal_scale),
            None => value,
        }
    }
}

impl FieldFormat for NumericFormat {
    fn format(&self, canonical: &str) -> String {
        if canonical.is_empty() || canonical == "-" {
            return canonical.to_string();
        }

        let show_separator = (self.decimal_scale != Some(0) && canonical.contains('.'))
            || (self.positive_scale().is_some() && self.fixed_decimal_scale);

        let split = split_decimal(canonical, self.allows_negative());
        let after = match self.decimal_scale {
            Some(scale) => limit_to_scale(split.after, scale, self.fixed_decimal_scale),
            None => split.after.to_string(),
        };
        let before = match self.thousand_separator.as_str() {
            Some(sep) => apply_thousand_separator(split.before, sep, self.group_style),
            None => split.before.to_string(),
        };

        let mut s = String::new();
        if split.add_negation {
            s.push('-');
        }
        s.push_str(&self.prefix);
        s.push_str(&before);
        if show_separator {
            s.push_str(&self.decimal_separator);
        }
        s.push_str(&after);
        s.push_str(&self.suffix);
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

        let prefix_len = glen(&self.prefix);
        let suffix_len = glen(&self.suffix);
        let decimal = self.decimal_separator.as_str();

        let mut val = graphemes(value);
        let mut end = (meta.to.end as usize).min(val.len());
        let mut start = (meta.to.start as usize).min(end);
        let before_decimal = at(&val, end) == Some(decimal);

        // a digit prefix/suffix typed into an empty field
        if has_digit(value)
            && (value == self.prefix || value == self.suffix)
            && meta.last_value.is_empty()
        {
            return value.to_string();
        }

        if end - start == 1 && self.allowed_decimal_separators().contains(&val[start]) {
            if self.decimal_scale == Some(0) {
                val.remove(start);
                end -= 1;
            } else {
                val[start] = decimal;
            }
        }

        let (mut val, to_start, to_end, negative) = self.strip_negation(val, start, end);
        start = to_start;
        end = to_end;

        let last = graphemes(&meta.last_value);
        let from_end = (meta.from.end as usize).min(last.len());
        let from_start = (meta.from.start as usize).min(from_end);
        let (last, from_start, from_end, _) = self.strip_negation(last, from_start, from_end);

        // edits that only touched the prefix or the suffix are undone
        let updated = slice(&val, start, end);
        if !val.is_empty()
            && !last.is_empty()
            && ((from_start as i64) > last.len() as i64 - suffix_len as i64
                || from_end < prefix_len)
            && !(!updated.is_empty() && self.suffix.starts_with(&updated))
        {
            val = last;
        }

        let prefix = graphemes(&self.prefix);
        let strip_start = if val.starts_with(&prefix) {
            prefix.len()
        } else if start < prefix_len {
            start
        } else {
            0
        };
        let strip_start = strip_start.min(val.len());
        let val = &val[strip_start..];
        let end = end.saturating_sub(strip_start);

        let suffix = graphemes(&self.suffix);
        let suffix_start = val.len().saturating_sub(suffix_len);
        let strip_end = if val.ends_with(&suffix) {
            suffix_start
        } else if end > suffix_start {
            end.min(val.len())
        } else {
            val.len()
        };
        let val = &val[..strip_end];

        let mut digits = String::new();
        let mut has_decimal = false;
        for g in val {
            if is_digit(g) {
                digits.push_str(g);
            } else if *g == decimal && !has_decimal {
                digits.push('.');
                has_decimal = true;
            }
        }

        let negative = negative && self.allows_negative();

        // clear a dangling separator after deleting the integer part
        let split = split_decimal(&digits, true);
        if meta.to.len() < meta.from.len()
            && split.before.is_empty()
            && before_decimal
            && split.after.bytes().all(|b| b == b'0')
        {
            return if negative { "-".into() } else { String::new() };
        }

        if negative {
            digits.insert(0, '-');
        }
        digits
    }

    fn caret_boundary(&self, formatted: &str) -> CaretBoundary {
        let g = graphemes(formatted);
        let len = g.len();
        let negation = if g.first() == Some(&"-") { 1 } else { 0 };

        let mut boundary = CaretBoundary::all(len as upos_type);
        boundary.fill(0, glen(&self.prefix) + negation, false);
        boundary.fill((len + 1).saturating_sub(glen(&self.suffix)), len + 1, false);
        boundary
    }

    fn is_valid_input_char(&self, g: &str) -> bool {
        is_digit(g) || g == self.decimal_separator
    }

    fn is_char_same(&self, m: &CharMatch<'_>) -> bool {
        let (Some(cur), Some(new)) = (m.input_char(), m.formatted_char()) else {
            return false;
        };
        if m.is_typed()
            && new == self.decimal_separator
            && self.allowed_decimal_separators().contains(&cur)
        {
            return true;
        }
        cur == new
    }

    fn key_down(&self, ctx: &KeyContext<'_>) -> KeyDirective {
        let mut directive = KeyDirective::default();
        let value = graphemes(ctx.value);
        let start = ctx.selection.start as usize;
        let end = ctx.selection.end as usize;
        let is_backspace = *ctx.key == FieldKey::Backspace;
        let is_delete = *ctx.key == FieldKey::Delete;

        // partial deletion of the prefix
        if (is_backspace || is_delete) && end < glen(&self.prefix) {
            directive.prevent_default = true;
            directive.suppress_forward = true;
            return directive;
        }
        if start != end {
            return directive;
        }

        let prev = if start > 0 { at(&value, start - 1) } else { None };
        let next = at(&value, start);
        let decimal = Some(self.decimal_separator.as_str());

        // backspace right after the prefix removes the sign
        if is_backspace
            && value.first() == Some(&"-")
            && start == glen(&self.prefix) + 1
            && self.allows_negative()
        {
            directive.caret = Some(1);
        }

        if self.positive_scale().is_some() && self.fixed_decimal_scale {
            if is_backspace && prev == decimal {
                directive.caret = Some((start - 1) as upos_type);
                directive.prevent_default = true;
            } else if is_delete && next == decimal {
                directive.prevent_default = true;
            }
        }

        if let FieldKey::Char(c) = ctx.key {
            let mut buf = [0u8; 4];
            let c = &*c.encode_utf8(&mut buf);
            if self.allowed_decimal_separators().contains(&c) && next == decimal {
                directive.caret = Some((start + 1) as upos_type);
            }
        }

        if let Some(thousand) = self.thousand_separator.as_str() {
            if is_backspace && prev == Some(thousand) {
                directive.caret = Some((start - 1) as upos_type);
            }
            if is_delete && next == Some(thousand) {
                directive.caret = Some((start + 1) as upos_type);
            }
        }

        directive
    }

    fn validate(&self) -> Result<(), FormatError> {
        if self.decimal_separator.is_empty() {
            return Err(FormatError::EmptyDecimalSeparator);
        }
        if let Some(thousand) = self.thousand_separator.as_str() {
            if thousand == self.decimal_separator {
                return Err(FormatError::SeparatorClash {
                    thousand: thousand.to_string(),
                    decimal: self.decimal_separator.clone(),
                });
            }
        }
        Ok(())
    }

    fn value_to_canonical(&self, value: &FieldValue, numeric_string: Option<bool>) -> String {
        match value {
            FieldValue::Empty => String::new(),
            FieldValue::Number(v) => self.round_incoming(to_numeric_string(*v)),
            FieldValue::Text(s) => {
                if numeric_string.unwrap_or_else(|| self.is_numeric_string(s)) {
                    self.round_incoming(s.clone())
                } else {
                    self.remove_formatting(s, None)
                }
            }
        }
    }

    fn normalize_on_blur(&self, canonical: &str) -> String {
        let mut value = if has_digit(canonical) {
            canonical.to_string()
        } else {
            String::new()
        };
        if !self.allow_leading_zeros {
            value = fix_leading_zero(&value);
        }
        if let Some(scale) = self.positive_scale() {
            if self.fixed_decimal_scale {
                value = round_to_precision(&value, scale, true);
            }
        }
        value
    }
}
