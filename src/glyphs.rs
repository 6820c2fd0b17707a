//!
//! Grapheme helpers. Everything in this crate counts positions in
//! extended grapheme clusters.
//!

use crate::upos_type;
use unicode_segmentation::UnicodeSegmentation;

/// Split into graphemes.
pub(crate) fn graphemes(s: &str) -> Vec<&str> {
    s.graphemes(true).collect()
}

/// Length in graphemes.
pub(crate) fn glen(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Length in graphemes as position type.
pub(crate) fn gpos(s: &str) -> upos_type {
    glen(s) as upos_type
}

/// Single ascii digit.
pub(crate) fn is_digit(g: &str) -> bool {
    g.len() == 1 && g.as_bytes()[0].is_ascii_digit()
}

/// Contains any ascii digit.
pub(crate) fn has_digit(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
}

/// Keep only the ascii digits.
pub(crate) fn extract_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Grapheme at position, if any.
#[inline]
pub(crate) fn at<'a>(g: &[&'a str], pos: usize) -> Option<&'a str> {
    g.get(pos).copied()
}

/// Grapheme slice starts with the other one.
pub(crate) fn starts_with(g: &[&str], p: &[&str]) -> bool {
    g.len() >= p.len() && g.iter().zip(p).all(|(a, b)| a == b)
}

/// Grapheme slice ends with the other one.
pub(crate) fn ends_with(g: &[&str], p: &[&str]) -> bool {
    g.len() >= p.len() && g[g.len() - p.len()..].iter().zip(p).all(|(a, b)| a == b)
}

/// Slice by grapheme positions. Out of range positions are clamped.
pub(crate) fn slice(g: &[&str], start: usize, end: usize) -> String {
    let end = end.min(g.len());
    let start = start.min(end);
    g[start..end].concat()
}
