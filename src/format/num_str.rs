//!
//! String arithmetic on canonical numbers.
//!
//! Canonical numbers are strings with an optional leading `-`, digits
//! and at most one `.`. Everything here works on the strings directly,
//! there is no round trip through floats.
//!

use crate::format::numeric::GroupStyle;

/// Canonical number split at the decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDecimal<'a> {
    pub before: &'a str,
    pub after: &'a str,
    /// The number starts with `-`.
    pub has_negation: bool,
    /// The number starts with `-` and negative numbers are allowed.
    pub add_negation: bool,
}

pub fn split_decimal(num: &str, allow_negative: bool) -> SplitDecimal<'_> {
    let (has_negation, num) = match num.strip_prefix('-') {
        Some(v) => (true, v),
        None => (false, num),
    };
    let mut parts = num.split('.');
    let before = parts.next().unwrap_or_default();
    let after = parts.next().unwrap_or_default();
    SplitDecimal {
        before,
        after,
        has_negation,
        add_negation: has_negation && allow_negative,
    }
}

/// Cuts the fraction to `scale` digits. With `fixed` it pads with zeros.
pub fn limit_to_scale(fraction: &str, scale: u32, fixed: bool) -> String {
    let mut s = String::new();
    let mut it = fraction.chars();
    for _ in 0..scale {
        match it.next() {
            Some(c) => s.push(c),
            None if fixed => s.push('0'),
            None => break,
        }
    }
    s
}

/// Adds one to a string of digits.
fn increment(digits: &str) -> String {
    let mut buf = digits.as_bytes().to_vec();
    let mut i = buf.len();
    loop {
        if i == 0 {
            buf.insert(0, b'1');
            break;
        }
        i -= 1;
        if buf[i] == b'9' {
            buf[i] = b'0';
        } else {
            buf[i] += 1;
            break;
        }
    }
    String::from_utf8(buf).unwrap_or_default()
}

/// Rounds half-up to `scale` fraction digits.
///
/// A carry out of the fraction goes into the integer part. An empty
/// integer part becomes `0`. `""` and `"-"` stay as they are.
pub fn round_to_precision(num: &str, scale: u32, fixed: bool) -> String {
    if num.is_empty() || num == "-" {
        return num.to_string();
    }

    let with_separator = (num.contains('.') || fixed) && scale > 0;
    let split = split_decimal(num, true);
    let scale_len = scale as usize;

    let (carry, fraction) = if split.after.len() <= scale_len {
        (false, split.after.to_string())
    } else {
        let kept = &split.after[..scale_len];
        let round_up = split.after.as_bytes()[scale_len] >= b'5';
        if !round_up {
            (false, kept.to_string())
        } else if kept.is_empty() {
            (true, String::new())
        } else {
            let inc = increment(kept);
            if inc.len() > kept.len() {
                (true, inc[1..].to_string())
            } else {
                (false, inc)
            }
        }
    };

    let integer = if split.before.is_empty() {
        (if carry { "1" } else { "0" }).to_string()
    } else if carry {
        increment(split.before)
    } else {
        split.before.to_string()
    };

    let fraction = limit_to_scale(&fraction, scale, fixed);

    let mut s = String::new();
    if split.has_negation {
        s.push('-');
    }
    s.push_str(&integer);
    if with_separator {
        s.push('.');
    }
    s.push_str(&fraction);
    s
}

/// Inserts the thousand separator into the integer part.
///
/// Leading zeros are not grouped.
pub fn apply_thousand_separator(integer: &str, separator: &str, style: GroupStyle) -> String {
    let idx = integer
        .find(|c: char| ('1'..='9').contains(&c))
        .unwrap_or(integer.len());
    let (head, digits) = integer.split_at(idx);
    let n = digits.chars().count();

    let mut s = String::from(head);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 {
            let remaining = n - i;
            let split = match style {
                GroupStyle::Thousand => remaining % 3 == 0,
                GroupStyle::Wan => remaining % 4 == 0,
                GroupStyle::Lakh => remaining >= 3 && remaining % 2 == 1,
                GroupStyle::None => false,
            };
            if split {
                s.push_str(separator);
            }
        }
        s.push(c);
    }
    s
}

/// Removes leading zeros of the integer part, keeps at least one `0`.
pub fn fix_leading_zero(num: &str) -> String {
    if num.is_empty() {
        return String::new();
    }
    let split = split_decimal(num, true);
    let before = split.before.trim_start_matches('0');
    let before = if before.is_empty() { "0" } else { before };

    let mut s = String::new();
    if split.has_negation {
        s.push('-');
    }
    s.push_str(before);
    if !split.after.is_empty() {
        s.push('.');
        s.push_str(split.after);
    }
    s
}

/// Canonical string for a number. Not finite numbers give an empty string.
pub fn to_numeric_string(value: f64) -> String {
    if !value.is_finite() {
        String::new()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        // Display never uses exponent notation for f64.
        format!("{}", value)
    }
}

/// Looks like a canonical number: optional `-`, digits,
/// optional `.` and digits, at least one digit.
pub fn is_canonical_number(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let mut parts = s.split('.');
    let before = parts.next().unwrap_or_default();
    let after = parts.next().unwrap_or_default();
    parts.next().is_none()
        && before.bytes().all(|b| b.is_ascii_digit())
        && after.bytes().all(|b| b.is_ascii_digit())
        && before.len() + after.len() > 0
}

/// Float value of a canonical number, if any.
pub fn parse_float(num: &str) -> Option<f64> {
    if !num.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    num.parse::<f64>().ok()
}
