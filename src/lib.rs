#![doc = include_str!("../readme.md")]
#![allow(clippy::uninlined_format_args)]
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub mod caret;
pub mod crossterm;
pub mod event;
pub mod field;
pub mod format;
pub mod policy;
pub mod range;
pub mod timer;
pub mod value;

mod glyphs;

pub use caret::{caret_position, resolve_caret, CaretBoundary, CaretDirection, CharMatch};
pub use field::{EditPhase, FieldState, FieldTiming, NumericFieldState, PatternFieldState};
pub use format::numeric::{GroupStyle, NumericFormat, ThousandSeparator};
pub use format::pattern::{PatternFormat, PatternMask};
pub use format::{
    numeric_formatter, pattern_formatter, remove_numeric_format, remove_pattern_format,
    FieldFormat, KeyContext, KeyDirective,
};
pub use policy::ValuePolicy;
pub use range::{change_range_from_caret, find_change_range, ChangeMeta, ChangeRange, TextSpan};
pub use value::{EditSource, FieldValue, SourceInfo, ValueChange, ValueObject};

/// Configuration errors.
///
/// These are reported when a format is constructed or a field
/// is created. Editing itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    /// Thousand separator and decimal separator are the same.
    SeparatorClash {
        thousand: String,
        decimal: String,
    },
    /// The decimal separator is empty.
    EmptyDecimalSeparator,
    /// The pattern char is empty.
    EmptyPatternChar,
    /// A mask placeholder contains a digit.
    NumericMask(String),
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::SeparatorClash { thousand, decimal } => write!(
                f,
                "decimal separator can't be the same as the thousand separator: thousand={:?} decimal={:?}",
                thousand, decimal
            ),
            FormatError::EmptyDecimalSeparator => write!(f, "decimal separator is empty"),
            FormatError::EmptyPatternChar => write!(f, "pattern char is empty"),
            FormatError::NumericMask(mask) => {
                write!(f, "mask {:?} must not contain a digit", mask)
            }
        }
    }
}

impl Error for FormatError {}

/// Caret positions and text ranges are counted in graphemes.
#[allow(non_camel_case_types)]
pub type upos_type = u32;

mod _private {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct NonExhaustive;
}
