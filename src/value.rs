//!
//! Values going in and out of a field.
//!

use crate::event::EventKind;
use crate::format::num_str::parse_float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Formatted and canonical value, as given to the policy
/// and the value change notification.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueObject {
    pub formatted_value: String,
    /// Canonical value.
    pub value: String,
    /// Canonical value as float, if it has any digits.
    pub float_value: Option<f64>,
}

impl ValueObject {
    pub fn new(formatted_value: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            formatted_value: formatted_value.into(),
            float_value: parse_float(&value),
            value,
        }
    }
}

/// What caused a value change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EditSource {
    /// User input.
    #[default]
    Event,
    /// Value set by the application.
    Prop,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub source: EditSource,
    /// The event, for [EditSource::Event].
    pub event: Option<EventKind>,
}

impl SourceInfo {
    pub fn event(kind: EventKind) -> Self {
        Self {
            source: EditSource::Event,
            event: Some(kind),
        }
    }

    pub fn prop() -> Self {
        Self {
            source: EditSource::Prop,
            event: None,
        }
    }
}

/// Value change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub values: ValueObject,
    pub source: SourceInfo,
}

/// A value set by the application.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum FieldValue {
    #[default]
    Empty,
    Number(f64),
    /// Either a canonical value or a formatted one.
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => FieldValue::Empty,
        }
    }
}
