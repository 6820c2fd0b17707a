//!
//! Accept or reject an edit.
//!
//! The policy sees the value an edit would produce. If it says no, the
//! field goes back to the state before the keystroke.
//!
//! Any `Fn(&ValueObject) -> bool + Clone` is a policy.
//!

use crate::value::ValueObject;
use dyn_clone::DynClone;

/// Accepts or rejects a candidate value.
pub trait ValuePolicy: DynClone {
    fn is_allowed(&self, values: &ValueObject) -> bool;
}

dyn_clone::clone_trait_object!(ValuePolicy);

impl<T> ValuePolicy for T
where
    T: Fn(&ValueObject) -> bool + Clone,
{
    fn is_allowed(&self, values: &ValueObject) -> bool {
        self(values)
    }
}

/// Limits the float value to a range. Empty values are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePolicy {
    pub min: f64,
    pub max: f64,
}

impl RangePolicy {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl ValuePolicy for RangePolicy {
    fn is_allowed(&self, values: &ValueObject) -> bool {
        match values.float_value {
            Some(v) => v >= self.min && v <= self.max,
            None => true,
        }
    }
}
