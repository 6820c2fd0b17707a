//!
//! Event-handler traits, the events a field understands and
//! the effects it produces.
//!
//! The field never touches the text directly. The host sends the
//! current text with each event and gets back a list of
//! [FieldEffect]s it has to apply, in order.
//!

use crate::range::TextSpan;
use crate::timer::TimerEvent;
use crate::upos_type;
use crate::value::ValueChange;
use std::cmp::max;

/// All the regular and expected event-handling a field can do.
#[derive(Debug, Default, Clone, Copy)]
pub struct Regular;

///
/// A very broad trait for an event handler.
///
/// * Event - The actual event type.
/// * Qualifier - Allows more than one event-handler for the same
///   state. This library only uses [Regular].
/// * Return - Result of event-handling. There should be one value that
///   indicates 'I don't know this event', see [ConsumedEvent].
///
pub trait HandleEvent<Event, Qualifier, Return>
where
    Return: ConsumedEvent,
{
    /// Handle an event.
    fn handle(&mut self, event: &Event, qualifier: Qualifier) -> Return;
}

/// When calling multiple event-handlers, the minimum information required
/// from the result is consumed the event/didn't consume the event.
pub trait ConsumedEvent {
    /// Is this the 'consumed' result.
    fn is_consumed(&self) -> bool;

    /// Or-Else chaining with `is_consumed()` as the split.
    #[inline(always)]
    fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Self,
        Self: Sized,
    {
        if self.is_consumed() {
            self
        } else {
            f()
        }
    }

    /// Then-chaining. Returns max(self, f()).
    #[inline(always)]
    fn and<F>(self, f: F) -> Self
    where
        Self: Sized + Ord,
        F: FnOnce() -> Self,
    {
        max(self, f())
    }
}

/// Keys the field cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// A printable character.
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Tab,
    Enter,
    /// Anything else. Might still change the text.
    Other,
}

impl FieldKey {
    /// Only moves the caret, never changes the text.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            FieldKey::Left
                | FieldKey::Right
                | FieldKey::Up
                | FieldKey::Down
                | FieldKey::Home
                | FieldKey::End
                | FieldKey::Tab
                | FieldKey::Enter
        )
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self, FieldKey::Left | FieldKey::Right)
    }
}

/// Text and selection of the field as the host sees it right now.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TargetState {
    pub value: String,
    pub selection: TextSpan,
}

impl TargetState {
    pub fn new(value: impl Into<String>, selection: TextSpan) -> Self {
        Self {
            value: value.into(),
            selection,
        }
    }

    /// With a collapsed selection.
    pub fn with_caret(value: impl Into<String>, caret: upos_type) -> Self {
        Self::new(value, TextSpan::caret(caret))
    }
}

/// Key pressed, before the host applied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: FieldKey,
    pub target: TargetState,
}

/// The host changed the text. Contains the text and the selection
/// after the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub target: TargetState,
}

/// Mouse button released over the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseUpEvent {
    pub target: TargetState,
}

/// Everything a field handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    KeyDown(KeyEvent),
    Input(InputEvent),
    MouseUp(MouseUpEvent),
    Focus,
    Blur,
    /// A timer from the field's queue fired. Comes with the current
    /// state of the text.
    Timer(TimerEvent, TargetState),
}

/// Kinds of events, used for forwarding and change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    KeyDown,
    Input,
    MouseUp,
    Focus,
    Blur,
}

/// Things the host must do.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEffect {
    /// Replace the text.
    SetValue(String),
    /// Set the selection/caret.
    SetSelection(TextSpan),
    /// Notify the application about a new value.
    ValueChange(ValueChange),
    /// Don't apply the key.
    PreventDefault,
    /// Pass the event on to the application.
    Forward(EventKind),
}

/// Result of event handling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldOutcome {
    /// The given event has not been used at all.
    #[default]
    Continue,
    /// The event has been recognized, but the result was nil.
    /// Further processing for this event may stop.
    Unchanged,
    /// The event has been recognized and there is some change
    /// due to it.
    /// Further processing for this event may stop.
    /// Rendering the ui is advised.
    Changed,
    /// Text content has changed.
    TextChanged,
}

impl ConsumedEvent for FieldOutcome {
    fn is_consumed(&self) -> bool {
        *self != FieldOutcome::Continue
    }
}

// Useful for converting most navigation/edit results.
impl From<bool> for FieldOutcome {
    fn from(value: bool) -> Self {
        if value {
            FieldOutcome::Changed
        } else {
            FieldOutcome::Unchanged
        }
    }
}

/// Outcome and the effects for the host.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldResponse {
    pub outcome: FieldOutcome,
    pub effects: Vec<FieldEffect>,
}

impl ConsumedEvent for FieldResponse {
    fn is_consumed(&self) -> bool {
        self.outcome.is_consumed()
    }
}

impl From<FieldOutcome> for FieldResponse {
    fn from(outcome: FieldOutcome) -> Self {
        Self {
            outcome,
            effects: Vec::new(),
        }
    }
}

impl FieldResponse {
    pub fn new(outcome: FieldOutcome) -> Self {
        outcome.into()
    }

    pub(crate) fn push(&mut self, effect: FieldEffect) {
        self.effects.push(effect);
    }

    /// Raise the outcome, never lower it.
    pub(crate) fn raise(&mut self, outcome: FieldOutcome) {
        self.outcome = max(self.outcome, outcome);
    }

    /// Last text written.
    pub fn value(&self) -> Option<&str> {
        self.effects.iter().rev().find_map(|v| match v {
            FieldEffect::SetValue(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Last selection written.
    pub fn selection(&self) -> Option<TextSpan> {
        self.effects.iter().rev().find_map(|v| match v {
            FieldEffect::SetSelection(s) => Some(*s),
            _ => None,
        })
    }

    /// Value change notification, if any.
    pub fn value_change(&self) -> Option<&ValueChange> {
        self.effects.iter().find_map(|v| match v {
            FieldEffect::ValueChange(c) => Some(c),
            _ => None,
        })
    }

    pub fn is_prevented(&self) -> bool {
        self.effects.contains(&FieldEffect::PreventDefault)
    }

    pub fn is_forwarded(&self, kind: EventKind) -> bool {
        self.effects.contains(&FieldEffect::Forward(kind))
    }
}
