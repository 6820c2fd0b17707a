//!
//! State of one formatted input field.
//!
//! [FieldState] runs the edit cycle. A key press may move the caret out
//! of the decoration and records the selection. The following input
//! event takes the raw text, strips the formatting, formats again and
//! puts the caret where the user expects it.
//!
//! The host owns the text widget. It sends each event with the current
//! text and selection and applies the returned [FieldEffect]s in order.
//! Deferred caret corrections are timers in the shared [Timers] queue,
//! the host polls the queue and passes each due timer back with
//! [FieldEvent::Timer].
//!
//! ```
//! use std::rc::Rc;
//! use rat_format_input::event::{InputEvent, TargetState};
//! use rat_format_input::timer::Timers;
//! use rat_format_input::{NumericFieldState, NumericFormat};
//!
//! let timers = Rc::new(Timers::new());
//! let fmt = NumericFormat::new().with_prefix("$").with_thousand_separator(true);
//! let mut state = NumericFieldState::new(fmt, timers.clone()).expect("valid");
//!
//! let r = state.handle_input(&InputEvent {
//!     target: TargetState::with_caret("12345", 5),
//! });
//! assert_eq!(r.value(), Some("$12,345"));
//! assert_eq!(state.canonical(), "12345");
//! ```
//!

use crate::caret::{resolve_caret, CaretDirection};
use crate::event::{
    EventKind, FieldEffect, FieldEvent, FieldKey, FieldOutcome, FieldResponse, HandleEvent,
    InputEvent, KeyEvent, MouseUpEvent, Regular, TargetState,
};
use crate::format::numeric::NumericFormat;
use crate::format::pattern::PatternFormat;
use crate::format::{FieldFormat, KeyContext};
use crate::glyphs::{at, gpos, graphemes};
use crate::policy::ValuePolicy;
use crate::range::{change_range_from_caret, find_change_range, ChangeMeta, TextSpan};
use crate::timer::{TimerDef, TimerEvent, TimerHandle, Timers};
use crate::value::{FieldValue, SourceInfo, ValueChange, ValueObject};
use crate::{upos_type, FormatError};
use log::debug;
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::time::Duration;

/// Field with a numeric format.
pub type NumericFieldState = FieldState<NumericFormat>;
/// Field with a pattern format.
pub type PatternFieldState = FieldState<PatternFormat>;

/// Phase of the edit cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    /// Nothing pending.
    #[default]
    Idle,
    /// A selection was recorded, waiting for the input event.
    PendingChange,
    /// Running an input event.
    Processing,
    /// Focus gained, the caret correction is still pending.
    FocusSettling,
}

/// Delays for the deferred caret corrections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTiming {
    /// Check that the host kept the caret after a write.
    pub caret: Duration,
    /// Caret correction after focus.
    pub focus: Duration,
    /// Second look at the caret after a mouse click.
    pub mouse: Duration,
}

impl Default for FieldTiming {
    fn default() -> Self {
        Self {
            caret: Duration::ZERO,
            focus: Duration::ZERO,
            mouse: Duration::from_millis(16),
        }
    }
}

/// State of one formatted field.
pub struct FieldState<F: FieldFormat> {
    format: F,
    policy: Option<Box<dyn ValuePolicy>>,
    /// Text values set by the application are canonical.
    /// None lets the format decide.
    value_is_numeric_string: Option<bool>,

    /// Last committed formatted value.
    formatted: String,
    /// Last committed canonical value.
    canonical: String,

    phase: EditPhase,
    /// Selection before the edit, used for the change range.
    snapshot: Option<TextSpan>,
    /// Selection before any caret correction by the key.
    restore: Option<TextSpan>,
    focused: bool,

    timers: Rc<Timers>,
    timing: FieldTiming,
    caret_timer: Option<TimerHandle>,
    caret_target: Option<(upos_type, String)>,
    focus_timer: Option<TimerHandle>,
    mouse_timer: Option<TimerHandle>,

    /// Caller supplied attributes. Not used by the field.
    attributes: FxHashMap<String, String>,
}

impl<F: FieldFormat> Debug for FieldState<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldState")
            .field("format", &self.format)
            .field("policy", &self.policy.as_ref().map(|_| ".."))
            .field("value_is_numeric_string", &self.value_is_numeric_string)
            .field("formatted", &self.formatted)
            .field("canonical", &self.canonical)
            .field("phase", &self.phase)
            .field("snapshot", &self.snapshot)
            .field("restore", &self.restore)
            .field("focused", &self.focused)
            .field("timing", &self.timing)
            .field("caret_timer", &self.caret_timer)
            .field("caret_target", &self.caret_target)
            .field("focus_timer", &self.focus_timer)
            .field("mouse_timer", &self.mouse_timer)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// The clone shares the timer queue but has no pending timers.
impl<F: FieldFormat + Clone> Clone for FieldState<F> {
    fn clone(&self) -> Self {
        Self {
            format: self.format.clone(),
            policy: self.policy.clone(),
            value_is_numeric_string: self.value_is_numeric_string,
            formatted: self.formatted.clone(),
            canonical: self.canonical.clone(),
            phase: EditPhase::Idle,
            snapshot: None,
            restore: None,
            focused: self.focused,
            timers: self.timers.clone(),
            timing: self.timing,
            caret_timer: None,
            caret_target: None,
            focus_timer: None,
            mouse_timer: None,
            attributes: self.attributes.clone(),
        }
    }
}

impl<F: FieldFormat> Drop for FieldState<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<F: FieldFormat> FieldState<F> {
    /// New empty field. Fails for an invalid format.
    pub fn new(format: F, timers: Rc<Timers>) -> Result<Self, FormatError> {
        if let Err(e) = format.validate() {
            debug!("invalid format {:?}: {}", format, e);
            return Err(e);
        }
        let formatted = format.format("");
        Ok(Self {
            format,
            policy: None,
            value_is_numeric_string: None,
            formatted,
            canonical: String::new(),
            phase: Default::default(),
            snapshot: None,
            restore: None,
            focused: false,
            timers,
            timing: Default::default(),
            caret_timer: None,
            caret_target: None,
            focus_timer: None,
            mouse_timer: None,
            attributes: Default::default(),
        })
    }

    /// Policy for accepting edits.
    pub fn with_policy(mut self, policy: impl ValuePolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Text values set by the application are canonical values.
    pub fn with_value_is_numeric_string(mut self, numeric: bool) -> Self {
        self.value_is_numeric_string = Some(numeric);
        self
    }

    pub fn with_timing(mut self, timing: FieldTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Initial value.
    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        let canonical = self
            .format
            .value_to_canonical(&value.into(), self.value_is_numeric_string);
        self.formatted = self.format.format(&canonical);
        self.canonical = canonical;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn formatted(&self) -> &str {
        &self.formatted
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Committed values.
    pub fn value_object(&self) -> ValueObject {
        ValueObject::new(self.formatted.as_str(), self.canonical.as_str())
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn timers(&self) -> &Rc<Timers> {
        &self.timers
    }

    pub fn attributes(&self) -> &FxHashMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|v| v.as_str())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn set_policy(&mut self, policy: Option<Box<dyn ValuePolicy>>) {
        self.policy = policy;
    }

    /// Cancels all pending timers.
    pub fn teardown(&mut self) {
        self.cancel_caret_timer();
        self.cancel_focus_timer();
        self.cancel_mouse_timer();
    }

    /// Value set by the application.
    ///
    /// If this changes the committed values, they are written and the
    /// change is notified as [EditSource::Prop](crate::value::EditSource::Prop).
    /// With focus and a target, the caret is kept at the corresponding
    /// position of the new value.
    pub fn set_value(
        &mut self,
        value: impl Into<FieldValue>,
        target: Option<&TargetState>,
    ) -> FieldResponse {
        let canonical = self
            .format
            .value_to_canonical(&value.into(), self.value_is_numeric_string);
        let formatted = self.format.format(&canonical);
        self.commit_prop(formatted, canonical, target)
    }

    /// Replaces the format and renders the current value with it.
    pub fn set_format(
        &mut self,
        format: F,
        target: Option<&TargetState>,
    ) -> Result<FieldResponse, FormatError> {
        format.validate()?;
        self.format = format;
        let canonical = self
            .format
            .value_to_canonical(&FieldValue::Text(self.canonical.clone()), Some(true));
        let formatted = self.format.format(&canonical);
        Ok(self.commit_prop(formatted, canonical, target))
    }

    fn commit_prop(
        &mut self,
        formatted: String,
        canonical: String,
        target: Option<&TargetState>,
    ) -> FieldResponse {
        if formatted == self.formatted && canonical == self.canonical {
            return FieldResponse::new(FieldOutcome::Unchanged);
        }

        let mut r = FieldResponse::new(FieldOutcome::TextChanged);
        r.push(FieldEffect::SetValue(formatted.clone()));
        if self.focused {
            if let Some(target) = target {
                let caret = self.caret_in_target(target);
                let caret =
                    resolve_caret(&self.format, &formatted, &target.value, &target.value, caret);
                self.set_patched_caret(&mut r, caret, &formatted);
            }
        }

        debug!("value set {:?} -> {:?}", self.formatted, formatted);
        let values = ValueObject::new(formatted.as_str(), canonical.as_str());
        self.formatted = formatted;
        self.canonical = canonical;
        r.push(FieldEffect::ValueChange(ValueChange {
            values,
            source: SourceInfo::prop(),
        }));
        r
    }

    /// Key pressed.
    ///
    /// Moves the caret off non-editable positions before the key is
    /// applied and records the selection for the following input.
    pub fn handle_key_down(&mut self, event: &KeyEvent) -> FieldResponse {
        let mut r = FieldResponse::new(FieldOutcome::Continue);
        let key = event.key;
        let target = &event.target;
        let value = graphemes(&target.value);
        let len = value.len() as upos_type;
        let sel = clamp_selection(target.selection, len);
        let start = sel.start;

        let expected = match key {
            FieldKey::Left | FieldKey::Backspace => Some(start.saturating_sub(1)),
            FieldKey::Right => Some((start + 1).min(len)),
            FieldKey::Delete => Some(start),
            _ => None,
        };
        // delete doesn't move the selection, but removes one more
        let end_offset = if key == FieldKey::Delete && sel.is_collapsed() {
            1
        } else {
            0
        };

        let mut current = sel;
        if let Some(expected) = expected {
            if sel.is_collapsed() || key.is_arrow() {
                let valid = |pos: upos_type| {
                    at(&value, pos as usize)
                        .map(|g| self.format.is_valid_input_char(g))
                        .unwrap_or(false)
                };
                let boundary = self.format.caret_boundary(&target.value);

                let mut caret = expected;
                match key {
                    FieldKey::Left | FieldKey::Right => {
                        let direction = if key == FieldKey::Left {
                            CaretDirection::Left
                        } else {
                            CaretDirection::Right
                        };
                        caret = boundary.snap(expected, direction);
                        if caret != expected {
                            r.push(FieldEffect::PreventDefault);
                        }
                    }
                    FieldKey::Delete if !valid(expected) => {
                        caret = boundary.snap(expected, CaretDirection::Right);
                    }
                    FieldKey::Backspace if !valid(expected) => {
                        caret = boundary.snap(expected, CaretDirection::Left);
                    }
                    _ => {}
                }

                if caret != expected {
                    self.set_patched_caret(&mut r, caret, &target.value);
                    current = TextSpan::caret(caret);
                }
            }
        }

        let directive = self.format.key_down(&KeyContext {
            key: &key,
            value: &target.value,
            selection: current,
        });
        if let Some(caret) = directive.caret {
            let caret = caret.min(len);
            r.push(FieldEffect::SetSelection(TextSpan::caret(caret)));
            current = TextSpan::caret(caret);
        }
        if directive.prevent_default && !r.is_prevented() {
            r.push(FieldEffect::PreventDefault);
        }
        if !directive.suppress_forward {
            r.push(FieldEffect::Forward(EventKind::KeyDown));
        }

        if key.is_navigation() || r.is_prevented() {
            self.snapshot = None;
            self.restore = None;
            if self.phase == EditPhase::PendingChange {
                self.phase = EditPhase::Idle;
            }
        } else {
            self.snapshot = Some(TextSpan::new(current.start, current.end + end_offset));
            self.restore = Some(sel);
            if self.phase != EditPhase::FocusSettling {
                self.phase = EditPhase::PendingChange;
            }
        }

        if r.is_prevented() || r.selection().is_some() {
            r.raise(FieldOutcome::Changed);
        }
        r
    }

    /// The host changed the text.
    pub fn handle_input(&mut self, event: &InputEvent) -> FieldResponse {
        self.cancel_focus_timer();
        self.phase = EditPhase::Processing;

        let target = &event.target;
        let input = target.value.as_str();
        let len = gpos(input);
        let sel = clamp_selection(target.selection, len);
        let caret = sel.start.max(sel.end);

        let range = match self.snapshot.take() {
            Some(snapshot) => change_range_from_caret(snapshot, caret),
            None => find_change_range(&self.formatted, input),
        };
        let meta = ChangeMeta::new(range, self.formatted.as_str());

        let canonical = self.format.remove_formatting(input, Some(&meta));
        let formatted = self.format.format(&canonical);
        // formatting can drop input, the canonical value must match
        // what is shown
        let canonical = self.format.remove_formatting(&formatted, None);
        let values = ValueObject::new(formatted.as_str(), canonical.as_str());

        let restore = self.restore.take();
        self.phase = EditPhase::Idle;

        if !self.is_allowed(&values) {
            debug!("rejected {:?}", values);
            // a caret patched by the key must not come back later
            self.cancel_caret_timer();
            let selection = match restore {
                Some(sel) => sel,
                None => TextSpan::caret(resolve_caret(
                    &self.format,
                    &self.formatted,
                    &self.formatted,
                    input,
                    caret,
                )),
            };
            let mut r = FieldResponse::new(FieldOutcome::Unchanged);
            r.push(FieldEffect::SetValue(self.formatted.clone()));
            r.push(FieldEffect::SetSelection(selection));
            return r;
        }

        let mut r = FieldResponse::new(FieldOutcome::Changed);
        r.push(FieldEffect::SetValue(formatted.clone()));
        let new_caret = resolve_caret(&self.format, &formatted, &self.formatted, input, caret);
        self.set_patched_caret(&mut r, new_caret, &formatted);

        let changed = formatted != self.formatted;
        self.formatted = formatted;
        self.canonical = canonical;
        if changed {
            r.raise(FieldOutcome::TextChanged);
            r.push(FieldEffect::ValueChange(ValueChange {
                values,
                source: SourceInfo::event(EventKind::Input),
            }));
        }
        r.push(FieldEffect::Forward(EventKind::Input));
        r
    }

    /// Mouse released.
    ///
    /// Corrects a caret on a non-editable position and looks again after
    /// the host had time to settle the selection.
    pub fn handle_mouse_up(&mut self, event: &MouseUpEvent) -> FieldResponse {
        let mut r = FieldResponse::new(FieldOutcome::Continue);
        let len = gpos(&event.target.value);
        let mut sel = clamp_selection(event.target.selection, len);

        if let Some(caret) = self.correct_caret(&mut r, &event.target) {
            sel = TextSpan::caret(caret);
            r.raise(FieldOutcome::Changed);
        }

        self.cancel_mouse_timer();
        self.mouse_timer = Some(self.timers.add(TimerDef::new().timer(self.timing.mouse)));

        r.push(FieldEffect::Forward(EventKind::MouseUp));

        self.snapshot = Some(sel);
        self.restore = Some(sel);
        if self.phase != EditPhase::FocusSettling {
            self.phase = EditPhase::PendingChange;
        }
        r
    }

    /// Focus gained. The caret correction is deferred.
    pub fn handle_focus(&mut self) -> FieldResponse {
        self.focused = true;
        self.cancel_focus_timer();
        self.focus_timer = Some(self.timers.add(TimerDef::new().timer(self.timing.focus)));
        self.phase = EditPhase::FocusSettling;
        FieldResponse::new(FieldOutcome::Unchanged)
    }

    /// Focus lost. Cancels all timers and cleans up the value.
    pub fn handle_blur(&mut self) -> FieldResponse {
        self.focused = false;
        self.teardown();
        self.snapshot = None;
        self.restore = None;
        self.phase = EditPhase::Idle;

        let mut r = FieldResponse::new(FieldOutcome::Continue);
        let canonical = self.format.normalize_on_blur(&self.canonical);
        if canonical != self.canonical {
            let formatted = self.format.format(&canonical);
            debug!("blur {:?} -> {:?}", self.canonical, canonical);
            r.raise(FieldOutcome::TextChanged);
            r.push(FieldEffect::SetValue(formatted.clone()));
            r.push(FieldEffect::ValueChange(ValueChange {
                values: ValueObject::new(formatted.as_str(), canonical.as_str()),
                source: SourceInfo::event(EventKind::Blur),
            }));
            self.formatted = formatted;
            self.canonical = canonical;
        }
        r.push(FieldEffect::Forward(EventKind::Blur));
        r
    }

    /// One of the field's timers fired.
    pub fn handle_timer(&mut self, event: &TimerEvent, target: &TargetState) -> FieldResponse {
        let handle = event.0.handle;
        let mut r = FieldResponse::new(FieldOutcome::Continue);

        if self.caret_timer == Some(handle) {
            self.caret_timer = None;
            r.raise(FieldOutcome::Unchanged);
            if let Some((caret, value)) = self.caret_target.take() {
                if target.value == value && target.selection.start != caret {
                    r.push(FieldEffect::SetSelection(TextSpan::caret(caret)));
                    r.raise(FieldOutcome::Changed);
                }
            }
        } else if self.focus_timer == Some(handle) {
            self.focus_timer = None;
            r.raise(FieldOutcome::Unchanged);

            let len = gpos(&target.value);
            let sel = clamp_selection(target.selection, len);
            let all_selected = sel.start == 0 && sel.end == len;
            let caret = self
                .format
                .caret_boundary(&target.value)
                .snap(sel.start, CaretDirection::Right);
            if caret != sel.start && !all_selected {
                self.set_patched_caret(&mut r, caret, &target.value);
                r.raise(FieldOutcome::Changed);
            }
            r.push(FieldEffect::Forward(EventKind::Focus));

            if self.phase == EditPhase::FocusSettling {
                self.phase = if self.snapshot.is_some() {
                    EditPhase::PendingChange
                } else {
                    EditPhase::Idle
                };
            }
        } else if self.mouse_timer == Some(handle) {
            self.mouse_timer = None;
            r.raise(FieldOutcome::Unchanged);
            if let Some(caret) = self.correct_caret(&mut r, target) {
                if self.snapshot.is_some() {
                    self.snapshot = Some(TextSpan::caret(caret));
                    self.restore = Some(TextSpan::caret(caret));
                }
                r.raise(FieldOutcome::Changed);
            }
        }
        r
    }

    fn is_allowed(&self, values: &ValueObject) -> bool {
        match &self.policy {
            Some(policy) => policy.is_allowed(values),
            None => true,
        }
    }

    fn caret_in_target(&self, target: &TargetState) -> upos_type {
        let sel = clamp_selection(target.selection, gpos(&target.value));
        sel.start.max(sel.end)
    }

    /// Moves a collapsed caret off a non-editable position.
    fn correct_caret(&mut self, r: &mut FieldResponse, target: &TargetState) -> Option<upos_type> {
        let len = gpos(&target.value);
        let sel = clamp_selection(target.selection, len);
        if !sel.is_collapsed() {
            return None;
        }
        let caret = self
            .format
            .caret_boundary(&target.value)
            .snap(sel.start, CaretDirection::Right);
        if caret != sel.start {
            self.set_patched_caret(r, caret, &target.value);
            Some(caret)
        } else {
            None
        }
    }

    /// Writes the caret and checks again after the host is done.
    fn set_patched_caret(&mut self, r: &mut FieldResponse, caret: upos_type, value: &str) {
        r.push(FieldEffect::SetSelection(TextSpan::caret(caret)));
        self.cancel_caret_timer();
        self.caret_timer = Some(self.timers.add(TimerDef::new().timer(self.timing.caret)));
        self.caret_target = Some((caret, value.to_string()));
    }

    fn cancel_caret_timer(&mut self) {
        if let Some(h) = self.caret_timer.take() {
            self.timers.remove(h);
        }
        self.caret_target = None;
    }

    fn cancel_focus_timer(&mut self) {
        if let Some(h) = self.focus_timer.take() {
            self.timers.remove(h);
        }
        if self.phase == EditPhase::FocusSettling {
            self.phase = EditPhase::Idle;
        }
    }

    fn cancel_mouse_timer(&mut self) {
        if let Some(h) = self.mouse_timer.take() {
            self.timers.remove(h);
        }
    }
}

fn clamp_selection(sel: TextSpan, len: upos_type) -> TextSpan {
    let start = sel.start.min(len);
    let end = sel.end.min(len);
    TextSpan::new(start.min(end), start.max(end))
}

impl<F: FieldFormat> HandleEvent<FieldEvent, Regular, FieldResponse> for FieldState<F> {
    fn handle(&mut self, event: &FieldEvent, _qualifier: Regular) -> FieldResponse {
        match event {
            FieldEvent::KeyDown(e) => self.handle_key_down(e),
            FieldEvent::Input(e) => self.handle_input(e),
            FieldEvent::MouseUp(e) => self.handle_mouse_up(e),
            FieldEvent::Focus => self.handle_focus(),
            FieldEvent::Blur => self.handle_blur(),
            FieldEvent::Timer(t, target) => self.handle_timer(t, target),
        }
    }
}

/// Handle all events.
pub fn handle_events<F: FieldFormat>(
    state: &mut FieldState<F>,
    event: &FieldEvent,
) -> FieldResponse {
    state.handle(event, Regular)
}
