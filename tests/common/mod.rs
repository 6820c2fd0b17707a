#![allow(dead_code)]

use rat_format_input::event::{
    EventKind, FieldEffect, FieldEvent, FieldKey, FieldResponse, HandleEvent, InputEvent,
    KeyEvent, MouseUpEvent, Regular, TargetState,
};
use rat_format_input::timer::Timers;
use rat_format_input::{upos_type, FieldFormat, FieldState, TextSpan, ValueChange};
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

/// Logs to stderr. Only the first call installs the logger.
pub fn setup_logging() {
    _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply();
}

/// A text widget that holds the field's text and selection,
/// applies the effects and edits the text the way a native
/// input does.
#[derive(Debug)]
pub struct Host<F: FieldFormat> {
    pub state: FieldState<F>,
    pub timers: Rc<Timers>,
    pub value: String,
    pub selection: TextSpan,
    pub changes: Vec<ValueChange>,
    pub forwarded: Vec<EventKind>,
}

impl<F: FieldFormat> Host<F> {
    pub fn new(format: F) -> Self {
        let timers = Rc::new(Timers::new());
        let state = FieldState::new(format, timers.clone()).expect("valid format");
        Self::with_state(state)
    }

    /// Host for an existing state. Takes the committed value as text.
    pub fn with_state(state: FieldState<F>) -> Self {
        setup_logging();
        let timers = state.timers().clone();
        let value = state.formatted().to_string();
        Self {
            state,
            timers,
            value,
            selection: TextSpan::default(),
            changes: Vec::new(),
            forwarded: Vec::new(),
        }
    }

    pub fn target(&self) -> TargetState {
        TargetState::new(self.value.clone(), self.selection)
    }

    pub fn caret(&self) -> upos_type {
        self.selection.start
    }

    /// Applies the effects. Returns true if the default was prevented.
    pub fn apply(&mut self, r: &FieldResponse) -> bool {
        let mut prevented = false;
        for effect in &r.effects {
            match effect {
                FieldEffect::SetValue(v) => {
                    self.value = v.clone();
                    let len = glen(&self.value);
                    self.selection = TextSpan::new(
                        self.selection.start.min(len),
                        self.selection.end.min(len),
                    );
                }
                FieldEffect::SetSelection(s) => self.selection = *s,
                FieldEffect::ValueChange(c) => self.changes.push(c.clone()),
                FieldEffect::PreventDefault => prevented = true,
                FieldEffect::Forward(kind) => self.forwarded.push(*kind),
            }
        }
        prevented
    }

    pub fn send(&mut self, event: FieldEvent) -> FieldResponse {
        let r = self.state.handle(&event, Regular);
        self.apply(&r);
        r
    }

    /// Runs all pending timers.
    pub fn drain_timers(&mut self) {
        for _ in 0..100 {
            let Some(sleep) = self.timers.sleep_time() else {
                return;
            };
            std::thread::sleep(sleep);
            while let Some(t) = self.timers.read() {
                self.send(FieldEvent::Timer(t, self.target()));
            }
        }
        panic!("timers don't settle");
    }

    pub fn focus(&mut self) {
        self.send(FieldEvent::Focus);
        self.drain_timers();
    }

    pub fn blur(&mut self) -> FieldResponse {
        self.send(FieldEvent::Blur)
    }

    pub fn select(&mut self, start: upos_type, end: upos_type) {
        self.selection = TextSpan::new(start, end);
    }

    pub fn click(&mut self, pos: upos_type) -> FieldResponse {
        self.selection = TextSpan::caret(pos);
        let r = self.send(FieldEvent::MouseUp(MouseUpEvent {
            target: self.target(),
        }));
        self.drain_timers();
        r
    }

    /// Key press. If the field doesn't prevent it, the key is applied
    /// to the text and an input event follows when the text changed.
    /// Returns the response to the key and the one to the input.
    pub fn key(&mut self, key: FieldKey) -> (FieldResponse, Option<FieldResponse>) {
        let rk = self.state.handle(
            &FieldEvent::KeyDown(KeyEvent {
                key,
                target: self.target(),
            }),
            Regular,
        );
        let prevented = self.apply(&rk);

        let mut ri = None;
        if !prevented && self.native_key(key) {
            ri = Some(self.send(FieldEvent::Input(InputEvent {
                target: self.target(),
            })));
        }
        self.drain_timers();
        (rk, ri)
    }

    pub fn type_str(&mut self, s: &str) {
        for c in s.chars() {
            self.key(FieldKey::Char(c));
        }
    }

    /// Replaces the selection with the text and sends the input.
    pub fn paste(&mut self, s: &str) -> FieldResponse {
        self.replace_selection(s);
        let r = self.send(FieldEvent::Input(InputEvent {
            target: self.target(),
        }));
        self.drain_timers();
        r
    }

    fn replace_selection(&mut self, s: &str) {
        let mut g = graphemes(&self.value);
        let len = g.len();
        let start = (self.selection.start as usize).min(len);
        let end = (self.selection.end as usize).clamp(start, len);
        let ins = graphemes(s);
        let caret = start + ins.len();
        g.splice(start..end, ins);
        self.value = g.concat();
        self.selection = TextSpan::caret(caret as upos_type);
    }

    /// Returns true if the text changed.
    fn native_key(&mut self, key: FieldKey) -> bool {
        let len = glen(&self.value);
        let sel = self.selection;
        match key {
            FieldKey::Char(c) => {
                self.replace_selection(&c.to_string());
                true
            }
            FieldKey::Backspace | FieldKey::Delete if !sel.is_empty() => {
                self.replace_selection("");
                true
            }
            FieldKey::Backspace => {
                if sel.start == 0 {
                    return false;
                }
                self.selection = TextSpan::new(sel.start - 1, sel.start);
                self.replace_selection("");
                true
            }
            FieldKey::Delete => {
                if sel.start >= len {
                    return false;
                }
                self.selection = TextSpan::new(sel.start, sel.start + 1);
                self.replace_selection("");
                true
            }
            FieldKey::Left => {
                self.selection = TextSpan::caret(sel.start.saturating_sub(1));
                false
            }
            FieldKey::Right => {
                self.selection = TextSpan::caret((sel.start + 1).min(len));
                false
            }
            FieldKey::Home => {
                self.selection = TextSpan::caret(0);
                false
            }
            FieldKey::End => {
                self.selection = TextSpan::caret(len);
                false
            }
            _ => false,
        }
    }
}

pub fn graphemes(s: &str) -> Vec<&str> {
    s.graphemes(true).collect()
}

pub fn glen(s: &str) -> upos_type {
    s.graphemes(true).count() as upos_type
}
