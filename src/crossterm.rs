//!
//! Maps crossterm events to field events.
//!
//! A terminal doesn't send input events. The host applies the key to
//! its text itself and sends a [FieldEvent::Input] afterwards, the
//! conversion here only covers keys, focus and the mouse.
//!

use crate::event::{FieldEvent, FieldKey, KeyEvent, MouseUpEvent, TargetState};
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};

/// A copy of the crossterm-KeyModifiers the mapping cares about.
pub(crate) mod modifiers {
    use crossterm::event::KeyModifiers;

    pub(crate) const NONE: KeyModifiers = KeyModifiers::NONE;
    pub(crate) const SHIFT: KeyModifiers = KeyModifiers::SHIFT;
}

/// Key of a press or repeat event.
///
/// Characters with any modifier other than shift are
/// [FieldKey::Other]. Releases give None.
pub fn field_key(event: &crossterm::event::KeyEvent) -> Option<FieldKey> {
    if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }

    let key = match event.code {
        KeyCode::Char(c) => {
            if event.modifiers == modifiers::NONE || event.modifiers == modifiers::SHIFT {
                FieldKey::Char(c)
            } else {
                FieldKey::Other
            }
        }
        KeyCode::Backspace => FieldKey::Backspace,
        KeyCode::Delete => FieldKey::Delete,
        KeyCode::Left => FieldKey::Left,
        KeyCode::Right => FieldKey::Right,
        KeyCode::Up => FieldKey::Up,
        KeyCode::Down => FieldKey::Down,
        KeyCode::Home => FieldKey::Home,
        KeyCode::End => FieldKey::End,
        KeyCode::Tab | KeyCode::BackTab => FieldKey::Tab,
        KeyCode::Enter => FieldKey::Enter,
        _ => FieldKey::Other,
    };
    Some(key)
}

/// Field event for a crossterm event.
///
/// The target is the state of the text before the event.
pub fn field_event(event: &Event, target: &TargetState) -> Option<FieldEvent> {
    match event {
        Event::Key(key) => field_key(key).map(|key| {
            FieldEvent::KeyDown(KeyEvent {
                key,
                target: target.clone(),
            })
        }),
        Event::FocusGained => Some(FieldEvent::Focus),
        Event::FocusLost => Some(FieldEvent::Blur),
        Event::Mouse(m) if m.kind == MouseEventKind::Up(MouseButton::Left) => {
            Some(FieldEvent::MouseUp(MouseUpEvent {
                target: target.clone(),
            }))
        }
        _ => None,
    }
}
