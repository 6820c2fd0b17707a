mod common;

use common::Host;
use rat_format_input::event::{EventKind, FieldKey, FieldOutcome, InputEvent, TargetState};
use rat_format_input::policy::RangePolicy;
use rat_format_input::timer::Timers;
use rat_format_input::{
    EditPhase, EditSource, FieldState, FormatError, NumericFieldState, NumericFormat,
    PatternFieldState, PatternFormat, TextSpan,
};
use std::rc::Rc;

fn numeric(fmt: NumericFormat, value: &str) -> Host<NumericFormat> {
    let state = NumericFieldState::new(fmt, Rc::new(Timers::new()))
        .expect("valid")
        .with_value(value);
    Host::with_state(state)
}

fn pattern(fmt: PatternFormat, value: &str) -> Host<PatternFormat> {
    let state = PatternFieldState::new(fmt, Rc::new(Timers::new()))
        .expect("valid")
        .with_value(value);
    Host::with_state(state)
}

#[test]
fn test_insert_digit() {
    let fmt = NumericFormat::new()
        .with_prefix("$")
        .with_thousand_separator(true);
    let mut h = numeric(fmt, "$12,345");
    assert_eq!(h.value, "$12,345");
    assert_eq!(h.state.canonical(), "12345");

    h.select(2, 2);
    let (_, ri) = h.key(FieldKey::Char('8'));
    assert_eq!(h.value, "$182,345");
    assert_eq!(h.caret(), 3);
    assert_eq!(h.state.canonical(), "182345");

    let ri = ri.expect("input");
    assert_eq!(ri.outcome, FieldOutcome::TextChanged);
    let change = ri.value_change().expect("change");
    assert_eq!(change.values.value, "182345");
    assert_eq!(change.values.formatted_value, "$182,345");
    assert_eq!(change.values.float_value, Some(182345.0));
    assert_eq!(change.source.source, EditSource::Event);
    assert_eq!(change.source.event, Some(EventKind::Input));
    assert!(ri.is_forwarded(EventKind::Input));
    assert_eq!(h.changes.len(), 1);
}

#[test]
fn test_fixed_scale_clear_and_type() {
    let fmt = NumericFormat::new()
        .with_decimal_scale(2)
        .with_fixed_decimal_scale(true);
    let state = NumericFieldState::new(fmt, Rc::new(Timers::new()))
        .expect("valid")
        .with_value(0.0);
    let mut h = Host::with_state(state);
    assert_eq!(h.value, "0.00");

    h.select(0, 4);
    h.key(FieldKey::Backspace);
    assert_eq!(h.value, "");
    assert_eq!(h.state.canonical(), "");

    h.key(FieldKey::Char('1'));
    assert_eq!(h.value, "1.00");
    assert_eq!(h.caret(), 1);
    assert_eq!(h.state.canonical(), "1.00");
}

#[test]
fn test_pattern_backspace() {
    let fmt = PatternFormat::new("+1 (###) ### # ## US").with_mask("_");
    let mut h = pattern(fmt, "+1 (123) 456 7 89 US");
    assert_eq!(h.state.canonical(), "123456789");

    h.select(10, 10);
    h.key(FieldKey::Backspace);
    assert_eq!(h.value, "+1 (123) 567 8 9_ US");
    assert_eq!(h.caret(), 9);
    assert_eq!(h.state.canonical(), "12356789");
}

#[test]
fn test_backspace_into_prefix() {
    let fmt = NumericFormat::new()
        .with_prefix("Rs. ")
        .with_suffix(" /sq.feet")
        .with_thousand_separator(",");
    let mut h = numeric(fmt, "Rs. 12,345.50 /sq.feet");
    assert_eq!(h.value, "Rs. 12,345.50 /sq.feet");

    h.select(4, 4);
    h.key(FieldKey::Backspace);
    assert_eq!(h.value, "Rs. 12,345.50 /sq.feet");
    assert_eq!(h.caret(), 4);
    assert_eq!(h.state.canonical(), "12345.50");
    assert!(h.changes.is_empty());
}

#[test]
fn test_paste_scale_zero_then_blur() {
    let fmt = NumericFormat::new().with_decimal_scale(0);
    let mut h = Host::new(fmt);
    h.focus();

    h.paste("9.55");
    assert_eq!(h.value, "9");
    assert_eq!(h.state.canonical(), "9");

    let r = h.blur();
    assert_eq!(h.value, "9");
    assert_eq!(h.state.canonical(), "9");
    assert!(r.is_forwarded(EventKind::Blur));
    assert!(!h.state.is_focused());
}

#[test]
fn test_negation_toggle() {
    let fmt = NumericFormat::new().with_prefix("$");
    let mut h = numeric(fmt, "12");
    assert_eq!(h.value, "$12");

    h.select(1, 1);
    h.key(FieldKey::Char('-'));
    assert_eq!(h.value, "-$12");
    assert_eq!(h.caret(), 2);
    assert_eq!(h.state.canonical(), "-12");

    h.key(FieldKey::Char('-'));
    assert_eq!(h.value, "$12");
    assert_eq!(h.caret(), 1);
    assert_eq!(h.state.canonical(), "12");
}

#[test]
fn test_fixed_scale_protects_separator() {
    let fmt = NumericFormat::new()
        .with_decimal_scale(2)
        .with_fixed_decimal_scale(true);
    let mut h = numeric(fmt, "1.00");

    h.select(2, 2);
    let (rk, ri) = h.key(FieldKey::Backspace);
    assert!(rk.is_prevented());
    assert!(ri.is_none());
    assert_eq!(rk.outcome, FieldOutcome::Changed);
    assert_eq!(h.value, "1.00");
    assert_eq!(h.caret(), 1);
    assert_eq!(h.state.phase(), EditPhase::Idle);
}

#[test]
fn test_arrow_skips_prefix() {
    let fmt = NumericFormat::new().with_prefix("$");
    let mut h = numeric(fmt, "12");

    h.select(1, 1);
    let (rk, _) = h.key(FieldKey::Left);
    assert!(rk.is_prevented());
    assert_eq!(h.caret(), 1);
    assert!(rk.is_forwarded(EventKind::KeyDown));

    h.select(3, 3);
    let (rk, _) = h.key(FieldKey::Left);
    assert!(!rk.is_prevented());
    assert_eq!(h.caret(), 2);
}

#[test]
fn test_policy_rejects() {
    let fmt = NumericFormat::new().with_thousand_separator(true);
    let state = NumericFieldState::new(fmt, Rc::new(Timers::new()))
        .expect("valid")
        .with_policy(RangePolicy::new(0.0, 1000.0))
        .with_value("999");
    let mut h = Host::with_state(state);

    h.select(3, 3);
    let (_, ri) = h.key(FieldKey::Char('9'));
    let ri = ri.expect("input");
    assert_eq!(ri.outcome, FieldOutcome::Unchanged);
    assert!(ri.value_change().is_none());
    assert!(!ri.is_forwarded(EventKind::Input));
    assert_eq!(h.value, "999");
    assert_eq!(h.caret(), 3);
    assert_eq!(h.state.canonical(), "999");
    assert!(h.changes.is_empty());

    h.key(FieldKey::Backspace);
    assert_eq!(h.value, "99");
    assert_eq!(h.state.canonical(), "99");
}

#[test]
fn test_policy_closure() {
    let state = NumericFieldState::new(NumericFormat::new(), Rc::new(Timers::new()))
        .expect("valid")
        .with_policy(|v: &rat_format_input::ValueObject| !v.value.starts_with('-'));
    let mut h = Host::with_state(state);

    h.type_str("12");
    assert_eq!(h.value, "12");
    h.select(0, 0);
    h.key(FieldKey::Char('-'));
    assert_eq!(h.value, "12");
    assert_eq!(h.caret(), 0);
}

#[test]
fn test_policy_rejects_after_caret_patch() {
    let fmt = NumericFormat::new().with_suffix(" kg");
    let state = NumericFieldState::new(fmt, Rc::new(Timers::new()))
        .expect("valid")
        .with_policy(|_: &rat_format_input::ValueObject| false)
        .with_value("12");
    let mut h = Host::with_state(state);
    assert_eq!(h.value, "12 kg");

    // backspace in the suffix is moved in front of the "2" first
    h.select(4, 4);
    let (rk, ri) = h.key(FieldKey::Backspace);
    assert_eq!(rk.selection(), Some(TextSpan::caret(2)));
    let ri = ri.expect("input");
    assert_eq!(ri.outcome, FieldOutcome::Unchanged);

    assert_eq!(h.value, "12 kg");
    assert_eq!(h.caret(), 4);
    assert!(h.timers.is_empty());
    assert!(h.changes.is_empty());
    assert_eq!(h.state.canonical(), "12");
}

#[test]
fn test_delete() {
    let fmt = NumericFormat::new()
        .with_prefix("$")
        .with_thousand_separator(true);
    let mut h = numeric(fmt, "12345");
    assert_eq!(h.value, "$12,345");

    h.select(2, 2);
    let (_, ri) = h.key(FieldKey::Delete);
    assert!(ri.is_some());
    assert_eq!(h.value, "$1,345");
    assert_eq!(h.caret(), 2);
    assert_eq!(h.state.canonical(), "1345");
}

#[test]
fn test_delete_over_thousand_separator() {
    let fmt = NumericFormat::new().with_thousand_separator(true);
    let mut h = numeric(fmt, "1234567");
    assert_eq!(h.value, "1,234,567");

    // the separator is skipped, the digit behind it goes
    h.select(1, 1);
    let (rk, _) = h.key(FieldKey::Delete);
    assert_eq!(rk.selection(), Some(TextSpan::caret(2)));
    assert_eq!(h.value, "134,567");
    assert_eq!(h.caret(), 1);
    assert_eq!(h.state.canonical(), "134567");
    assert_eq!(h.changes.len(), 1);
}

#[test]
fn test_input_without_key() {
    let fmt = NumericFormat::new()
        .with_prefix("$")
        .with_thousand_separator(true);
    let timers = Rc::new(Timers::new());
    let mut state = NumericFieldState::new(fmt, timers.clone()).expect("valid");

    let r = state.handle_input(&InputEvent {
        target: TargetState::with_caret("12345", 5),
    });
    assert_eq!(r.value(), Some("$12,345"));
    assert_eq!(r.selection(), Some(TextSpan::caret(7)));
    assert_eq!(state.formatted(), "$12,345");
    assert_eq!(state.canonical(), "12345");
    assert_eq!(state.phase(), EditPhase::Idle);
    // caret check pending
    assert_eq!(timers.len(), 1);
    state.teardown();
    assert!(timers.is_empty());
}

#[test]
fn test_focus_moves_caret() {
    let fmt = NumericFormat::new()
        .with_prefix("$")
        .with_suffix(" USD");
    let mut h = numeric(fmt, "12");
    assert_eq!(h.value, "$12 USD");

    h.select(0, 0);
    h.send(rat_format_input::event::FieldEvent::Focus);
    assert_eq!(h.state.phase(), EditPhase::FocusSettling);
    assert!(h.forwarded.is_empty());
    h.drain_timers();
    assert_eq!(h.caret(), 1);
    assert_eq!(h.state.phase(), EditPhase::Idle);
    assert_eq!(h.forwarded, vec![EventKind::Focus]);
    assert!(h.state.is_focused());
}

#[test]
fn test_focus_keeps_select_all() {
    let fmt = NumericFormat::new().with_prefix("$");
    let mut h = numeric(fmt, "12");

    h.select(0, 3);
    h.focus();
    assert_eq!(h.selection, TextSpan::new(0, 3));
}

#[test]
fn test_click_in_suffix() {
    let fmt = NumericFormat::new().with_suffix(" USD");
    let mut h = numeric(fmt, "12");

    let r = h.click(5);
    assert_eq!(r.outcome, FieldOutcome::Changed);
    assert_eq!(h.caret(), 2);
    assert!(h.forwarded.contains(&EventKind::MouseUp));
    assert_eq!(h.state.phase(), EditPhase::PendingChange);

    h.key(FieldKey::Char('3'));
    assert_eq!(h.value, "123 USD");
    assert_eq!(h.caret(), 3);
}

#[test]
fn test_blur_normalizes() {
    let fmt = NumericFormat::new()
        .with_decimal_scale(2)
        .with_fixed_decimal_scale(true);
    let mut h = Host::new(fmt);
    h.focus();
    h.paste("007.5");
    assert_eq!(h.value, "007.50");

    let r = h.blur();
    assert_eq!(r.outcome, FieldOutcome::TextChanged);
    assert_eq!(h.value, "7.50");
    assert_eq!(h.state.canonical(), "7.50");
    let change = r.value_change().expect("change");
    assert_eq!(change.source.event, Some(EventKind::Blur));
}

#[test]
fn test_blur_clears_sign_only() {
    let mut h = Host::new(NumericFormat::new());
    h.key(FieldKey::Char('-'));
    assert_eq!(h.value, "-");
    assert_eq!(h.state.canonical(), "-");

    h.blur();
    assert_eq!(h.value, "");
    assert_eq!(h.state.canonical(), "");
}

#[test]
fn test_set_value_prop() {
    let fmt = NumericFormat::new()
        .with_thousand_separator(true)
        .with_decimal_scale(0);
    let mut h = Host::new(fmt);

    let r = h.state.set_value(9.55, None);
    h.apply(&r);
    assert_eq!(r.outcome, FieldOutcome::TextChanged);
    assert_eq!(h.value, "10");
    let change = r.value_change().expect("change");
    assert_eq!(change.source.source, EditSource::Prop);
    assert_eq!(change.source.event, None);

    let r = h.state.set_value(10, None);
    assert_eq!(r.outcome, FieldOutcome::Unchanged);
    assert!(r.effects.is_empty());

    let r = h.state.set_value("1,234", None);
    h.apply(&r);
    assert_eq!(h.value, "1,234");
    assert_eq!(h.state.canonical(), "1234");

    let r = h.state.set_value(Option::<f64>::None, None);
    h.apply(&r);
    assert_eq!(h.value, "");
}

#[test]
fn test_set_value_focused_keeps_caret() {
    let fmt = NumericFormat::new().with_thousand_separator(true);
    let mut h = numeric(fmt, "1234");
    assert_eq!(h.value, "1,234");
    h.focus();
    h.select(1, 1);

    let target = h.target();
    let r = h.state.set_value(51234, Some(&target));
    h.apply(&r);
    h.drain_timers();
    assert_eq!(h.value, "51,234");
    // still behind the "1"
    assert_eq!(h.caret(), 2);
}

#[test]
fn test_numeric_string_flag() {
    let fmt = NumericFormat::new().with_prefix("1");
    let state = NumericFieldState::new(fmt, Rc::new(Timers::new()))
        .expect("valid")
        .with_value_is_numeric_string(true)
        .with_value("23");
    assert_eq!(state.formatted(), "123");
    assert_eq!(state.canonical(), "23");
}

#[test]
fn test_set_format() -> Result<(), anyhow::Error> {
    let mut h = numeric(NumericFormat::new(), "1234.5");
    assert_eq!(h.value, "1234.5");

    let r = h.state.set_format(
        NumericFormat::new()
            .with_prefix("$")
            .with_thousand_separator(true),
        None,
    )?;
    h.apply(&r);
    assert_eq!(h.value, "$1,234.5");
    assert_eq!(h.state.canonical(), "1234.5");

    let err = h
        .state
        .set_format(
            NumericFormat::new()
                .with_thousand_separator(".")
                .with_decimal_separator("."),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, FormatError::SeparatorClash { .. }));
    assert_eq!(h.state.formatted(), "$1,234.5");
    Ok(())
}

#[test]
fn test_invalid_config() {
    let r = FieldState::new(
        PatternFormat::new("##").with_mask("0"),
        Rc::new(Timers::new()),
    );
    assert_eq!(r.unwrap_err(), FormatError::NumericMask("0".into()));

    let r = FieldState::new(
        NumericFormat::new().with_decimal_separator(""),
        Rc::new(Timers::new()),
    );
    assert_eq!(r.unwrap_err(), FormatError::EmptyDecimalSeparator);
}

#[test]
fn test_blur_cancels_timers() {
    let timers = Rc::new(Timers::new());
    let mut state = NumericFieldState::new(NumericFormat::new(), timers.clone()).expect("valid");
    state.handle_focus();
    assert_eq!(timers.len(), 1);
    state.handle_blur();
    assert!(timers.is_empty());
    assert_eq!(state.phase(), EditPhase::Idle);
}

#[test]
fn test_drop_cancels_timers() {
    let timers = Rc::new(Timers::new());
    {
        let mut state =
            NumericFieldState::new(NumericFormat::new(), timers.clone()).expect("valid");
        state.handle_focus();
        assert_eq!(timers.len(), 1);
    }
    assert!(timers.is_empty());
}

#[test]
fn test_pattern_typing() {
    let fmt = PatternFormat::new("##/##/####").with_mask("_");
    let mut h = Host::new(fmt);
    h.focus();

    h.type_str("3112");
    assert_eq!(h.value, "31/12/____");
    assert_eq!(h.caret(), 5);
    h.type_str("2024");
    assert_eq!(h.value, "31/12/2024");
    assert_eq!(h.state.canonical(), "31122024");
}

#[test]
fn test_attributes() {
    let state = NumericFieldState::new(NumericFormat::new(), Rc::new(Timers::new()))
        .expect("valid")
        .with_attribute("name", "amount");
    assert_eq!(state.attribute("name"), Some("amount"));
    assert_eq!(state.attribute("id"), None);
}
