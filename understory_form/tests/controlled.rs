// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for forms whose value is owned outside the form.
//!
//! The "owner" in these tests plays the part of an application holding the
//! value: it reads the last `on_change` notification and answers with
//! `set_value`, sometimes adjusting the value first, sometimes not at all.

use serde_json::{Value, json};
use understory_form::{
    ErrorMap, FieldDescriptor, Form, FormConfig, FormEvent, FormSnapshot, PatternRule, Status,
    Submission, Touched, Validation,
};

type Recorded = Form<Vec<FormEvent>>;

fn field(path: &str) -> FieldDescriptor {
    FieldDescriptor::parse(path).unwrap()
}

fn touched(paths: &[&str]) -> Touched {
    paths.iter().map(|p| ((*p).to_string(), true)).collect()
}

fn messages(pairs: &[(&str, &str)]) -> ErrorMap {
    pairs
        .iter()
        .map(|(path, message)| ((*path).to_string(), (*message).to_string()))
        .collect()
}

fn last_change(form: &Recorded) -> Option<Value> {
    form.observer().iter().rev().find_map(|e| match e {
        FormEvent::Change { value, .. } => Some(value.clone()),
        _ => None,
    })
}

/// The owner stores whatever the form reported.
fn echo(form: &mut Recorded) {
    if let Some(value) = last_change(form) {
        form.set_value(value).unwrap();
    }
}

fn submissions(form: &Recorded) -> Vec<&FormSnapshot> {
    form.observer()
        .iter()
        .filter_map(|e| match e {
            FormEvent::Submit(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn validations(form: &Recorded) -> Vec<&Validation> {
    form.observer()
        .iter()
        .filter_map(|e| match e {
            FormEvent::Validate(v) => Some(v),
            _ => None,
        })
        .collect()
}

fn uppercase(status: Status) -> PatternRule {
    PatternRule::new("[A-Z]", "One uppercase letter", status).unwrap()
}

#[test]
fn controlled_submit_reports_value_and_touched() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    form.register(field("test"));

    form.mutate("test", json!("v")).unwrap();
    echo(&mut form);
    assert_eq!(form.submit(), Submission::Submitted);

    assert_eq!(
        submissions(&form),
        [&FormSnapshot {
            value: json!({"test": "v"}),
            touched: touched(&["test"]),
        }]
    );
}

#[test]
fn controlled_required_blocks_submit() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    form.register(field("test").required());

    assert_eq!(form.submit(), Submission::Blocked);
    assert!(submissions(&form).is_empty());
    let last = validations(&form).pop().unwrap();
    assert_eq!(last.errors, messages(&[("test", "required")]));
    assert!(last.infos.is_empty());
}

#[test]
fn controlled_pattern_error_blocks_submit() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    form.register(field("test").rule(uppercase(Status::Error)));

    assert_eq!(form.submit(), Submission::Blocked);
    let last = validations(&form).pop().unwrap();
    assert_eq!(last.errors["test"], "One uppercase letter");
    assert!(last.infos.is_empty());
}

#[test]
fn controlled_pattern_info_does_not_block() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    form.register(field("test").rule(uppercase(Status::Info)));

    assert_eq!(form.submit(), Submission::Submitted);
    let last = validations(&form).pop().unwrap();
    assert!(last.errors.is_empty());
    assert_eq!(last.infos["test"], "One uppercase letter");
}

#[test]
fn controlled_lazy_initial_value() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    form.register(field("test"));

    // The owner replaces the value right after mounting.
    form.set_value(json!({"test": "test"})).unwrap();
    assert_eq!(form.value(), &json!({"test": "test"}));

    form.mutate("test", json!("v")).unwrap();
    echo(&mut form);
    form.submit();

    assert_eq!(submissions(&form)[0].value, json!({"test": "v"}));
    assert_eq!(submissions(&form)[0].touched, touched(&["test"]));
}

#[test]
fn controlled_input_inside_uncontrolled_form() {
    let mut form = Form::uncontrolled(FormConfig::default(), Vec::new());
    form.register(field("test"));
    form.sync_field("test", json!("")).unwrap();

    // The input reports the edit and its owner stores it.
    form.mutate("test", json!("v")).unwrap();
    form.sync_field("test", json!("v")).unwrap();
    form.submit();

    assert_eq!(
        submissions(&form),
        [&FormSnapshot {
            value: json!({"test": "v"}),
            touched: touched(&["test"]),
        }]
    );
}

#[test]
fn controlled_input_lazy() {
    let mut form = Form::uncontrolled(FormConfig::default(), Vec::new());
    form.register(field("test"));
    form.sync_field("test", json!("")).unwrap();
    form.sync_field("test", json!("test")).unwrap();

    form.mutate("test", json!("v")).unwrap();
    form.sync_field("test", json!("v")).unwrap();
    form.submit();

    assert_eq!(submissions(&form)[0].value, json!({"test": "v"}));
    assert_eq!(submissions(&form)[0].touched, touched(&["test"]));
}

#[test]
fn lazy_value_from_an_unrelated_control() {
    let mut form = Form::uncontrolled(FormConfig::default(), Vec::new());
    form.sync_field("test", json!("")).unwrap();

    // A button elsewhere sets the input's value.
    form.sync_field("test", json!("a")).unwrap();
    form.submit();

    let submitted = submissions(&form);
    assert_eq!(submitted[0].value, json!({"test": "a"}));
    assert!(submitted[0].touched.is_empty());
}

#[test]
fn shared_path_descriptors_are_reference_counted() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    // A field and the input it renders both describe `test`.
    let outer = form.register(field("test"));
    let inner = form.register(field("test"));
    assert_eq!(outer, inner);
    assert_eq!(form.registry().len(), 1);

    form.mutate("test", json!("v")).unwrap();
    echo(&mut form);
    form.submit();
    assert_eq!(submissions(&form)[0].value, json!({"test": "v"}));
    assert_eq!(submissions(&form)[0].touched, touched(&["test"]));

    assert!(form.deregister(inner));
    assert!(form.registry().covers("test"));
    assert!(form.deregister(outer));
    assert!(!form.registry().covers("test"));
}

#[test]
fn controlled_reset() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    form.register(field("test").required());

    form.mutate("test", json!("Input has changed")).unwrap();
    echo(&mut form);
    assert_eq!(form.value(), &json!({"test": "Input has changed"}));

    form.reset();
    echo(&mut form);
    let resets = form
        .observer()
        .iter()
        .filter(|e| matches!(e, FormEvent::Reset))
        .count();
    assert_eq!(resets, 1);
    assert_eq!(form.value(), &json!({"test": ""}));
    assert!(form.touched().is_empty());
    assert!(form.errors().is_empty());
}

#[test]
fn owner_ignoring_changes_still_sees_attempted_value() {
    let mut form = Form::controlled(json!({"test": ""}), FormConfig::default(), Vec::new());
    form.register(field("test"));

    form.mutate("test", json!("Input has changed")).unwrap();
    assert_eq!(
        form.observer().last(),
        Some(&FormEvent::Change {
            value: json!({"test": "Input has changed"}),
            touched: touched(&["test"]),
        })
    );

    // The owner never stores the change; the same edit is reported again.
    form.mutate("test", json!("Input has changed")).unwrap();
    assert_eq!(form.observer().len(), 2);
    assert_eq!(last_change(&form), Some(json!({"test": "Input has changed"})));
}

#[test]
fn successive_mutations_build_on_each_other_before_the_owner_answers() {
    let mut form = Form::controlled(json!({"a": "", "b": ""}), FormConfig::default(), Vec::new());
    form.mutate("a", json!("1")).unwrap();
    form.mutate("b", json!("2")).unwrap();
    assert_eq!(last_change(&form), Some(json!({"a": "1", "b": "2"})));
}

#[test]
fn array_of_fields() {
    let blank = json!({"number": "", "ext": ""});
    let mut form = Form::controlled(
        json!({"phones": [blank.clone(), blank.clone(), blank.clone()]}),
        FormConfig::default(),
        Vec::new(),
    );
    for idx in 0..3 {
        form.register(field(&format!("phones[{idx}].number")));
        form.register(field(&format!("phones[{idx}].ext")));
    }

    form.mutate("phones[1].number", json!("123456789")).unwrap();
    echo(&mut form);
    form.mutate("phones[2].ext", json!("999")).unwrap();
    echo(&mut form);
    form.submit();

    assert_eq!(
        submissions(&form),
        [&FormSnapshot {
            value: json!({"phones": [
                {"number": "", "ext": ""},
                {"number": "123456789", "ext": ""},
                {"number": "", "ext": "999"},
            ]}),
            touched: touched(&["phones[1].number", "phones[2].ext"]),
        }]
    );
}

#[test]
fn array_of_required_fields() {
    let blank = json!({"number": "", "ext": ""});
    let mut form = Form::controlled(
        json!({"test": "", "phones": [blank.clone(), blank]}),
        FormConfig::default(),
        Vec::new(),
    );
    for idx in 0..2 {
        form.register(field(&format!("phones[{idx}].number")).required());
        form.register(field(&format!("phones[{idx}].ext")));
    }

    assert_eq!(form.submit(), Submission::Blocked);
    let last = validations(&form).pop().unwrap();
    assert_eq!(
        last.errors,
        messages(&[
            ("phones[0].number", "required"),
            ("phones[1].number", "required"),
        ])
    );
    assert!(last.infos.is_empty());
}

#[test]
fn array_of_fields_with_pattern() {
    let blank = json!({"number": "", "ext": ""});
    let mut form = Form::controlled(
        json!({"test": "", "phones": [blank.clone(), blank]}),
        FormConfig::default(),
        Vec::new(),
    );
    let digits = PatternRule::new("^[0-9]*$", "Only Numbers", Status::Error).unwrap();
    for idx in 0..2 {
        form.register(field(&format!("phones[{idx}].number")).rule(digits.clone()));
        form.register(field(&format!("phones[{idx}].ext")));
    }

    form.mutate("phones[1].number", json!("sadasd")).unwrap();
    echo(&mut form);
    assert_eq!(form.submit(), Submission::Blocked);

    let last = validations(&form).pop().unwrap();
    assert_eq!(
        last.errors,
        messages(&[("phones[1].number", "Only Numbers")])
    );
}
