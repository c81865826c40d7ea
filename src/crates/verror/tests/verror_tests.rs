//! Integration tests for structured errors
//!
//! These tests exercise construction, metadata merging and chain
//! inspection through the public API, mixing `VError`s with foreign
//! error types.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;
use verror::{
    chain, info, unwrap, verror, verror_with_cause, verror_with_opts, Cause, Info, Options,
    VError,
};

/// Foreign error that wraps another one, like an application error enum
/// built with `thiserror`.
#[derive(Debug, thiserror::Error)]
#[error("{message}: {source}")]
struct Wrapped {
    message: String,
    #[source]
    source: std::io::Error,
}

/// Foreign error with no source.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Plain(String);

fn plain(msg: &str) -> Cause {
    Arc::new(Plain(msg.to_string()))
}

fn object(value: Value) -> Info {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn same_error(found: &(dyn Error + 'static), expected: &Cause) -> bool {
    std::ptr::eq(
        found as *const dyn Error as *const (),
        Arc::as_ptr(expected) as *const (),
    )
}

// ============================================================================
// Construction Scenarios
// ============================================================================

#[test]
fn test_with_cause_nested_foreign() {
    let original: Cause = Arc::new(Wrapped {
        message: "original error 2".to_string(),
        source: std::io::Error::other("original error 1"),
    });

    let err = verror_with_cause!(original.clone(), "new error");

    assert_eq!(
        err.to_string(),
        "new error: original error 2: original error 1"
    );
    assert!(err.metadata().is_empty());
    assert!(Arc::ptr_eq(err.cause().unwrap(), &original));
}

#[test]
fn test_with_nested_cause_with_info() {
    let e1 = verror_with_opts!(
        Options::new().with_entry("foo", "bar").with_entry("baz", 1),
        "original error 1"
    );
    let e2: Cause = Arc::new(verror_with_opts!(
        Options::new()
            .with_cause(e1.into_cause())
            .with_entry("que", false)
            .with_entry("baz", 2),
        "original error 2"
    ));

    let err = verror_with_cause!(e2.clone(), "new %d error %s", 17, "msg");

    assert_eq!(
        err.to_string(),
        "new 17 error msg: original error 2: original error 1"
    );
    assert_eq!(
        *err.metadata(),
        object(json!({"foo": "bar", "baz": 2, "que": false}))
    );
    assert!(Arc::ptr_eq(err.cause().unwrap(), &e2));
}

#[test]
fn test_options_with_cause_and_info_nested() {
    let e1 = plain("original error 1");
    let e2 = VError::with_options(
        Options::new()
            .with_cause(e1)
            .with_info(object(json!({"foo": "bar", "baz": 1}))),
        "original error 2",
        &[],
    );
    let e3: Cause = Arc::new(VError::with_options(
        Options::new()
            .with_cause(e2.into_cause())
            .with_entry("que", false),
        "original error 3",
        &[],
    ));

    let err = VError::with_options(
        Options::new()
            .with_cause(e3.clone())
            .with_entry("baz", 2)
            .with_entry("foobar", json!({"a": 1, "b": 2})),
        "new error",
        &[],
    );

    assert_eq!(
        err.to_string(),
        "new error: original error 3: original error 2: original error 1"
    );
    assert_eq!(
        info(&err).unwrap(),
        object(json!({
            "foo": "bar",
            "baz": 2,
            "que": false,
            "foobar": {"a": 1, "b": 2},
        }))
    );
    assert!(Arc::ptr_eq(err.cause().unwrap(), &e3));
}

#[test]
fn test_options_with_foreign_cause_only() {
    let original = plain("original error");
    let err = verror_with_opts!(Options::new().with_cause(original.clone()), "new error");

    assert_eq!(err.to_string(), "new error: original error");
    assert!(err.metadata().is_empty());
    assert!(same_error(unwrap(&err).unwrap(), &original));
}

#[test]
fn test_merge_precedence_across_three_levels() {
    let e1 = verror_with_opts!(
        Options::new().with_entry("a", 1).with_entry("b", 2),
        "e1"
    );
    let e2 = verror_with_opts!(
        Options::new()
            .with_cause(e1.into_cause())
            .with_entry("b", 3)
            .with_entry("c", 4),
        "e2"
    );
    let e3 = verror_with_opts!(
        Options::new().with_cause(e2.into_cause()).with_entry("d", 5),
        "e3"
    );

    assert_eq!(
        info(&e3).unwrap(),
        object(json!({"a": 1, "b": 3, "c": 4, "d": 5}))
    );
    assert_eq!(e3.to_string(), "e3: e2: e1");
}

#[test]
fn test_foreign_link_breaks_metadata_flow() {
    let inner = verror_with_opts!(Options::new().with_entry("lost", true), "inner");
    let foreign: Cause = Arc::new(Wrapped {
        message: format!("foreign wrapper around {inner}"),
        source: std::io::Error::other("io"),
    });

    let outer = verror_with_cause!(foreign, "outer");

    assert!(outer.metadata().is_empty());
    assert_eq!(outer.to_string(), "outer: foreign wrapper around inner: io");
}

#[test]
fn test_macro_arguments_accept_serialize_values() {
    let owned = String::from("owned");
    let list = vec![1, 2, 3];

    let err = verror!("%s %v %t %.2f %v", owned, list, true, 2.5_f64, None::<i32>);

    assert_eq!(err.to_string(), "owned [1 2 3] true 2.50 <nil>");
}

#[test]
fn test_mismatched_arguments_never_fail() {
    let err = verror!("%d and %d", "text");
    assert_eq!(err.to_string(), "%!d(string=text) and %!d(MISSING)");

    let err = verror!("no verbs", 1);
    assert_eq!(err.to_string(), "no verbs%!(EXTRA int=1)");
}

#[test]
fn test_unrepresentable_argument_renders_as_null() {
    let err = verror!("%d", 1u128 << 100);
    assert_eq!(err.to_string(), "%!d(<nil>)");

    let err = verror!("%v and %d", 1u128 << 100, 7u128);
    assert_eq!(err.to_string(), "<nil> and 7");
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn test_info_not_verror() {
    let err = Plain("original error 1".to_string());
    assert_eq!(info(&err), None);
}

#[test]
fn test_info_through_cause_reference() {
    let cause: Cause = Arc::new(verror_with_opts!(
        Options::new().with_entry("k", "v"),
        "inner"
    ));
    assert_eq!(info(&*cause).unwrap(), object(json!({"k": "v"})));
    assert_eq!(info(&cause).unwrap(), object(json!({"k": "v"})));
}

#[test]
fn test_info_through_shared_verror() {
    let shared = Arc::new(verror_with_opts!(Options::new().with_entry("k", 1), "inner"));
    let outer = verror_with_cause!(shared.clone() as Cause, "outer");

    assert_eq!(info(&shared).unwrap(), object(json!({"k": 1})));
    assert_eq!(info(&outer).unwrap(), object(json!({"k": 1})));
}

#[test]
fn test_unwrap_foreign_with_source() {
    let err = Wrapped {
        message: "outer".to_string(),
        source: std::io::Error::other("inner"),
    };
    assert_eq!(unwrap(&err).unwrap().to_string(), "inner");
}

#[test]
fn test_unwrap_not_verror() {
    let err = Plain("error message".to_string());
    assert!(unwrap(&err).is_none());
}

#[test]
fn test_chain_mixed_errors() {
    let root: Cause = Arc::new(Wrapped {
        message: "read failed".to_string(),
        source: std::io::Error::other("disk"),
    });
    let mid = verror_with_cause!(root, "loading %s", "config");
    let top = verror_with_cause!(mid.into_cause(), "startup");

    let texts: Vec<String> = chain(&top).map(|e| e.to_string()).collect();
    assert_eq!(
        texts,
        vec![
            "startup: loading config: read failed: disk",
            "loading config: read failed: disk",
            "read failed: disk",
            "disk",
        ]
    );
    assert_eq!(chain(&top).filter_map(info).count(), 2);
}

#[test]
fn test_end_to_end_scenario() {
    let e1 = VError::with_options(
        Options::new().with_info(object(json!({"foo": "bar", "baz": 1}))),
        "original error 1",
        &[],
    );
    let e2 = VError::with_options(
        Options::new()
            .with_cause(e1.into_cause())
            .with_info(object(json!({"baz": 2}))),
        "original error 2",
        &[],
    );

    assert_eq!(e2.to_string(), "original error 2: original error 1");
    assert_eq!(info(&e2).unwrap(), object(json!({"foo": "bar", "baz": 2})));
}

// ============================================================================
// Properties
// ============================================================================

fn info_strategy() -> impl Strategy<Value = Info> {
    prop::collection::btree_map("[a-e]", any::<i64>(), 0..5)
        .prop_map(|map| map.into_iter().map(|(k, v)| (k, json!(v))).collect::<Info>())
}

proptest! {
    #[test]
    fn prop_plain_message_is_template(template in "[a-zA-Z0-9 :,.]{0,40}") {
        let err = VError::new(&template, &[]);
        prop_assert_eq!(err.to_string(), template);
        prop_assert!(err.metadata().is_empty());
        prop_assert!(err.cause().is_none());
    }

    #[test]
    fn prop_cause_text_is_appended(
        template in "[a-zA-Z0-9 ]{0,20}",
        cause_text in "[a-zA-Z0-9 ]{0,20}"
    ) {
        let cause = plain(&cause_text);
        let err = VError::with_cause(Some(cause), &template, &[]);
        prop_assert_eq!(err.to_string(), format!("{template}: {cause_text}"));
    }

    #[test]
    fn prop_integer_substitution(n in any::<i64>()) {
        let err = verror!("value=%d", n);
        prop_assert_eq!(err.to_string(), format!("value={n}"));
    }

    #[test]
    fn prop_descendant_keys_win(inner in info_strategy(), outer in info_strategy()) {
        let e1 = VError::with_options(Options::new().with_info(inner.clone()), "inner", &[]);
        let e2 = VError::with_options(
            Options::new().with_cause(e1.into_cause()).with_info(outer.clone()),
            "outer",
            &[],
        );

        let mut expected = inner;
        expected.extend(outer);
        prop_assert_eq!(info(&e2).unwrap(), expected);
    }

    #[test]
    fn prop_info_copies_are_independent(entries in info_strategy()) {
        let err = VError::with_options(Options::new().with_info(entries.clone()), "e", &[]);

        let mut copy = info(&err).unwrap();
        copy.insert("mutated".to_string(), json!(true));
        copy.retain(|k, _| k == "mutated");

        prop_assert_eq!(info(&err).unwrap(), entries);
    }
}
