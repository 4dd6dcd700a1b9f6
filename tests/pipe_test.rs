//! Integration tests for pipelines and the early-abort flags.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sluice::action::{check, email, max_length, min_length, to_trimmed, transform};
use sluice::{safe_parse, safe_parse_with, Config, Schema};
use serde_json::json;

fn counting_check(counter: Arc<AtomicUsize>) -> sluice::action::CheckAction {
    check(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    })
}

#[test]
fn test_all_actions_run_without_abort() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = Schema::pipe(Schema::string())
        .action(min_length(5))
        .action(counting_check(calls.clone()))
        .action(email());

    let issues = safe_parse(&schema, json!("abc")).into_result().unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let codes: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["min_length", "email"]);
}

#[test]
fn test_abort_pipe_early_stops_at_first_issue() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = Schema::pipe(Schema::string())
        .action(min_length(5))
        .action(counting_check(calls.clone()))
        .action(email());

    let config = Config::new().with_abort_pipe_early(true);
    let issues = safe_parse_with(&schema, json!("abc"), &config)
        .into_result()
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(issues.len(), 1);
    assert!(issues.first().abort_pipe_early);
}

#[test]
fn test_abort_pipe_early_keeps_checking_siblings() {
    let schema = Schema::object()
        .entry("a", Schema::pipe(Schema::string()).action(min_length(3)).action(email()))
        .entry("b", Schema::pipe(Schema::string()).action(max_length(1)));

    let config = Config::new().with_abort_pipe_early(true);
    let issues = safe_parse_with(&schema, json!({"a": "x", "b": "yy"}), &config)
        .into_result()
        .unwrap_err();

    let paths: Vec<_> = issues.iter().map(|i| i.path.dot_path()).collect();
    assert_eq!(paths, vec!["a", "b"]);
}

#[test]
fn test_schema_failure_skips_validation_actions() {
    let calls = Arc::new(AtomicUsize::new(0));
    let schema = Schema::pipe(Schema::string()).action(counting_check(calls.clone()));

    let issues = safe_parse(&schema, json!(42)).into_result().unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().code, "string");
}

#[test]
fn test_transformations_feed_later_actions() {
    let schema = Schema::pipe(Schema::string())
        .action(to_trimmed())
        .action(min_length(3))
        .action(transform(|v| json!({"len": v.as_str().map_or(0, str::len)})));

    assert_eq!(
        safe_parse(&schema, json!("  abcd  ")).into_result().unwrap(),
        json!({"len": 4})
    );
}

#[test]
fn test_abort_early_is_recorded_on_issue() {
    let schema = Schema::pipe(Schema::string()).action(min_length(2));
    let config = Config::new().with_abort_early(true);

    let issues = safe_parse_with(&schema, json!("a"), &config)
        .into_result()
        .unwrap_err();
    assert!(issues.first().abort_early);
    assert!(!issues.first().abort_pipe_early);
}
