//! Integration tests for objects, tuples, unions and variants.

use sluice::action::{min_length, to_upper_case};
use sluice::{
    is, parse, safe_parse, safe_parse_with, Config, Dataset, ObjectSchema, Schema, SchemaLike,
};
use serde_json::json;

fn user() -> ObjectSchema {
    Schema::object()
        .entry("name", Schema::pipe(Schema::string()).action(min_length(1)))
        .optional("nickname", Schema::string())
        .default("role", Schema::picklist(["admin", "member"]), json!("member"))
}

#[test]
fn test_object_collects_every_entry_issue() {
    let issues = safe_parse(&user(), json!({"name": "", "nickname": 3, "role": "owner"}))
        .into_result()
        .unwrap_err();

    let paths: Vec<_> = issues.iter().map(|i| i.path.dot_path()).collect();
    assert_eq!(paths, vec!["name", "nickname", "role"]);
    assert_eq!(issues.at_dot_path("role")[0].expected.as_deref(), Some("\"admin\" | \"member\""));
}

#[test]
fn test_object_defaults_and_optional_keys() {
    assert_eq!(
        parse(&user(), json!({"name": "ada", "extra": true})).unwrap(),
        json!({"name": "ada", "role": "member"})
    );
}

#[test]
fn test_abort_early_stops_at_first_entry() {
    let config = Config::new().with_abort_early(true);
    let issues = safe_parse_with(&user(), json!({"name": "", "nickname": 3}), &config)
        .into_result()
        .unwrap_err();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().path.dot_path(), "name");
}

#[test]
fn test_missing_required_key_marks_untyped() {
    let schema = Schema::object().entry("name", Schema::string());

    let result = schema.run(Dataset::new(json!({})), &Config::new());
    assert!(!result.typed);
    assert_eq!(result.issues.len(), 1);

    // Checks on the object never see a value without its required keys.
    let checked = Schema::pipe(Schema::object().entry("name", Schema::string()))
        .action(sluice::action::check(|value| value.get("name").is_some()));
    let issues = safe_parse(&checked, json!({})).into_result().unwrap_err();
    let codes: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["object"]);

    // Optional and defaulted keys leave the object typed.
    let relaxed = Schema::object()
        .optional("nickname", Schema::string())
        .default("role", Schema::string(), json!("member"));
    assert!(relaxed.run(Dataset::new(json!({})), &Config::new()).typed);
}

#[test]
fn test_unknown_key_policies() {
    let base = || Schema::object().entry("a", Schema::number());
    let input = json!({"a": 1, "b": "x"});

    assert_eq!(parse(&base(), input.clone()).unwrap(), json!({"a": 1}));
    assert_eq!(parse(&base().loose(), input.clone()).unwrap(), input);
    assert_eq!(
        safe_parse(&base().strict(), input.clone()).into_result().unwrap_err().first().code,
        "strict_object"
    );

    let rest = base().rest(Schema::number());
    let issues = safe_parse(&rest, input).into_result().unwrap_err();
    assert_eq!(issues.first().path.dot_path(), "b");
    assert_eq!(issues.first().code, "number");
}

#[test]
fn test_tuple_policies() {
    let pair = || Schema::tuple().item(Schema::string()).item(Schema::number());

    assert_eq!(parse(&pair(), json!(["a", 1, true])).unwrap(), json!(["a", 1]));
    assert!(!is(&pair().strict(), json!(["a", 1, true])));
    assert_eq!(
        parse(&pair().rest(Schema::boolean()), json!(["a", 1, true, false])).unwrap(),
        json!(["a", 1, true, false])
    );

    let issues = safe_parse(&pair(), json!(["a"])).into_result().unwrap_err();
    assert_eq!(issues.first().expected.as_deref(), Some("number"));
    assert_eq!(issues.first().received, "missing");
}

#[test]
fn test_union_returns_first_clean_option() {
    let schema = Schema::union()
        .option(Schema::pipe(Schema::string()).action(to_upper_case()))
        .option(Schema::string());

    for _ in 0..5 {
        assert_eq!(parse(&schema, json!("abc")).unwrap(), json!("ABC"));
    }
}

#[test]
fn test_union_failure_nests_option_issues() {
    let schema = Schema::union()
        .option(Schema::pipe(Schema::string()).action(min_length(3)))
        .option(Schema::number());

    let issues = safe_parse(&schema, json!("ab")).into_result().unwrap_err();
    let issue = issues.first();
    assert_eq!(issue.code, "union");
    assert_eq!(issue.expected.as_deref(), Some("string | number"));

    let nested = issue.issues.as_ref().unwrap();
    let codes: Vec<_> = nested.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["min_length", "number"]);
}

#[test]
fn test_empty_union_expects_never() {
    let issues = safe_parse(&Schema::union(), json!(1)).into_result().unwrap_err();
    assert_eq!(issues.first().expected.as_deref(), Some("never"));
}

fn shape() -> sluice::VariantSchema {
    Schema::variant("kind")
        .option(
            Schema::object()
                .entry("kind", Schema::literal("circle"))
                .entry("radius", Schema::number()),
        )
        .option(
            Schema::object()
                .entry("kind", Schema::literal("square"))
                .entry("side", Schema::number()),
        )
}

#[test]
fn test_variant_picks_option_by_discriminator() {
    assert!(is(&shape(), json!({"kind": "square", "side": 2})));

    // Only the matching option's issues are reported.
    let issues = safe_parse(&shape(), json!({"kind": "circle", "side": 2}))
        .into_result()
        .unwrap_err();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().path.dot_path(), "radius");
}

#[test]
fn test_variant_unknown_discriminator() {
    let issues = safe_parse(&shape(), json!({"kind": "hexagon"}))
        .into_result()
        .unwrap_err();
    let issue = issues.first();
    assert_eq!(issue.code, "variant");
    assert_eq!(issue.expected.as_deref(), Some("\"circle\" | \"square\""));
    assert_eq!(issue.received, "\"hexagon\"");
    assert_eq!(issue.path.dot_path(), "kind");
}

#[test]
fn test_variant_first_match_is_deterministic() {
    let schema = Schema::variant("type")
        .option(
            Schema::object()
                .entry("type", Schema::string())
                .entry("first", Schema::boolean()),
        )
        .option(Schema::object().entry("type", Schema::literal("b")));

    for _ in 0..5 {
        let issues = safe_parse(&schema, json!({"type": "b"})).into_result().unwrap_err();
        assert_eq!(issues.first().path.dot_path(), "first");
    }
}

#[test]
fn test_nullable_and_lazy() {
    fn list() -> ObjectSchema {
        Schema::object()
            .entry("head", Schema::number())
            .entry("tail", Schema::nullable(Schema::lazy(|_| list())))
    }

    assert!(is(&list(), json!({"head": 1, "tail": {"head": 2, "tail": null}})));

    let issues = safe_parse(&list(), json!({"head": 1, "tail": {"head": "2", "tail": null}}))
        .into_result()
        .unwrap_err();
    assert_eq!(issues.first().path.dot_path(), "tail.head");
}

#[test]
fn test_cross_field_check_on_piped_object() {
    let order = Schema::pipe(
        Schema::object()
            .entry("quantity", Schema::number())
            .entry("unit_price", Schema::number())
            .entry("total", Schema::number()),
    )
    .action(
        sluice::action::check(|order| {
            let field = |k: &str| order.get(k).and_then(|v| v.as_f64()).unwrap_or(0.0);
            field("quantity") * field("unit_price") == field("total")
        })
        .message("total must equal quantity * unit_price"),
    );

    assert!(is(&order, json!({"quantity": 2, "unit_price": 5, "total": 10})));

    let issues = safe_parse(&order, json!({"quantity": 2, "unit_price": 5, "total": 9}))
        .into_result()
        .unwrap_err();
    assert_eq!(issues.first().message, "total must equal quantity * unit_price");
    assert!(issues.first().path.is_root());

    // A shape failure keeps the check from running.
    let issues = safe_parse(&order, json!({"quantity": "2", "unit_price": 5, "total": 9}))
        .into_result()
        .unwrap_err();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.first().code, "number");
}
