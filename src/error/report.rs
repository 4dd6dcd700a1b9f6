//! Shared issue construction.
//!
//! Every schema and action reports failures through [`add_issue`], which
//! builds the full [`Issue`] record and resolves its message. Custom
//! [`Action`](crate::Action) and [`SchemaLike`](crate::SchemaLike)
//! implementations should do the same.

use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{Issue, IssueKind};
use crate::message::Message;
use crate::path::IssuePath;

/// Static facts about the check that is reporting an issue.
#[derive(Debug, Clone)]
pub struct IssueContext<'a> {
    /// The issue category.
    pub kind: IssueKind,
    /// Identifier of the check; also the key for specific catalog messages.
    pub code: &'a str,
    /// What the check expects, if it can be put into words.
    pub expects: Option<&'a str>,
    /// The raw constraint value.
    pub requirement: Option<Value>,
    /// The call-site message given to the check.
    pub message: Option<&'a Message>,
}

impl<'a> IssueContext<'a> {
    /// Creates a context with no expectation, requirement, or message.
    pub fn new(kind: IssueKind, code: &'a str) -> Self {
        Self {
            kind,
            code,
            expects: None,
            requirement: None,
            message: None,
        }
    }

    /// Sets the expectation.
    pub fn expects(mut self, expects: Option<&'a str>) -> Self {
        self.expects = expects;
        self
    }

    /// Sets the raw requirement.
    pub fn requirement(mut self, requirement: impl Into<Value>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }

    /// Sets the call-site message.
    pub fn message(mut self, message: Option<&'a Message>) -> Self {
        self.message = message;
        self
    }
}

/// Per-occurrence details that override what [`add_issue`] derives itself.
#[derive(Debug, Clone, Default)]
pub struct IssueDetail {
    /// The offending value; defaults to the dataset's value.
    pub input: Option<Value>,
    /// The checked value was absent (a missing key or tuple item).
    pub missing: bool,
    /// Overrides the context's expectation.
    pub expected: Option<String>,
    /// Overrides the rendering of the received value.
    pub received: Option<String>,
    /// Initial path, for issues reported on behalf of a child.
    pub path: Option<IssuePath>,
    /// Nested issues.
    pub issues: Option<Vec<Issue>>,
}

impl IssueDetail {
    /// Creates an empty detail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the offending value.
    pub fn input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Marks the checked value as absent.
    pub fn missing(mut self) -> Self {
        self.missing = true;
        self
    }

    /// Overrides the expectation.
    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Overrides the received rendering.
    pub fn received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }

    /// Sets the initial path.
    pub fn path(mut self, path: IssuePath) -> Self {
        self.path = Some(path);
        self
    }

    /// Attaches nested issues.
    pub fn issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = Some(issues);
        self
    }
}

/// Builds an issue and appends it to the dataset.
///
/// The message is resolved in this order: the check's call-site message,
/// the catalog's specific message for `context.code`, the catalog's schema
/// message (schema issues only), the config message, the catalog's global
/// message, and finally the default text
/// `Invalid {label}: Expected {expected} but received {received}`.
///
/// # Example
///
/// ```rust
/// use sluice::{add_issue, Config, Dataset, IssueContext, IssueDetail, IssueKind};
/// use serde_json::json;
///
/// let mut dataset = Dataset::new(json!(3));
/// let context = IssueContext::new(IssueKind::Validation, "even").expects(Some("even number"));
/// add_issue(&mut dataset, context, "parity", &Config::new(), IssueDetail::new());
///
/// assert_eq!(dataset.issues[0].message, "Invalid parity: Expected even number but received 3");
/// ```
pub fn add_issue(
    dataset: &mut Dataset,
    context: IssueContext<'_>,
    label: &str,
    config: &Config,
    detail: IssueDetail,
) {
    let input = if detail.missing {
        None
    } else {
        Some(detail.input.unwrap_or_else(|| dataset.value.clone()))
    };
    let received = detail.received.unwrap_or_else(|| match &input {
        Some(value) => stringify(value),
        None => "missing".to_string(),
    });

    let mut issue = Issue {
        kind: context.kind,
        code: context.code.to_string(),
        input,
        expected: detail
            .expected
            .or_else(|| context.expects.map(str::to_string)),
        received,
        message: String::new(),
        requirement: context.requirement.clone(),
        path: detail.path.unwrap_or_default(),
        issues: detail.issues,
        lang: config.lang().map(str::to_string),
        abort_early: config.abort_early(),
        abort_pipe_early: config.abort_pipe_early(),
    };
    issue.message = resolve_message(&issue, &context, label, config);

    dataset.issues.push(issue);
}

fn resolve_message(issue: &Issue, context: &IssueContext<'_>, label: &str, config: &Config) -> String {
    let catalog = config.catalog();
    let lang = config.lang();

    let message = context
        .message
        .cloned()
        .or_else(|| catalog.and_then(|c| c.specific_message(context.code, lang)))
        .or_else(|| match issue.kind {
            IssueKind::Schema => catalog.and_then(|c| c.schema_message(lang)),
            _ => None,
        })
        .or_else(|| config.message().cloned())
        .or_else(|| catalog.and_then(|c| c.global_message(lang)));

    match message {
        Some(message) => message.render(issue),
        None => match &issue.expected {
            Some(expected) => format!(
                "Invalid {}: Expected {} but received {}",
                label, expected, issue.received
            ),
            None => format!("Invalid {}: Received {}", label, issue.received),
        },
    }
}

/// Renders a value for the `received` field.
///
/// Strings are quoted, scalars print as-is, and containers render as
/// `Array` or `Object`.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(_) => "Array".to_string(),
        Value::Object(_) => "Object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageCatalog;
    use serde_json::json;
    use std::sync::Arc;

    fn report(config: &Config, message: Option<&Message>, kind: IssueKind) -> Issue {
        let mut dataset = Dataset::new(json!("ab"));
        let context = IssueContext::new(kind, "min_length")
            .expects(Some(">=5"))
            .requirement(5)
            .message(message);
        add_issue(&mut dataset, context, "length", config, IssueDetail::new().received("2"));
        dataset.issues.remove(0)
    }

    #[test]
    fn test_default_message_and_fields() {
        let issue = report(&Config::new(), None, IssueKind::Validation);

        assert_eq!(issue.message, "Invalid length: Expected >=5 but received 2");
        assert_eq!(issue.input, Some(json!("ab")));
        assert_eq!(issue.requirement, Some(json!(5)));
        assert_eq!(issue.expected.as_deref(), Some(">=5"));
        assert!(issue.path.is_root());
    }

    #[test]
    fn test_default_message_without_expectation() {
        let mut dataset = Dataset::new(json!(7));
        add_issue(
            &mut dataset,
            IssueContext::new(IssueKind::Validation, "check"),
            "input",
            &Config::new(),
            IssueDetail::new(),
        );
        assert_eq!(dataset.issues[0].message, "Invalid input: Received 7");
    }

    #[test]
    fn test_missing_input() {
        let mut dataset = Dataset::new(json!({}));
        add_issue(
            &mut dataset,
            IssueContext::new(IssueKind::Schema, "object").expects(Some("string")),
            "key",
            &Config::new(),
            IssueDetail::new().missing(),
        );
        assert_eq!(dataset.issues[0].input, None);
        assert_eq!(dataset.issues[0].received, "missing");
    }

    #[test]
    fn test_config_flags_are_echoed() {
        let config = Config::new().with_lang("de").with_abort_pipe_early(true);
        let issue = report(&config, None, IssueKind::Validation);

        assert_eq!(issue.lang.as_deref(), Some("de"));
        assert!(issue.abort_pipe_early);
        assert!(!issue.abort_early);
    }

    #[test]
    fn test_resolution_order() {
        let catalog = Arc::new(MessageCatalog::new());
        catalog.set_global_message("global", None);
        catalog.set_schema_message("schema", None);
        let config = Config::new().with_catalog(Arc::clone(&catalog));

        // global only applies after schema for schema issues
        assert_eq!(report(&config, None, IssueKind::Schema).message, "schema");
        assert_eq!(report(&config, None, IssueKind::Validation).message, "global");

        let with_config = config.clone().with_message("config");
        assert_eq!(report(&with_config, None, IssueKind::Validation).message, "config");

        catalog.set_specific_message("min_length", "specific", None);
        assert_eq!(report(&with_config, None, IssueKind::Schema).message, "specific");

        let call_site = Message::from("call site");
        assert_eq!(
            report(&with_config, Some(&call_site), IssueKind::Schema).message,
            "call site"
        );
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("a")), "\"a\"");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(null)), "null");
        assert_eq!(stringify(&json!([1])), "Array");
        assert_eq!(stringify(&json!({"a": 1})), "Object");
    }
}
