//! JSON text conversion.

use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{stringify, IssueDetail};
use crate::message::Message;

use super::{report, Action, ActionInfo, ActionKind};

/// Parses a JSON string into a value.
#[derive(Debug, Clone, Default)]
pub struct ParseJsonAction {
    message: Option<Message>,
}

impl ParseJsonAction {
    /// Sets the call-site message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Replaces a JSON string with the value it encodes.
///
/// On failure the string is kept, the dataset becomes untyped, and the
/// issue's `received` holds the parser's error text.
///
/// # Example
///
/// ```rust
/// use sluice::action::parse_json;
/// use sluice::{parse, Schema};
/// use serde_json::json;
///
/// let schema = Schema::pipe(Schema::string()).action(parse_json());
/// assert_eq!(parse(&schema, json!(r#"{"a":[1,2]}"#)).unwrap(), json!({"a": [1, 2]}));
/// ```
pub fn parse_json() -> ParseJsonAction {
    ParseJsonAction::default()
}

impl ActionInfo for ParseJsonAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Transformation
    }

    fn code(&self) -> &str {
        "parse_json"
    }
}

impl Action for ParseJsonAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        let parsed = match &dataset.value {
            Value::String(text) => serde_json::from_str::<Value>(text).map_err(|e| e.to_string()),
            other => Err(format!("expected a string, got {}", stringify(other))),
        };
        match parsed {
            Ok(value) => dataset.value = value,
            Err(reason) => {
                report(
                    &mut dataset,
                    self,
                    self.message.as_ref(),
                    "JSON",
                    config,
                    IssueDetail::new().received(stringify(&Value::String(reason))),
                );
                dataset.typed = false;
            }
        }
        dataset
    }
}

/// Serializes a value into JSON text.
#[derive(Debug, Clone, Default)]
pub struct StringifyJsonAction {
    pretty: bool,
}

impl StringifyJsonAction {
    /// Emits indented output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

/// Replaces the value with its JSON text.
pub fn stringify_json() -> StringifyJsonAction {
    StringifyJsonAction::default()
}

impl ActionInfo for StringifyJsonAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Transformation
    }

    fn code(&self) -> &str {
        "stringify_json"
    }
}

impl Action for StringifyJsonAction {
    fn run(&self, mut dataset: Dataset, _config: &Config) -> Dataset {
        let text = if self.pretty {
            serde_json::to_string_pretty(&dataset.value)
        } else {
            serde_json::to_string(&dataset.value)
        };
        // Serializing a `Value` cannot fail: its map keys are always strings.
        if let Ok(text) = text {
            dataset.value = Value::String(text);
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_failure_keeps_input() {
        let result = parse_json().run(
            Dataset {
                typed: true,
                ..Dataset::new(json!("{oops"))
            },
            &Config::new(),
        );
        assert_eq!(result.value, json!("{oops"));
        assert!(!result.typed);
        let issue = &result.issues[0];
        assert_eq!(issue.code, "parse_json");
        assert!(issue.received.starts_with('"'));
        assert!(issue.message.starts_with("Invalid JSON: Received \""));
    }

    #[test]
    fn test_parse_json_rejects_non_strings() {
        let result = parse_json().run(Dataset::new(json!(5)), &Config::new());
        assert!(!result.typed);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_stringify_json() {
        let result = stringify_json().run(Dataset::new(json!({"a": [1, true]})), &Config::new());
        assert_eq!(result.value, json!(r#"{"a":[1,true]}"#));
    }
}
