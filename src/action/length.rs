//! Length checks for strings (characters) and arrays (items).

use serde_json::{Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{stringify, IssueDetail};
use crate::message::Message;

use super::{report, set_for_type, Action, ActionInfo, ActionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthCheck {
    Min,
    Max,
    Exact,
    NonEmpty,
}

/// Validates the length of a string or array.
///
/// Strings are measured in Unicode scalar values, arrays in items. Values of
/// any other shape fail the check.
#[derive(Debug, Clone)]
pub struct LengthAction {
    check: LengthCheck,
    requirement: usize,
    message: Option<Message>,
}

impl LengthAction {
    fn new(check: LengthCheck, requirement: usize) -> Self {
        Self {
            check,
            requirement,
            message: None,
        }
    }

    /// Sets the call-site message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn accepts(&self, len: usize) -> bool {
        match self.check {
            LengthCheck::Min => len >= self.requirement,
            LengthCheck::Max => len <= self.requirement,
            LengthCheck::Exact => len == self.requirement,
            LengthCheck::NonEmpty => len > 0,
        }
    }
}

/// Requires at least `min` characters or items.
///
/// # Example
///
/// ```rust
/// use sluice::action::min_length;
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let schema = Schema::pipe(Schema::string()).action(min_length(3));
/// assert!(safe_parse(&schema, json!("abc")).is_success());
/// assert!(safe_parse(&schema, json!("ab")).is_failure());
/// ```
pub fn min_length(min: usize) -> LengthAction {
    LengthAction::new(LengthCheck::Min, min)
}

/// Requires at most `max` characters or items.
pub fn max_length(max: usize) -> LengthAction {
    LengthAction::new(LengthCheck::Max, max)
}

/// Requires exactly `len` characters or items.
pub fn length(len: usize) -> LengthAction {
    LengthAction::new(LengthCheck::Exact, len)
}

/// Requires at least one character or item.
pub fn non_empty() -> LengthAction {
    LengthAction::new(LengthCheck::NonEmpty, 0)
}

/// Returns the length of a string or array.
fn measure(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

impl ActionInfo for LengthAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Validation
    }

    fn code(&self) -> &str {
        match self.check {
            LengthCheck::Min => "min_length",
            LengthCheck::Max => "max_length",
            LengthCheck::Exact => "length",
            LengthCheck::NonEmpty => "non_empty",
        }
    }

    fn expects(&self) -> Option<String> {
        Some(match self.check {
            LengthCheck::Min => format!(">={}", self.requirement),
            LengthCheck::Max => format!("<={}", self.requirement),
            LengthCheck::Exact => self.requirement.to_string(),
            LengthCheck::NonEmpty => "!0".to_string(),
        })
    }

    fn requirement(&self) -> Option<Value> {
        match self.check {
            LengthCheck::NonEmpty => None,
            _ => Some(Value::from(self.requirement)),
        }
    }

    fn json_schema(&self, schema: &mut Map<String, Value>) {
        let n = Value::from(self.requirement);
        match self.check {
            LengthCheck::Min => set_for_type(schema, "minItems", "minLength", n),
            LengthCheck::Max => set_for_type(schema, "maxItems", "maxLength", n),
            LengthCheck::Exact => {
                set_for_type(schema, "minItems", "minLength", n.clone());
                set_for_type(schema, "maxItems", "maxLength", n);
            }
            LengthCheck::NonEmpty => set_for_type(schema, "minItems", "minLength", Value::from(1)),
        }
    }
}

impl Action for LengthAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.typed {
            return dataset;
        }

        let len = measure(&dataset.value);
        if !len.is_some_and(|len| self.accepts(len)) {
            let received = match len {
                Some(len) => len.to_string(),
                None => stringify(&dataset.value),
            };
            report(
                &mut dataset,
                self,
                self.message.as_ref(),
                "length",
                config,
                IssueDetail::new().received(received),
            );
        }
        dataset
    }
}
