//! Numeric checks.

use serde_json::{Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::IssueDetail;
use crate::message::Message;

use super::{report, Action, ActionInfo, ActionKind};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ValueCheck {
    Min(f64),
    Max(f64),
    Integer,
}

/// Validates a number against a bound or requires it to be integral.
#[derive(Debug, Clone)]
pub struct ValueAction {
    check: ValueCheck,
    message: Option<Message>,
}

impl ValueAction {
    fn new(check: ValueCheck) -> Self {
        Self {
            check,
            message: None,
        }
    }

    /// Sets the call-site message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn accepts(&self, n: f64) -> bool {
        match self.check {
            ValueCheck::Min(min) => n >= min,
            ValueCheck::Max(max) => n <= max,
            ValueCheck::Integer => n.is_finite() && n.fract() == 0.0,
        }
    }
}

/// Requires a number greater than or equal to `min`.
pub fn min_value(min: f64) -> ValueAction {
    ValueAction::new(ValueCheck::Min(min))
}

/// Requires a number less than or equal to `max`.
pub fn max_value(max: f64) -> ValueAction {
    ValueAction::new(ValueCheck::Max(max))
}

/// Requires a number without a fractional part.
///
/// # Example
///
/// ```rust
/// use sluice::action::integer;
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let schema = Schema::pipe(Schema::number()).action(integer());
/// assert!(safe_parse(&schema, json!(3)).is_success());
/// assert!(safe_parse(&schema, json!(3.5)).is_failure());
/// ```
pub fn integer() -> ValueAction {
    ValueAction::new(ValueCheck::Integer)
}

impl ActionInfo for ValueAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Validation
    }

    fn code(&self) -> &str {
        match self.check {
            ValueCheck::Min(_) => "min_value",
            ValueCheck::Max(_) => "max_value",
            ValueCheck::Integer => "integer",
        }
    }

    fn expects(&self) -> Option<String> {
        match self.check {
            ValueCheck::Min(min) => Some(format!(">={}", min)),
            ValueCheck::Max(max) => Some(format!("<={}", max)),
            ValueCheck::Integer => None,
        }
    }

    fn requirement(&self) -> Option<Value> {
        match self.check {
            ValueCheck::Min(n) | ValueCheck::Max(n) => Some(Value::from(n)),
            ValueCheck::Integer => None,
        }
    }

    fn json_schema(&self, schema: &mut Map<String, Value>) {
        match self.check {
            ValueCheck::Min(min) => {
                schema.insert("minimum".to_string(), Value::from(min));
            }
            ValueCheck::Max(max) => {
                schema.insert("maximum".to_string(), Value::from(max));
            }
            ValueCheck::Integer => {
                schema.insert("type".to_string(), Value::from("integer"));
            }
        }
    }
}

impl Action for ValueAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.typed {
            return dataset;
        }

        if !dataset.value.as_f64().is_some_and(|n| self.accepts(n)) {
            let label = match self.check {
                ValueCheck::Integer => "integer",
                _ => "value",
            };
            report(
                &mut dataset,
                self,
                self.message.as_ref(),
                label,
                config,
                IssueDetail::new(),
            );
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(value: Value) -> Dataset {
        Dataset {
            typed: true,
            ..Dataset::new(value)
        }
    }

    #[test]
    fn test_bounds() {
        let config = Config::new();
        assert!(!min_value(0.0).run(typed(json!(0)), &config).has_issues());
        assert!(min_value(0.0).run(typed(json!(-1)), &config).has_issues());
        assert!(!max_value(10.0).run(typed(json!(9.5)), &config).has_issues());

        let result = max_value(10.0).run(typed(json!(11)), &config);
        assert_eq!(result.issues[0].expected.as_deref(), Some("<=10"));
        assert_eq!(result.issues[0].received, "11");
    }

    #[test]
    fn test_integer() {
        let config = Config::new();
        assert!(!integer().run(typed(json!(4)), &config).has_issues());

        let result = integer().run(typed(json!(4.2)), &config);
        assert_eq!(result.issues[0].code, "integer");
        assert_eq!(result.issues[0].message, "Invalid integer: Received 4.2");
    }
}
