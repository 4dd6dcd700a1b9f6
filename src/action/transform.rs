//! Transformation actions.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::IssueDetail;
use crate::message::Message;

use super::{report, Action, ActionInfo, ActionKind};

/// Rewrites a value with an infallible function.
#[derive(Clone)]
pub struct TransformAction {
    operation: Arc<dyn Fn(Value) -> Value + Send + Sync>,
}

impl fmt::Debug for TransformAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformAction").finish_non_exhaustive()
    }
}

/// Rewrites the value with `operation`.
///
/// # Example
///
/// ```rust
/// use sluice::action::transform;
/// use sluice::{parse, Schema};
/// use serde_json::{json, Value};
///
/// let schema = Schema::pipe(Schema::string())
///     .action(transform(|v| Value::from(v.as_str().map_or(0, str::len))));
/// assert_eq!(parse(&schema, json!("four")).unwrap(), json!(4));
/// ```
pub fn transform<F>(operation: F) -> TransformAction
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    TransformAction {
        operation: Arc::new(operation),
    }
}

impl ActionInfo for TransformAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Transformation
    }

    fn code(&self) -> &str {
        "transform"
    }
}

impl Action for TransformAction {
    fn run(&self, mut dataset: Dataset, _config: &Config) -> Dataset {
        let value = std::mem::take(&mut dataset.value);
        dataset.value = (self.operation)(value);
        dataset
    }
}

type Fallible = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Rewrites a value with a function that may fail.
#[derive(Clone)]
pub struct TryTransformAction {
    operation: Fallible,
    message: Option<Message>,
}

impl TryTransformAction {
    /// Sets the call-site message, replacing the function's own error text.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Debug for TryTransformAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryTransformAction")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Rewrites the value with `operation`, reporting its error on failure.
///
/// On failure the value is left unchanged and the dataset becomes untyped,
/// so later validation actions skip it.
pub fn try_transform<F>(operation: F) -> TryTransformAction
where
    F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
{
    TryTransformAction {
        operation: Arc::new(operation),
        message: None,
    }
}

impl ActionInfo for TryTransformAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Transformation
    }

    fn code(&self) -> &str {
        "try_transform"
    }
}

impl Action for TryTransformAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        match (self.operation)(&dataset.value) {
            Ok(value) => dataset.value = value,
            Err(reason) => {
                let message = self.message.clone().unwrap_or(Message::from(reason));
                report(
                    &mut dataset,
                    self,
                    Some(&message),
                    "input",
                    config,
                    IssueDetail::new(),
                );
                dataset.typed = false;
            }
        }
        dataset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringTransform {
    Trim,
    Lower,
    Upper,
}

/// Normalizes a string. Other values pass through unchanged.
#[derive(Debug, Clone)]
pub struct StringTransformAction {
    transform: StringTransform,
}

/// Removes leading and trailing whitespace.
pub fn to_trimmed() -> StringTransformAction {
    StringTransformAction {
        transform: StringTransform::Trim,
    }
}

/// Lowercases a string.
pub fn to_lower_case() -> StringTransformAction {
    StringTransformAction {
        transform: StringTransform::Lower,
    }
}

/// Uppercases a string.
pub fn to_upper_case() -> StringTransformAction {
    StringTransformAction {
        transform: StringTransform::Upper,
    }
}

impl ActionInfo for StringTransformAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Transformation
    }

    fn code(&self) -> &str {
        match self.transform {
            StringTransform::Trim => "to_trimmed",
            StringTransform::Lower => "to_lower_case",
            StringTransform::Upper => "to_upper_case",
        }
    }
}

impl Action for StringTransformAction {
    fn run(&self, mut dataset: Dataset, _config: &Config) -> Dataset {
        if let Value::String(s) = &dataset.value {
            let rewritten = match self.transform {
                StringTransform::Trim => s.trim().to_string(),
                StringTransform::Lower => s.to_lowercase(),
                StringTransform::Upper => s.to_uppercase(),
            };
            dataset.value = Value::String(rewritten);
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transform_runs_on_untyped_dataset() {
        let double = transform(|v| Value::from(v.as_i64().unwrap_or(0) * 2));
        let result = double.run(Dataset::new(json!(21)), &Config::new());
        assert_eq!(result.value, json!(42));
        assert!(!result.typed);
    }

    #[test]
    fn test_try_transform_failure() {
        let to_number = try_transform(|v| {
            v.as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .map(Value::from)
                .ok_or_else(|| "not a number".to_string())
        });

        let ok = to_number.run(Dataset { typed: true, ..Dataset::new(json!("12")) }, &Config::new());
        assert_eq!(ok.value, json!(12));
        assert!(ok.typed);

        let failed = to_number.run(Dataset { typed: true, ..Dataset::new(json!("x")) }, &Config::new());
        assert_eq!(failed.value, json!("x"));
        assert!(!failed.typed);
        assert_eq!(failed.issues[0].kind, crate::error::IssueKind::Transformation);
        assert_eq!(failed.issues[0].message, "not a number");
    }

    #[test]
    fn test_string_transforms() {
        let config = Config::new();
        let result = to_trimmed().run(Dataset::new(json!("  hi  ")), &config);
        assert_eq!(result.value, json!("hi"));
        assert_eq!(
            to_upper_case().run(Dataset::new(json!("straße")), &config).value,
            json!("STRASSE")
        );
        assert_eq!(
            to_lower_case().run(Dataset::new(json!("ÀB")), &config).value,
            json!("àb")
        );
        assert_eq!(to_trimmed().run(Dataset::new(json!(5)), &config).value, json!(5));
    }
}
