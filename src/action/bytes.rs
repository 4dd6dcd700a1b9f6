//! UTF-8 byte length checks for strings.

use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{stringify, IssueDetail};
use crate::message::Message;

use super::{report, Action, ActionInfo, ActionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BytesCheck {
    Min,
    Max,
    Exact,
}

/// Validates the UTF-8 encoded size of a string.
#[derive(Debug, Clone)]
pub struct BytesAction {
    check: BytesCheck,
    requirement: usize,
    message: Option<Message>,
}

impl BytesAction {
    fn new(check: BytesCheck, requirement: usize) -> Self {
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
}

/// Requires at least `min` bytes.
pub fn min_bytes(min: usize) -> BytesAction {
    BytesAction::new(BytesCheck::Min, min)
}

/// Requires at most `max` bytes.
pub fn max_bytes(max: usize) -> BytesAction {
    BytesAction::new(BytesCheck::Max, max)
}

/// Requires exactly `len` bytes.
///
/// # Example
///
/// ```rust
/// use sluice::action::bytes;
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let schema = Schema::pipe(Schema::string()).action(bytes(6));
/// assert!(safe_parse(&schema, json!("あい")).is_success());
/// ```
pub fn bytes(len: usize) -> BytesAction {
    BytesAction::new(BytesCheck::Exact, len)
}

impl ActionInfo for BytesAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Validation
    }

    fn code(&self) -> &str {
        match self.check {
            BytesCheck::Min => "min_bytes",
            BytesCheck::Max => "max_bytes",
            BytesCheck::Exact => "bytes",
        }
    }

    fn expects(&self) -> Option<String> {
        Some(match self.check {
            BytesCheck::Min => format!(">={}", self.requirement),
            BytesCheck::Max => format!("<={}", self.requirement),
            BytesCheck::Exact => self.requirement.to_string(),
        })
    }

    fn requirement(&self) -> Option<Value> {
        Some(Value::from(self.requirement))
    }
}

impl Action for BytesAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.typed {
            return dataset;
        }

        let size = dataset.value.as_str().map(str::len);
        let ok = size.is_some_and(|size| match self.check {
            BytesCheck::Min => size >= self.requirement,
            BytesCheck::Max => size <= self.requirement,
            BytesCheck::Exact => size == self.requirement,
        });
        if !ok {
            let received = match size {
                Some(size) => size.to_string(),
                None => stringify(&dataset.value),
            };
            report(
                &mut dataset,
                self,
                self.message.as_ref(),
                "bytes",
                config,
                IssueDetail::new().received(received),
            );
        }
        dataset
    }
}
