//! Custom predicate validation.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::IssueDetail;
use crate::message::Message;

use super::{report, Action, ActionInfo, ActionKind};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Validates a value with a caller-supplied predicate.
#[derive(Clone)]
pub struct CheckAction {
    predicate: Predicate,
    message: Option<Message>,
}

impl CheckAction {
    /// Sets the call-site message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Debug for CheckAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckAction")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Requires `predicate` to return true for the value.
///
/// # Example
///
/// ```rust
/// use sluice::action::check;
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let even = check(|v| v.as_i64().is_some_and(|n| n % 2 == 0)).message("must be even");
/// let schema = Schema::pipe(Schema::number()).action(even);
///
/// let issues = safe_parse(&schema, json!(3)).into_result().unwrap_err();
/// assert_eq!(issues.first().message, "must be even");
/// ```
pub fn check<F>(predicate: F) -> CheckAction
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    CheckAction {
        predicate: Arc::new(predicate),
        message: None,
    }
}

impl ActionInfo for CheckAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Validation
    }

    fn code(&self) -> &str {
        "check"
    }
}

impl Action for CheckAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if dataset.typed && !(self.predicate)(&dataset.value) {
            report(
                &mut dataset,
                self,
                self.message.as_ref(),
                "input",
                config,
                IssueDetail::new(),
            );
        }
        dataset
    }
}
