//! Async actions built from closures.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::action::{report, ActionInfo, ActionKind};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::IssueDetail;
use crate::message::Message;

use super::AsyncAction;

type AsyncPredicate = Arc<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;

/// Validates a value with an async predicate.
#[derive(Clone)]
pub struct AsyncCheckAction {
    predicate: AsyncPredicate,
    message: Option<Message>,
}

impl AsyncCheckAction {
    /// Sets the call-site message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Debug for AsyncCheckAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCheckAction")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Requires the future returned by `predicate` to resolve to true.
///
/// The predicate receives a copy of the value.
pub fn check_async<F, Fut>(predicate: F) -> AsyncCheckAction
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    AsyncCheckAction {
        predicate: Arc::new(move |value| predicate(value).boxed()),
        message: None,
    }
}

impl ActionInfo for AsyncCheckAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Validation
    }

    fn code(&self) -> &str {
        "check"
    }
}

#[async_trait]
impl AsyncAction for AsyncCheckAction {
    async fn run_async(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if dataset.typed && !(self.predicate)(dataset.value.clone()).await {
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

type AsyncOperation = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

/// Rewrites a value with an async function.
#[derive(Clone)]
pub struct AsyncTransformAction {
    operation: AsyncOperation,
}

impl fmt::Debug for AsyncTransformAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTransformAction").finish_non_exhaustive()
    }
}

/// Replaces the value with the output of `operation`.
pub fn transform_async<F, Fut>(operation: F) -> AsyncTransformAction
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Value> + Send + 'static,
{
    AsyncTransformAction {
        operation: Arc::new(move |value| operation(value).boxed()),
    }
}

impl ActionInfo for AsyncTransformAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Transformation
    }

    fn code(&self) -> &str {
        "transform"
    }
}

#[async_trait]
impl AsyncAction for AsyncTransformAction {
    async fn run_async(&self, mut dataset: Dataset, _config: &Config) -> Dataset {
        let value = std::mem::take(&mut dataset.value);
        dataset.value = (self.operation)(value).await;
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_check_async_skips_untyped() {
        let action = check_async(|_| async { false });
        let result = action.run_async(Dataset::new(json!(1)), &Config::new()).await;
        assert!(!result.has_issues());
    }

    #[tokio::test]
    async fn test_check_async_reports() {
        let action = check_async(|v| async move { v.as_i64() == Some(2) });
        let dataset = Dataset {
            typed: true,
            ..Dataset::new(json!(1))
        };
        let result = action.run_async(dataset, &Config::new()).await;
        assert_eq!(result.issues[0].code, "check");
    }

    #[tokio::test]
    async fn test_transform_async() {
        let action = transform_async(|v| async move { json!([v]) });
        let result = action.run_async(Dataset::new(json!(1)), &Config::new()).await;
        assert_eq!(result.value, json!([1]));
    }
}
