//! Async pipelines.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::schema::{should_stop, Schema, SchemaInfo};

use super::{AsyncAction, AsyncSchemaLike};

/// A schema followed by actions, any of which may await.
///
/// Runs exactly like [`Pipe`](crate::Pipe): each action starts only after
/// the previous one has finished.
pub struct PipeAsync {
    schema: Box<dyn AsyncSchemaLike>,
    actions: Vec<Box<dyn AsyncAction>>,
}

impl PipeAsync {
    /// Creates a pipe with no actions.
    pub fn new<S>(schema: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        Self {
            schema: Box::new(schema),
            actions: Vec::new(),
        }
    }

    /// Appends an action.
    pub fn action<A>(mut self, action: A) -> Self
    where
        A: AsyncAction + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }
}

impl ToJsonSchema for PipeAsync {
    fn to_json_schema(&self) -> Value {
        let mut schema = self.schema.to_json_schema();
        if let Value::Object(fields) = &mut schema {
            for action in &self.actions {
                action.json_schema(fields);
            }
        }
        schema
    }
}

impl SchemaInfo for PipeAsync {
    fn code(&self) -> &str {
        self.schema.code()
    }

    fn expects(&self) -> String {
        self.schema.expects()
    }
}

#[async_trait]
impl AsyncSchemaLike for PipeAsync {
    async fn run_async(&self, dataset: Dataset, config: &Config) -> Dataset {
        let mut dataset = self.schema.run_async(dataset, config).await;
        if should_stop(&dataset, config) {
            tracing::trace!(schema = self.code(), "async pipe stopped after schema");
            return dataset;
        }

        for action in &self.actions {
            dataset = action.run_async(dataset, config).await;
            if should_stop(&dataset, config) {
                tracing::trace!(action = action.code(), "async pipe stopped early");
                break;
            }
        }
        dataset
    }
}

impl Schema {
    /// Attaches an async action pipeline to `schema`.
    pub fn pipe_async<S>(schema: S) -> PipeAsync
    where
        S: AsyncSchemaLike + 'static,
    {
        PipeAsync::new(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::min_length;
    use crate::effect::transform_async;
    use serde_json::json;

    #[tokio::test]
    async fn test_mixes_sync_and_async_actions() {
        let pipe = PipeAsync::new(Schema::string())
            .action(transform_async(|v| async move {
                Value::from(v.as_str().unwrap_or_default().repeat(2))
            }))
            .action(min_length(4));

        let result = pipe.run_async(Dataset::new(json!("ab")), &Config::new()).await;
        assert_eq!(result.value, json!("abab"));
        assert!(!result.has_issues());
    }

    #[tokio::test]
    async fn test_abort_pipe_early() {
        let pipe = PipeAsync::new(Schema::string())
            .action(min_length(4))
            .action(transform_async(|_| async { json!("changed") }));

        let config = Config::new().with_abort_pipe_early(true);
        let result = pipe.run_async(Dataset::new(json!("ab")), &config).await;
        assert_eq!(result.value, json!("ab"));
    }
}
