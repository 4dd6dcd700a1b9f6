//! Schemas with an attached action pipeline.

use serde_json::Value;

use crate::action::Action;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;

use super::traits::{SchemaInfo, SchemaLike};

/// A schema followed by an ordered list of actions.
///
/// Running a pipe runs the schema, then each action in declaration order,
/// each seeing the value as left by the stage before it. Once the dataset
/// has issues, the remaining actions are skipped if either `abort_early` or
/// `abort_pipe_early` is set.
///
/// # Example
///
/// ```rust
/// use sluice::action::{min_length, to_trimmed};
/// use sluice::{parse, Schema};
/// use serde_json::json;
///
/// let name = Schema::pipe(Schema::string()).action(to_trimmed()).action(min_length(1));
///
/// assert_eq!(parse(&name, json!("  Ada ")).unwrap(), json!("Ada"));
/// assert!(parse(&name, json!("   ")).is_err());
/// ```
pub struct Pipe {
    schema: Box<dyn SchemaLike>,
    actions: Vec<Box<dyn Action>>,
}

impl Pipe {
    /// Creates a pipe with no actions.
    pub fn new<S>(schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        Self {
            schema: Box::new(schema),
            actions: Vec::new(),
        }
    }

    /// Appends an action.
    pub fn action<A>(mut self, action: A) -> Self
    where
        A: Action + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }

    /// Number of actions after the schema.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the pipe has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Returns true when a pipeline must stop after a stage.
pub(crate) fn should_stop(dataset: &Dataset, config: &Config) -> bool {
    dataset.has_issues() && (config.abort_early() || config.abort_pipe_early())
}

impl ToJsonSchema for Pipe {
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

impl SchemaInfo for Pipe {
    fn code(&self) -> &str {
        self.schema.code()
    }

    fn expects(&self) -> String {
        self.schema.expects()
    }
}

impl SchemaLike for Pipe {
    fn run(&self, dataset: Dataset, config: &Config) -> Dataset {
        let mut dataset = self.schema.run(dataset, config);
        if should_stop(&dataset, config) {
            tracing::trace!(schema = self.code(), "pipe stopped after schema");
            return dataset;
        }

        for action in &self.actions {
            dataset = action.run(dataset, config);
            if should_stop(&dataset, config) {
                tracing::trace!(action = action.code(), "pipe stopped early");
                break;
            }
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{check, min_length, to_trimmed, transform};
    use crate::schema::Schema;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_actions_run_in_order() {
        let pipe = Pipe::new(Schema::string())
            .action(to_trimmed())
            .action(transform(|v| Value::from(format!("{}!", v.as_str().unwrap_or_default()))));
        let result = pipe.run(Dataset::new(json!(" hi ")), &Config::new());
        assert_eq!(result.value, json!("hi!"));
    }

    #[test]
    fn test_all_actions_run_without_abort_flags() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let pipe = Pipe::new(Schema::string())
            .action(min_length(10))
            .action(check(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }));

        let result = pipe.run(Dataset::new(json!("abc")), &Config::new());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_abort_pipe_early_skips_remaining_actions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let pipe = Pipe::new(Schema::string())
            .action(min_length(10))
            .action(check(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }));

        let config = Config::new().with_abort_pipe_early(true);
        let result = pipe.run(Dataset::new(json!("abc")), &config);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_schema_failure_with_abort_early() {
        let pipe = Pipe::new(Schema::string()).action(transform(|_| json!("replaced")));
        let config = Config::new().with_abort_early(true);
        let result = pipe.run(Dataset::new(json!(1)), &config);
        assert_eq!(result.value, json!(1));
    }

    #[test]
    fn test_json_schema_collects_action_keywords() {
        let pipe = Pipe::new(Schema::string()).action(min_length(2));
        assert_eq!(pipe.to_json_schema(), json!({"type": "string", "minLength": 2}));
    }
}
