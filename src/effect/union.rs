//! Async union and discriminated-union schemas.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::schema::{adopt, join_expects, type_issue, union_issue, variant_issue, Schema, SchemaInfo};

use super::{AsyncSchemaLike, ObjectSchemaAsync};

/// A union whose options may be async.
///
/// Options are always tried one at a time, in declaration order.
pub struct UnionSchemaAsync {
    options: Vec<Box<dyn AsyncSchemaLike>>,
    message: Option<Message>,
}

impl UnionSchemaAsync {
    /// Creates a union with no options.
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            message: None,
        }
    }

    /// Appends an option.
    pub fn option<S>(mut self, schema: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.options.push(Box::new(schema));
        self
    }

    /// Sets the message used when no option matches.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Default for UnionSchemaAsync {
    fn default() -> Self {
        Self::new()
    }
}

impl ToJsonSchema for UnionSchemaAsync {
    fn to_json_schema(&self) -> Value {
        let options: Vec<Value> = self.options.iter().map(|o| o.to_json_schema()).collect();
        json!({ "anyOf": options })
    }
}

impl SchemaInfo for UnionSchemaAsync {
    fn code(&self) -> &str {
        "union"
    }

    fn expects(&self) -> String {
        join_expects(self.options.iter().map(|o| o.expects()))
    }
}

#[async_trait]
impl AsyncSchemaLike for UnionSchemaAsync {
    async fn run_async(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        let mut nested = Vec::new();
        for option in &self.options {
            let result = option.run_async(Dataset::new(dataset.value.clone()), config).await;
            if result.typed && !result.has_issues() {
                return adopt(dataset, result);
            }
            nested.extend(result.issues);
        }

        union_issue(&mut dataset, &self.expects(), self.message.as_ref(), nested, config);
        dataset
    }
}

/// A discriminated union over async object options.
///
/// Matches like [`VariantSchema`](crate::VariantSchema): options are checked
/// one at a time against the discriminator, and the first one that accepts
/// it validates the whole input.
///
/// # Example
///
/// ```rust
/// use sluice::{safe_parse_async, Schema};
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let event = Schema::variant_async("type")
///     .option(Schema::object_async().entry("type", Schema::literal("click")).entry("x", Schema::number()))
///     .option(Schema::object_async().entry("type", Schema::literal("key")).entry("code", Schema::string()));
///
/// assert!(safe_parse_async(&event, json!({"type": "key", "code": "a"})).await.is_success());
///
/// let issues = safe_parse_async(&event, json!({"type": "scroll"})).await.into_result().unwrap_err();
/// assert_eq!(issues.first().code, "variant");
/// # });
/// ```
pub struct VariantSchemaAsync {
    key: String,
    options: Vec<ObjectSchemaAsync>,
    message: Option<Message>,
}

impl VariantSchemaAsync {
    /// Creates a variant discriminated by `key`, with no options.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: Vec::new(),
            message: None,
        }
    }

    /// Appends an option. Options without an entry for the key never match.
    pub fn option(mut self, schema: ObjectSchemaAsync) -> Self {
        self.options.push(schema);
        self
    }

    /// Sets the message used for an unknown discriminator or a non-object.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The discriminator key.
    pub fn key(&self) -> &str {
        &self.key
    }

    fn discriminator_expects(&self) -> String {
        join_expects(
            self.options
                .iter()
                .filter_map(|o| o.entry_schema(&self.key))
                .map(|s| s.expects()),
        )
    }
}

impl ToJsonSchema for VariantSchemaAsync {
    fn to_json_schema(&self) -> Value {
        let options: Vec<Value> = self.options.iter().map(|o| o.to_json_schema()).collect();
        json!({ "oneOf": options })
    }
}

impl SchemaInfo for VariantSchemaAsync {
    fn code(&self) -> &str {
        "variant"
    }

    fn expects(&self) -> String {
        "Object".to_string()
    }
}

#[async_trait]
impl AsyncSchemaLike for VariantSchemaAsync {
    async fn run_async(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        let Some(input) = dataset.value.as_object() else {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        };

        if let Some(value) = input.get(&self.key).cloned() {
            for option in &self.options {
                let Some(schema) = option.entry_schema(&self.key) else {
                    continue;
                };
                let tag = schema.run_async(Dataset::new(value.clone()), config).await;
                if tag.typed && !tag.has_issues() {
                    return option.run_async(dataset, config).await;
                }
            }
        }

        let expects = self.discriminator_expects();
        variant_issue(&mut dataset, &self.key, &expects, self.message.as_ref(), config);
        dataset
    }
}

impl Schema {
    /// Creates an async union with no options.
    pub fn union_async() -> UnionSchemaAsync {
        UnionSchemaAsync::new()
    }

    /// Creates an async variant discriminated by `key`.
    pub fn variant_async(key: impl Into<String>) -> VariantSchemaAsync {
        VariantSchemaAsync::new(key)
    }
}
