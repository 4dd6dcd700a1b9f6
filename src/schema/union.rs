//! Union and discriminated-union schemas.

use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{add_issue, Issue, IssueContext, IssueDetail, IssueKind};
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::path::{ContainerType, IssuePath, PathItem, PathKey};

use super::object::ObjectSchema;
use super::traits::{SchemaInfo, SchemaLike};
use super::type_issue;

/// Joins option descriptions with ` | `, skipping repeats.
pub(crate) fn join_expects(expects: impl Iterator<Item = String>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for e in expects {
        if !seen.contains(&e) {
            seen.push(e);
        }
    }
    if seen.is_empty() {
        "never".to_string()
    } else {
        seen.join(" | ")
    }
}

/// Reports that no union option matched, nesting every option's issues.
pub(crate) fn union_issue(
    dataset: &mut Dataset,
    expects: &str,
    message: Option<&Message>,
    nested: Vec<Issue>,
    config: &Config,
) {
    let context = IssueContext::new(IssueKind::Schema, "union")
        .expects(Some(expects))
        .message(message);
    add_issue(dataset, context, "type", config, IssueDetail::new().issues(nested));
    dataset.typed = false;
}

/// Adopts a matching option's result while keeping issues already present.
pub(crate) fn adopt(mut dataset: Dataset, mut matched: Dataset) -> Dataset {
    if dataset.issues.is_empty() {
        return matched;
    }
    dataset.issues.append(&mut matched.issues);
    matched.issues = dataset.issues;
    matched
}

/// Accepts a value matching any of several schemas.
///
/// Options are tried in declaration order and the first one that produces
/// a typed dataset without issues wins; its output is returned. When none
/// does, a single `union` issue is reported whose nested `issues` hold the
/// issues of every option.
///
/// # Example
///
/// ```rust
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let id = Schema::union().option(Schema::string()).option(Schema::number());
///
/// assert!(safe_parse(&id, json!(7)).is_success());
///
/// let issues = safe_parse(&id, json!(true)).into_result().unwrap_err();
/// let issue = issues.first();
/// assert_eq!(issue.expected.as_deref(), Some("string | number"));
/// assert_eq!(issue.issues.as_ref().map(Vec::len), Some(2));
/// ```
pub struct UnionSchema {
    options: Vec<Box<dyn SchemaLike>>,
    message: Option<Message>,
}

impl UnionSchema {
    /// Creates a union with no options; it rejects every value.
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            message: None,
        }
    }

    /// Appends an option.
    pub fn option<S>(mut self, schema: S) -> Self
    where
        S: SchemaLike + 'static,
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

impl Default for UnionSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ToJsonSchema for UnionSchema {
    fn to_json_schema(&self) -> Value {
        let options: Vec<Value> = self.options.iter().map(|o| o.to_json_schema()).collect();
        json!({ "anyOf": options })
    }
}

impl SchemaInfo for UnionSchema {
    fn code(&self) -> &str {
        "union"
    }

    fn expects(&self) -> String {
        join_expects(self.options.iter().map(|o| o.expects()))
    }
}

impl SchemaLike for UnionSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        let mut nested = Vec::new();
        for option in &self.options {
            let result = option.run(Dataset::new(dataset.value.clone()), config);
            if result.typed && !result.has_issues() {
                return adopt(dataset, result);
            }
            nested.extend(result.issues);
        }

        union_issue(&mut dataset, &self.expects(), self.message.as_ref(), nested, config);
        dataset
    }
}

/// A union of object schemas selected by the value of one key.
///
/// The discriminator is checked against each option's schema for that key,
/// in declaration order; the first option whose discriminator schema
/// accepts the value validates the whole input. An unknown discriminator is
/// a `variant` schema issue at the discriminator key.
///
/// # Example
///
/// ```rust
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let shape = Schema::variant("kind")
///     .option(Schema::object().entry("kind", Schema::literal("circle")).entry("r", Schema::number()))
///     .option(Schema::object().entry("kind", Schema::literal("square")).entry("side", Schema::number()));
///
/// assert!(safe_parse(&shape, json!({"kind": "square", "side": 2})).is_success());
///
/// let issues = safe_parse(&shape, json!({"kind": "hexagon"})).into_result().unwrap_err();
/// assert_eq!(issues.first().code, "variant");
/// assert_eq!(issues.first().expected.as_deref(), Some("\"circle\" | \"square\""));
/// assert_eq!(issues.first().path.dot_path(), "kind");
/// ```
pub struct VariantSchema {
    key: String,
    options: Vec<ObjectSchema>,
    message: Option<Message>,
}

impl VariantSchema {
    /// Creates a variant discriminated by `key`, with no options.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: Vec::new(),
            message: None,
        }
    }

    /// Appends an option. Options without an entry for the key never match.
    pub fn option(mut self, schema: ObjectSchema) -> Self {
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

impl ToJsonSchema for VariantSchema {
    fn to_json_schema(&self) -> Value {
        let options: Vec<Value> = self.options.iter().map(|o| o.to_json_schema()).collect();
        json!({ "oneOf": options })
    }
}

impl SchemaInfo for VariantSchema {
    fn code(&self) -> &str {
        "variant"
    }

    fn expects(&self) -> String {
        "Object".to_string()
    }
}

/// Reports a discriminator that no option accepts, or a missing one.
pub(crate) fn variant_issue(
    dataset: &mut Dataset,
    key: &str,
    expects: &str,
    message: Option<&Message>,
    config: &Config,
) {
    let discriminator = dataset.value.get(key).cloned();
    let item = PathItem::new(ContainerType::Object, dataset.value.clone(), PathKey::field(key));
    let context = IssueContext::new(IssueKind::Schema, "variant")
        .expects(Some(expects))
        .message(message);
    let detail = match discriminator {
        Some(value) => IssueDetail::new().input(value),
        None => IssueDetail::new().missing(),
    };
    add_issue(dataset, context, "type", config, detail.path(IssuePath::from_item(item)));
    dataset.typed = false;
}

impl SchemaLike for VariantSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        let Some(input) = dataset.value.as_object() else {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        };

        if let Some(value) = input.get(&self.key) {
            for option in &self.options {
                let Some(schema) = option.entry_schema(&self.key) else {
                    continue;
                };
                let tag = schema.run(Dataset::new(value.clone()), config);
                if tag.typed && !tag.has_issues() {
                    return option.run(dataset, config);
                }
            }
        }

        let expects = self.discriminator_expects();
        variant_issue(&mut dataset, &self.key, &expects, self.message.as_ref(), config);
        dataset
    }
}
