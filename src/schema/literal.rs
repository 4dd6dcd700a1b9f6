//! Schemas accepting fixed values.

use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::stringify;
use crate::interop::ToJsonSchema;
use crate::message::Message;

use super::traits::{SchemaInfo, SchemaLike};
use super::type_issue;

/// Accepts exactly one value.
#[derive(Debug, Clone)]
pub struct LiteralSchema {
    literal: Value,
    message: Option<Message>,
}

impl LiteralSchema {
    pub(crate) fn new(literal: Value) -> Self {
        Self {
            literal,
            message: None,
        }
    }

    /// Sets the message used when the value differs.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The accepted value.
    pub fn literal(&self) -> &Value {
        &self.literal
    }
}

impl ToJsonSchema for LiteralSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "const": self.literal })
    }
}

impl SchemaInfo for LiteralSchema {
    fn code(&self) -> &str {
        "literal"
    }

    fn expects(&self) -> String {
        stringify(&self.literal)
    }
}

impl SchemaLike for LiteralSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if dataset.value == self.literal {
            dataset.typed = true;
        } else {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
        }
        dataset
    }
}

/// Accepts any one of a fixed list of values.
///
/// # Example
///
/// ```rust
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let role = Schema::picklist(["admin", "editor"]);
/// let issues = safe_parse(&role, json!("guest")).into_result().unwrap_err();
/// assert_eq!(issues.first().expected.as_deref(), Some("\"admin\" | \"editor\""));
/// ```
#[derive(Debug, Clone)]
pub struct PicklistSchema {
    options: Vec<Value>,
    message: Option<Message>,
}

impl PicklistSchema {
    pub(crate) fn new(options: Vec<Value>) -> Self {
        Self {
            options,
            message: None,
        }
    }

    /// Sets the message used when the value is not one of the options.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The accepted values, in declaration order.
    pub fn options(&self) -> &[Value] {
        &self.options
    }
}

impl ToJsonSchema for PicklistSchema {
    fn to_json_schema(&self) -> Value {
        json!({ "enum": self.options })
    }
}

impl SchemaInfo for PicklistSchema {
    fn code(&self) -> &str {
        "picklist"
    }

    fn expects(&self) -> String {
        if self.options.is_empty() {
            return "never".to_string();
        }
        self.options
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl SchemaLike for PicklistSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if self.options.contains(&dataset.value) {
            dataset.typed = true;
        } else {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
        }
        dataset
    }
}
