//! Leaf schemas for the JSON primitives.

use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::message::Message;

use super::traits::{SchemaInfo, SchemaLike};
use super::type_issue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primitive {
    Any,
    String,
    Number,
    Boolean,
    Null,
}

impl Primitive {
    fn name(self) -> &'static str {
        match self {
            Primitive::Any => "any",
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Primitive::Any => true,
            Primitive::String => value.is_string(),
            Primitive::Number => value.is_number(),
            Primitive::Boolean => value.is_boolean(),
            Primitive::Null => value.is_null(),
        }
    }
}

/// A schema accepting one JSON primitive type (or anything, for `any`).
///
/// # Example
///
/// ```rust
/// use sluice::{is, Schema};
/// use serde_json::json;
///
/// assert!(is(&Schema::string(), json!("hello")));
/// assert!(!is(&Schema::string(), json!(42)));
/// assert!(is(&Schema::any(), json!({"anything": true})));
/// ```
#[derive(Debug, Clone)]
pub struct PrimitiveSchema {
    primitive: Primitive,
    message: Option<Message>,
}

impl PrimitiveSchema {
    fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            message: None,
        }
    }

    pub(crate) fn any() -> Self {
        Self::new(Primitive::Any)
    }

    pub(crate) fn string() -> Self {
        Self::new(Primitive::String)
    }

    pub(crate) fn number() -> Self {
        Self::new(Primitive::Number)
    }

    pub(crate) fn boolean() -> Self {
        Self::new(Primitive::Boolean)
    }

    pub(crate) fn null() -> Self {
        Self::new(Primitive::Null)
    }

    /// Sets the message used when the value has the wrong type.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ToJsonSchema for PrimitiveSchema {
    fn to_json_schema(&self) -> Value {
        match self.primitive {
            Primitive::Any => json!({}),
            other => json!({ "type": other.name() }),
        }
    }
}

impl SchemaInfo for PrimitiveSchema {
    fn code(&self) -> &str {
        self.primitive.name()
    }

    fn expects(&self) -> String {
        self.primitive.name().to_string()
    }
}

impl SchemaLike for PrimitiveSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if self.primitive.accepts(&dataset.value) {
            dataset.typed = true;
        } else {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
        }
        dataset
    }
}
