//! JSON Schema export.
//!
//! Every schema renders itself through [`ToJsonSchema`]; pipelines let each
//! action add its keyword (`minLength`, `pattern`, `format`, ...) to the
//! base schema's object. [`export`] wraps the result into a standalone
//! draft 2020-12 document. Export never runs validation.

use serde_json::{Map, Value};

/// The `$schema` URI written by [`export`].
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Trait for converting schema types to JSON Schema format.
pub trait ToJsonSchema {
    /// Converts this schema to a JSON Schema fragment.
    fn to_json_schema(&self) -> Value;
}

/// Renders a schema as a standalone JSON Schema document.
///
/// # Example
///
/// ```rust
/// use sluice::action::min_length;
/// use sluice::interop::json_schema::export;
/// use sluice::Schema;
/// use serde_json::json;
///
/// let schema = Schema::object().entry("name", Schema::pipe(Schema::string()).action(min_length(1)));
/// let document = export(&schema);
///
/// assert_eq!(document["$schema"], "https://json-schema.org/draft/2020-12/schema");
/// assert_eq!(document["properties"]["name"], json!({"type": "string", "minLength": 1}));
/// ```
pub fn export<S: ToJsonSchema + ?Sized>(schema: &S) -> Value {
    let mut document = Map::new();
    document.insert("$schema".to_string(), Value::from(DRAFT_2020_12));
    match schema.to_json_schema() {
        Value::Object(fields) => document.extend(fields),
        // Boolean schemas cannot carry `$schema`.
        other => return other,
    }
    Value::Object(document)
}
