//! Entry points that run a schema over an input.
//!
//! [`safe_parse`] returns a [`ValidationResult`] and never fails itself;
//! [`parse`] turns the failure side into a [`ValiError`] for use with `?`.
//! Both return the schema's output value, which may differ from the input
//! when the schema transforms it.

use serde_json::Value;
use stillwater::Validation;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::ValiError;
use crate::schema::SchemaLike;
use crate::ValidationResult;

fn finish(dataset: Dataset, code: &str) -> ValidationResult<Value> {
    let result = dataset.into_validation();
    if let Validation::Failure(issues) = &result {
        tracing::debug!(
            schema = code,
            issues = issues.len(),
            first = %issues.first().message,
            "validation failed"
        );
    }
    result
}

/// Validates `input` with the default config.
///
/// # Example
///
/// ```rust
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let result = safe_parse(&Schema::number(), json!("1"));
/// assert!(result.is_failure());
/// ```
pub fn safe_parse<S>(schema: &S, input: Value) -> ValidationResult<Value>
where
    S: SchemaLike + ?Sized,
{
    safe_parse_with(schema, input, &Config::new())
}

/// Validates `input` with an explicit config.
pub fn safe_parse_with<S>(schema: &S, input: Value, config: &Config) -> ValidationResult<Value>
where
    S: SchemaLike + ?Sized,
{
    finish(schema.run(Dataset::new(input), config), schema.code())
}

/// Validates `input`, returning the output or a [`ValiError`].
///
/// # Example
///
/// ```rust
/// use sluice::{parse, Schema};
/// use serde_json::json;
///
/// let err = parse(&Schema::string(), json!(5)).unwrap_err();
/// assert_eq!(err.to_string(), "Invalid type: Expected string but received 5");
/// assert_eq!(err.issues().len(), 1);
/// ```
pub fn parse<S>(schema: &S, input: Value) -> Result<Value, ValiError>
where
    S: SchemaLike + ?Sized,
{
    parse_with(schema, input, &Config::new())
}

/// Validates `input` with an explicit config, returning the output or a
/// [`ValiError`].
pub fn parse_with<S>(schema: &S, input: Value, config: &Config) -> Result<Value, ValiError>
where
    S: SchemaLike + ?Sized,
{
    safe_parse_with(schema, input, config)
        .into_result()
        .map_err(ValiError::from)
}

/// Returns true if `input` passes `schema` without issues.
///
/// Stops at the first issue.
pub fn is<S>(schema: &S, input: Value) -> bool
where
    S: SchemaLike + ?Sized,
{
    let config = Config::new().with_abort_early(true);
    !schema.run(Dataset::new(input), &config).has_issues()
}

#[cfg(feature = "effect")]
mod effect {
    use super::*;
    use crate::effect::AsyncSchemaLike;

    /// Validates `input` with an async schema and the default config.
    pub async fn safe_parse_async<S>(schema: &S, input: Value) -> ValidationResult<Value>
    where
        S: AsyncSchemaLike + ?Sized,
    {
        safe_parse_async_with(schema, input, &Config::new()).await
    }

    /// Validates `input` with an async schema and an explicit config.
    pub async fn safe_parse_async_with<S>(
        schema: &S,
        input: Value,
        config: &Config,
    ) -> ValidationResult<Value>
    where
        S: AsyncSchemaLike + ?Sized,
    {
        let dataset = schema.run_async(Dataset::new(input), config).await;
        finish(dataset, schema.code())
    }

    /// Validates `input` with an async schema, returning the output or a
    /// [`ValiError`].
    pub async fn parse_async<S>(schema: &S, input: Value) -> Result<Value, ValiError>
    where
        S: AsyncSchemaLike + ?Sized,
    {
        parse_async_with(schema, input, &Config::new()).await
    }

    /// Validates `input` with an async schema and an explicit config,
    /// returning the output or a [`ValiError`].
    pub async fn parse_async_with<S>(
        schema: &S,
        input: Value,
        config: &Config,
    ) -> Result<Value, ValiError>
    where
        S: AsyncSchemaLike + ?Sized,
    {
        safe_parse_async_with(schema, input, config)
            .await
            .into_result()
            .map_err(ValiError::from)
    }
}

#[cfg(feature = "effect")]
pub use effect::{parse_async, parse_async_with, safe_parse_async, safe_parse_async_with};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{min_length, to_trimmed};
    use crate::schema::Schema;
    use serde_json::json;

    #[test]
    fn test_parse_returns_transformed_output() {
        let schema = Schema::pipe(Schema::string()).action(to_trimmed());
        assert_eq!(parse(&schema, json!("  x ")).unwrap(), json!("x"));
    }

    #[test]
    fn test_parse_error_carries_all_issues() {
        let schema = Schema::object()
            .entry("a", Schema::pipe(Schema::string()).action(min_length(2)))
            .entry("b", Schema::number());
        let err = parse(&schema, json!({"a": "x", "b": "y"})).unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert_eq!(err.to_string(), err.issues().first().message);
    }

    #[test]
    fn test_is_works_with_trait_objects() {
        let schema: Box<dyn SchemaLike> = Box::new(Schema::boolean());
        assert!(is(schema.as_ref(), json!(true)));
        assert!(!is(schema.as_ref(), json!(null)));
    }
}
