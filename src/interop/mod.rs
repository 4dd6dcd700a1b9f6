//! Interoperability with other schema formats.
//!
//! This module renders sluice schemas as JSON Schema documents.

pub mod json_schema;

pub use json_schema::ToJsonSchema;
