//! Issue paths for locating failures in nested structures.
//!
//! This module provides [`IssuePath`] and [`PathItem`]. Paths are built from
//! the inside out: a failing child reports an issue with an empty path and
//! every ancestor container prepends its own [`PathItem`] as the issue
//! bubbles up, so a finished path reads outermost-first.

use std::fmt::{self, Display};
use std::sync::Arc;

use serde_json::Value;

/// The kind of container a [`PathItem`] steps through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerType {
    Object,
    Array,
    Tuple,
    Record,
}

impl ContainerType {
    /// Returns the lowercase name of the container kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerType::Object => "object",
            ContainerType::Array => "array",
            ContainerType::Tuple => "tuple",
            ContainerType::Record => "record",
        }
    }
}

/// Whether a failure happened on a container's key or on its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathOrigin {
    Key,
    Value,
}

/// The key used to reach a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// A field/property key (e.g. `user`, `email`)
    Field(String),
    /// An array or tuple index (e.g. `0`, `42`)
    Index(usize),
}

impl PathKey {
    /// Creates a new field key.
    pub fn field(name: impl Into<String>) -> Self {
        PathKey::Field(name.into())
    }

    /// Creates a new index key.
    pub fn index(idx: usize) -> Self {
        PathKey::Index(idx)
    }
}

impl Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Field(name) => write!(f, "{}", name),
            PathKey::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// One step from a container to one of its children.
///
/// Besides the key, a path item records the whole container input, so
/// callers can inspect the failing context without walking the original
/// input again. The container is shared: every item a composite creates
/// during one run points at the same allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    /// The kind of container.
    pub container: ContainerType,
    /// Whether the key itself or the value at the key failed.
    pub origin: PathOrigin,
    /// The container value.
    pub input: Arc<Value>,
    /// The key within the container.
    pub key: PathKey,
}

impl PathItem {
    /// Creates a path item for a value-origin failure.
    pub fn new(container: ContainerType, input: impl Into<Arc<Value>>, key: PathKey) -> Self {
        Self {
            container,
            origin: PathOrigin::Value,
            input: input.into(),
            key,
        }
    }

    /// Marks this item as a key-origin failure.
    pub fn on_key(mut self) -> Self {
        self.origin = PathOrigin::Key;
        self
    }

    /// Returns the value at `key`, or `None` when the key is missing.
    pub fn value(&self) -> Option<&Value> {
        match &self.key {
            PathKey::Field(name) => self.input.get(name.as_str()),
            PathKey::Index(idx) => self.input.get(*idx),
        }
    }
}

/// An outermost-first sequence of [`PathItem`]s.
///
/// # Example
///
/// ```rust
/// use sluice::{ContainerType, IssuePath, PathItem, PathKey};
/// use serde_json::json;
///
/// let mut path = IssuePath::root();
/// path.prepend(PathItem::new(ContainerType::Array, json!([{}]), PathKey::index(0)));
/// path.prepend(PathItem::new(ContainerType::Object, json!({}), PathKey::field("users")));
///
/// assert_eq!(path.dot_path(), "users.0");
/// assert_eq!(path.to_string(), "users[0]");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssuePath {
    items: Vec<PathItem>,
}

impl IssuePath {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path holding a single item.
    pub fn from_item(item: PathItem) -> Self {
        Self { items: vec![item] }
    }

    /// Inserts an item in front of the path.
    ///
    /// Called by each ancestor container while an issue travels upwards.
    pub fn prepend(&mut self, item: PathItem) {
        self.items.insert(0, item);
    }

    /// Returns true if this is the root path (no items).
    pub fn is_root(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this path.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this path has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over the path items, outermost first.
    pub fn items(&self) -> impl Iterator<Item = &PathItem> {
        self.items.iter()
    }

    /// Returns an iterator over the keys, outermost first.
    pub fn keys(&self) -> impl Iterator<Item = &PathKey> {
        self.items.iter().map(|item| &item.key)
    }

    /// Returns the innermost item, or None if this is root.
    pub fn last(&self) -> Option<&PathItem> {
        self.items.last()
    }

    /// Joins every key with `.` (e.g. `nested.0.dot.0.path`).
    pub fn dot_path(&self) -> String {
        self.keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Display for IssuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys().enumerate() {
            match key {
                PathKey::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathKey::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
