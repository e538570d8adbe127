//! Field paths and path resolution
//!
//! Provides [`FieldPath`] for addressing a nesting level of the field tree,
//! plus the resolvers every edit goes through.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::edit::EditError;
use crate::field::FieldKind;
use crate::schema::{Level, LevelRef, Properties, Schema};

/// Dotted chain of field names from the root into nested objects
///
/// The empty path is the root level.
///
/// # Examples
/// - `""` → root `properties`
/// - `"address"` → `properties` of the `address` object
/// - `"order.shipping.address"` → three levels down
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path with one segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Root level
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Enclosing level (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, rest)| Self(rest.to_vec()))
    }

    /// Innermost segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl From<Vec<String>> for FieldPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Errors parsing a field path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// `a..b`, leading or trailing dot
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Fields of the level addressed by `path`
///
/// # Errors
/// - `EditError::PathNotFound` if a segment names no field
/// - `EditError::NotAnObject` if a segment names a non-object field
pub fn resolve<'a>(schema: &'a Schema, path: &FieldPath) -> Result<&'a Properties, EditError> {
    resolve_level(schema, path).map(|level| level.properties)
}

/// Fields and required set of the level addressed by `path`
///
/// # Errors
/// Same as [`resolve`].
pub fn resolve_level<'a>(schema: &'a Schema, path: &FieldPath) -> Result<LevelRef<'a>, EditError> {
    let mut level = schema.level();
    let mut walked = FieldPath::root();

    for segment in path.iter() {
        walked = walked.child(segment);
        let field = level
            .properties
            .get(segment)
            .ok_or_else(|| EditError::PathNotFound { path: walked.clone() })?;
        level = match &field.kind {
            FieldKind::Object(obj) => obj.level(),
            _ => return Err(EditError::NotAnObject { path: walked }),
        };
    }

    Ok(level)
}

/// Build a new schema in which the level at `path` has been transformed
///
/// Only the root and the object fields along `path` are copied; every
/// other subtree is shared with `schema`, which is left untouched. If
/// resolution or `transform` fails, the partially built copy is dropped.
///
/// # Errors
/// Resolution errors as in [`resolve`], or whatever `transform` returns.
pub fn apply_at_path<T, F>(
    schema: &Schema,
    path: &FieldPath,
    transform: F,
) -> Result<(Schema, T), EditError>
where
    F: FnOnce(Level<'_>) -> Result<T, EditError>,
{
    let mut next = schema.clone();
    let mut level = next.level_mut();
    let mut walked = FieldPath::root();

    for segment in path.iter() {
        walked = walked.child(segment);
        let properties = level.properties;
        let field = properties
            .get_mut(segment)
            .ok_or_else(|| EditError::PathNotFound { path: walked.clone() })?;
        level = match &mut field.kind {
            FieldKind::Object(obj) => obj.level_mut(),
            _ => return Err(EditError::NotAnObject { path: walked }),
        };
    }

    let output = transform(level)?;
    Ok((next, output))
}
