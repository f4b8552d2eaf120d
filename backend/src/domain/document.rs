//! Document addressing and the write vocabulary shared with the document store.
//!
//! Handlers never read documents back: they receive snapshots from the
//! dispatcher and describe writes as a map of field names to [`FieldWrite`]
//! values. Server-assigned timestamps and atomic increments are sentinels the
//! store resolves at commit time, mirroring the managed store's field
//! transforms.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw field map of a document snapshot.
pub type DocumentFields = serde_json::Map<String, Value>;

/// Validation errors for [`DocumentId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentIdValidationError {
    /// The identifier was empty.
    #[error("document id must not be empty")]
    Empty,
    /// The identifier contained a path separator.
    #[error("document id must not contain '/'")]
    ContainsSeparator,
}

/// Identifier of a document within its collection.
///
/// ## Invariants
/// - non-empty;
/// - contains no `/`, so it always addresses a single document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Validate and construct a [`DocumentId`].
    ///
    /// # Examples
    /// ```
    /// use leafline::domain::DocumentId;
    ///
    /// let id = DocumentId::new("u1").expect("valid id");
    /// assert_eq!(id.as_ref(), "u1");
    /// assert!(DocumentId::new("users/u1").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, DocumentIdValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DocumentIdValidationError::Empty);
        }
        if id.contains('/') {
            return Err(DocumentIdValidationError::ContainsSeparator);
        }
        Ok(Self(id))
    }

    /// Generate a random identifier, as the store does for appended documents.
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DocumentId> for String {
    fn from(value: DocumentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DocumentIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Collections this system touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// `users/{id}`
    Users,
    /// `plants/{id}`
    Plants,
    /// `messages/{id}`
    Messages,
    /// `analytics/{id}`, append-only.
    Analytics,
}

impl Collection {
    /// Collection path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Plants => "plants",
            Self::Messages => "messages",
            Self::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully qualified address of a single document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPath {
    /// Owning collection.
    pub collection: Collection,
    /// Identifier within the collection.
    pub id: DocumentId,
}

impl DocumentPath {
    /// Address `id` within `collection`.
    #[must_use]
    pub const fn new(collection: Collection, id: DocumentId) -> Self {
        Self { collection, id }
    }

    /// `users/{id}`
    #[must_use]
    pub const fn user(id: DocumentId) -> Self {
        Self::new(Collection::Users, id)
    }

    /// `plants/{id}`
    #[must_use]
    pub const fn plant(id: DocumentId) -> Self {
        Self::new(Collection::Plants, id)
    }

    /// `messages/{id}`
    #[must_use]
    pub const fn message(id: DocumentId) -> Self {
        Self::new(Collection::Messages, id)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A single field mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    /// Overwrite the field with a literal value.
    Set(Value),
    /// Overwrite the field with the store's commit timestamp.
    ServerTimestamp,
    /// Atomically add to a numeric field; a missing field counts as zero.
    Increment(i64),
}

/// Ordered set of field mutations applied to one document in one call.
///
/// # Examples
/// ```
/// use leafline::domain::{FieldWrite, FieldWrites};
///
/// let writes = FieldWrites::new()
///     .server_timestamp("createdAt")
///     .set("status", "active")
///     .increment("plantsAdded", 1);
/// assert_eq!(writes.get("plantsAdded"), Some(&FieldWrite::Increment(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldWrites(BTreeMap<String, FieldWrite>);

impl FieldWrites {
    /// Empty write set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to a literal value.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), FieldWrite::Set(value.into()));
        self
    }

    /// Set `field` to the store's commit timestamp.
    #[must_use]
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), FieldWrite::ServerTimestamp);
        self
    }

    /// Atomically add `by` to `field`.
    #[must_use]
    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.0.insert(field.into(), FieldWrite::Increment(by));
        self
    }

    /// Look up the write for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldWrite> {
        self.0.get(field)
    }

    /// Number of fields written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over field writes in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldWrite)> {
        self.0.iter().map(|(field, write)| (field.as_str(), write))
    }
}

impl IntoIterator for FieldWrites {
    type Item = (String, FieldWrite);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Whether a snapshot value would count as present for a presence guard.
///
/// Absent, `null`, `false`, `0` and `""` are treated as missing, matching the
/// dispatcher's loosely-typed snapshots.
#[must_use]
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
