//! Authenticated caller identity supplied by the identity provider.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for [`CallerIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallerIdentityValidationError {
    /// The uid was blank.
    #[error("caller uid must not be empty")]
    EmptyUid,
}

/// Opaque identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Validate and construct an identity from a provider uid.
    pub fn new(uid: impl Into<String>) -> Result<Self, CallerIdentityValidationError> {
        let uid = uid.into();
        if uid.trim().is_empty() {
            return Err(CallerIdentityValidationError::EmptyUid);
        }
        Ok(Self(uid))
    }

    /// Provider-assigned uid.
    #[must_use]
    pub fn uid(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CallerIdentity> for String {
    fn from(value: CallerIdentity) -> Self {
        value.0
    }
}

impl TryFrom<String> for CallerIdentity {
    type Error = CallerIdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
