//! Session identity model.
//!
//! The sign-in flow itself lives outside this crate; core only sees the
//! resolved identity (or its absence).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque identity key assigned by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed-in identity as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Display name from provider profile metadata, when present.
    pub display_name: Option<String>,
    /// Avatar URL from provider profile metadata, when present.
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates an identity with no profile metadata.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            avatar_url: None,
        }
    }
}
