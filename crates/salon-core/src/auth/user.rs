use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque user identifier. The backend sends numbers, durable storage holds
/// strings; both end up as the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => UserId::from(n),
            Raw::Text(s) => UserId(s),
        })
    }
}

/// Bearer credential issued by the backend.
///
/// `Debug` and `Display` never print the value; use `expose()` where the raw
/// string is actually needed (request headers, durable storage).
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identity produced by a successful login exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub id: UserId,
    pub username: String,
    pub token: Token,
    /// Role claim from the authentication exchange, if the backend sent one
    pub is_admin: Option<bool>,
}

impl UserData {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>, token: impl Into<Token>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            token: token.into(),
            is_admin: None,
        }
    }

    pub fn with_admin_claim(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }
}

/// Read-only projection of the signed-in user. Never carries the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Option<UserId>,
    pub username: Option<String>,
}
