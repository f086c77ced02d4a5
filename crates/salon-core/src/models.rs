//! Response models for the account endpoints.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Account details for the signed-in user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date_joined: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps and the offset-less form Django emits with
/// `USE_TZ = False`, which is taken as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

impl Profile {
    pub fn email_display(&self) -> &str {
        if self.email.is_empty() {
            "-"
        } else {
            &self.email
        }
    }
}

/// Outcome of submitting a one-time code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OtpVerification {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
