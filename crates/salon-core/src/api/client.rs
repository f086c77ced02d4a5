//! API client for communicating with the salon REST backend.
//!
//! The backend authenticates with DRF token auth: the login endpoint returns
//! a token which is then sent as `Authorization: Token <key>`. Cookies set by
//! the backend (CSRF, session) are kept in the client's cookie store and sent
//! back automatically.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ApiError;
use crate::auth::{Token, UserData, UserId};
use crate::models::{OtpVerification, Profile};

// ============================================================================
// Constants
// ============================================================================

/// Backend address used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/api/auth/login/";
const LOGOUT_PATH: &str = "/api/auth/logout/";
const VERIFY_OTP_PATH: &str = "/api/clients/verify-otp/";
const OTP_STATUS_PATH: &str = "/api/clients/otp-status/";
const PROFILE_PATH: &str = "/api/users/profile/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user_id: UserId,
    username: String,
    #[serde(default)]
    is_admin: Option<bool>,
}

impl From<LoginResponse> for UserData {
    fn from(resp: LoginResponse) -> Self {
        UserData {
            id: resp.user_id,
            username: resp.username,
            token: Token::from(resp.token),
            is_admin: resp.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct OtpStatusResponse {
    otp_verified: bool,
}

/// API client for the salon backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "API client created");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(token: &Token) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        let mut value = header::HeaderValue::from_str(&format!("Token {}", token.expose()))
            .context("Token contains characters not allowed in a header")?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &Token) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(Self::auth_headers(token)?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, token: &Token, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(Self::auth_headers(token)?)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Exchange credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserData> {
        let url = self.url(LOGIN_PATH);
        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send login request")?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorBody>(&body).ok().and_then(|b| b.error);
            warn!(username, reason = reason.as_deref().unwrap_or("unknown"), "Login rejected");
            return Err(ApiError::InvalidCredentials.into());
        }

        let response = Self::check_response(response).await?;
        let login: LoginResponse = response.json().await.context("Failed to parse login response")?;
        info!(user_id = %login.user_id, username = %login.username, "Login accepted");
        Ok(login.into())
    }

    /// Revoke the token on the server.
    pub async fn logout(&self, token: &Token) -> Result<()> {
        let _: serde_json::Value = self.post(LOGOUT_PATH, token, &serde_json::json!({})).await?;
        Ok(())
    }

    // ===== One-time codes =====

    pub async fn verify_otp(&self, token: &Token, code: &str) -> Result<OtpVerification> {
        self.post(VERIFY_OTP_PATH, token, &OtpRequest { code }).await
    }

    /// Ask the server whether the current user passed OTP recently.
    pub async fn otp_status(&self, token: &Token) -> Result<bool> {
        let status: OtpStatusResponse = self.get(OTP_STATUS_PATH, token).await?;
        Ok(status.otp_verified)
    }

    // ===== Account =====

    pub async fn profile(&self, token: &Token) -> Result<Profile> {
        self.get(PROFILE_PATH, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url(LOGIN_PATH), "http://localhost:8000/api/auth/login/");
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"token": "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b", "user_id": 12, "username": "danil"}"#;
        let resp: LoginResponse = serde_json::from_str(json).expect("Failed to parse login test JSON");
        let user = UserData::from(resp);
        assert_eq!(user.id, UserId::from(12));
        assert_eq!(user.username, "danil");
        assert_eq!(user.token.expose(), "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b");
        assert_eq!(user.is_admin, None);
    }

    #[test]
    fn test_parse_login_response_with_role_claim() {
        let json = r#"{"token": "t", "user_id": "12", "username": "kate", "is_admin": true}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(UserData::from(resp).is_admin, Some(true));
    }

    #[test]
    fn test_parse_error_body() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "Invalid credentials"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_auth_header_uses_token_scheme() {
        let headers = ApiClient::auth_headers(&Token::new("abc")).unwrap();
        let value = headers.get(header::AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Token abc");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_auth_header_rejects_newlines() {
        assert!(ApiClient::auth_headers(&Token::new("abc\ndef")).is_err());
    }
}
