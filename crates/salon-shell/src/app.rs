//! Application state for the salon shell.
//!
//! `App` owns the configuration, the session store, the navigator and the API
//! client, and turns shell commands into session and navigation changes.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use salon_core::{
    ApiClient, ApiError, Config, KeyValueStore, Navigation, NavigationGuard, Navigator, Route,
    SessionStore,
};
use tracing::{debug, error, info, warn};

use crate::command::{Command, HELP};

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

pub type Session = SessionStore<Box<dyn KeyValueStore>>;

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Quitting,
}

pub struct App {
    config: Config,
    config_path: Option<PathBuf>,
    session: Session,
    navigator: Navigator,
    api: ApiClient,
    pub state: AppState,
    /// Where the user wanted to go before being sent to login
    pending_path: Option<String>,
}

impl App {
    /// Open storage, rehydrate the session and evaluate `initial_path`.
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        cache_dir: &Path,
        initial_path: &str,
    ) -> Result<(Self, Navigation)> {
        debug!(?cache_dir, storage = %config.storage, "App::new() starting");
        let session = SessionStore::new(config.open_storage(cache_dir), config.admin_policy());
        let api = ApiClient::new(config.api_base_url.clone())?;
        Ok(Self::from_parts(config, config_path, session, api, initial_path))
    }

    pub fn from_parts(
        config: Config,
        config_path: Option<PathBuf>,
        mut session: Session,
        api: ApiClient,
        initial_path: &str,
    ) -> (Self, Navigation) {
        let (navigator, first) = Navigator::boot(NavigationGuard::new(), &mut session, initial_path);
        let mut app = Self {
            config,
            config_path,
            session,
            navigator,
            api,
            state: AppState::Normal,
            pending_path: None,
        };
        app.remember_redirect(&first);
        (app, first)
    }

    // =========================================================================
    // Main loop
    // =========================================================================

    pub async fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut line = String::new();

        while self.state != AppState::Quitting {
            print!("{}", self.prompt());
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }

            match Command::parse(&line) {
                Ok(command) => {
                    let output = self.execute(command).await;
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Go(path) => self.go(&path),
            Command::Login(username) => match self.prompt_credentials(username) {
                Ok((username, password)) => self.login(&username, &password).await,
                Err(e) => format!("Login cancelled: {}", e),
            },
            Command::Logout => self.logout().await,
            Command::Otp(Some(code)) => self.verify_otp(&code).await,
            Command::Otp(None) => self.otp_status().await,
            Command::WhoAmI => self.whoami(),
            Command::Profile => self.profile().await,
            Command::Routes => self.routes(),
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.state = AppState::Quitting;
                String::new()
            }
            Command::Empty => String::new(),
        }
    }

    pub fn prompt(&self) -> String {
        match self.session.current_user().username {
            Some(username) => format!("[{} {}]> ", self.navigator.current(), username),
            None => format!("[{}]> ", self.navigator.current()),
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn go(&mut self, path: &str) -> String {
        let navigation = self.navigator.navigate(path, &self.session);
        self.remember_redirect(&navigation);
        describe(&navigation)
    }

    fn remember_redirect(&mut self, navigation: &Navigation) {
        if navigation.was_redirected() {
            self.pending_path = Some(navigation.resolved.clone());
        }
    }

    pub fn routes(&self) -> String {
        Route::ALL
            .iter()
            .map(|route| {
                let access = if route.is_public() { "public" } else { "login required" };
                format!("  {:<14} {:<10} {}", route.path(), route.title(), access)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn current_path(&self) -> &str {
        self.navigator.current()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    fn prompt_credentials(&self, username: Option<String>) -> Result<(String, String)> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(username) => username,
            None => {
                print!("Username: ");
                io::stdout().flush()?;
                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                input.trim().to_string()
            }
        };
        let password = rpassword::prompt_password(format!("Password for {}: ", username))
            .context("Failed to read password")?;
        Ok((username, password))
    }

    /// Log in with the given credentials and move to the pending destination.
    pub async fn login(&mut self, username: &str, password: &str) -> String {
        if let Some(problem) = validate_credentials(username, password) {
            return problem.to_string();
        }

        match self.api.login(username, password).await {
            Ok(user) => {
                self.session.set_user(user);

                self.config.last_username = Some(username.to_string());
                if let Some(ref path) = self.config_path {
                    if let Err(e) = self.config.save_to(path) {
                        warn!(error = %e, "Failed to save config");
                    }
                }

                let target = self
                    .pending_path
                    .take()
                    .filter(|p| p != Route::Login.path())
                    .unwrap_or_else(|| Route::DEFAULT.path().to_string());
                let navigation = self.navigator.navigate(&target, &self.session);
                info!("Login successful");
                format!("Welcome, {}. {}", username, describe(&navigation))
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                login_error_message(&e)
            }
        }
    }

    /// Revoke the token server-side (best effort) and clear the session.
    pub async fn logout(&mut self) -> String {
        if !self.session.is_logged_in() {
            self.session.clear_user();
            return "Not logged in.".to_string();
        }

        if let Some(token) = self.session.token().cloned() {
            if let Err(e) = self.api.logout(&token).await {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }
        self.session.clear_user();
        self.pending_path = None;
        let navigation = self.navigator.revalidate(&self.session);
        info!("Logged out");
        format!("Logged out. {}", describe(&navigation))
    }

    pub async fn verify_otp(&mut self, code: &str) -> String {
        let Some(token) = self.session.token().cloned() else {
            return "Log in first.".to_string();
        };

        match self.api.verify_otp(&token, code).await {
            Ok(result) if result.success => {
                self.session.set_otp_verified(true);
                "OTP verified.".to_string()
            }
            Ok(result) => {
                if result.message.is_empty() {
                    "Invalid OTP.".to_string()
                } else {
                    result.message
                }
            }
            Err(e) => {
                error!(error = %e, "OTP verification failed");
                self.expire_if_rejected(&e)
                    .unwrap_or_else(|| format!("OTP verification failed: {:#}", e))
            }
        }
    }

    pub async fn otp_status(&mut self) -> String {
        let Some(token) = self.session.token().cloned() else {
            return "Log in first.".to_string();
        };
        match self.api.otp_status(&token).await {
            Ok(verified) => format!(
                "Server OTP status: {}. This session: {}.",
                verified_label(verified),
                verified_label(self.session.is_otp_verified())
            ),
            Err(e) => self
                .expire_if_rejected(&e)
                .unwrap_or_else(|| format!("Could not fetch OTP status: {:#}", e)),
        }
    }

    pub fn whoami(&self) -> String {
        let user = self.session.current_user();
        match (user.username, user.id) {
            (Some(username), Some(id)) if self.session.is_logged_in() => {
                let role = if self.session.is_admin() { "admin" } else { "staff" };
                format!(
                    "{} (id {}, {}), OTP {}",
                    username,
                    id,
                    role,
                    verified_label(self.session.is_otp_verified())
                )
            }
            _ => "Not logged in.".to_string(),
        }
    }

    pub async fn profile(&mut self) -> String {
        let Some(token) = self.session.token().cloned() else {
            return "Log in first.".to_string();
        };
        match self.api.profile(&token).await {
            Ok(profile) => format!(
                "{} (id {})\n  email:  {}\n  joined: {}",
                profile.username,
                profile.id,
                profile.email_display(),
                profile.date_joined.format("%Y-%m-%d")
            ),
            Err(e) => self
                .expire_if_rejected(&e)
                .unwrap_or_else(|| format!("Could not fetch profile: {:#}", e)),
        }
    }

    /// If the server rejected the token itself, drop the local session and
    /// send the user back to login. Returns the message to show in that case.
    fn expire_if_rejected(&mut self, e: &anyhow::Error) -> Option<String> {
        let rejected = e
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_auth_failure);
        if !rejected {
            return None;
        }

        warn!("Server rejected the session token, clearing local session");
        self.session.clear_user();
        let navigation = self.navigator.revalidate(&self.session);
        self.remember_redirect(&navigation);
        Some(format!("Session expired, please log in again. {}", describe(&navigation)))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn describe(navigation: &Navigation) -> String {
    if navigation.was_redirected() {
        format!(
            "{} requires login, showing {}.",
            navigation.resolved,
            navigation.destination()
        )
    } else {
        match Route::from_path(navigation.destination()) {
            Some(route) => format!("Showing {}.", route.title()),
            None => format!("Showing {}.", navigation.destination()),
        }
    }
}

fn verified_label(verified: bool) -> &'static str {
    if verified {
        "verified"
    } else {
        "not verified"
    }
}

/// Check the login form before sending anything.
fn validate_credentials(username: &str, password: &str) -> Option<&'static str> {
    if username.is_empty() || password.is_empty() {
        Some("Username and password required")
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        Some("Username is too long")
    } else if password.chars().count() > MAX_PASSWORD_LENGTH {
        Some("Password is too long")
    } else if username.chars().any(char::is_control) {
        Some("Username contains invalid characters")
    } else {
        None
    }
}

/// User-friendly message for a failed login.
fn login_error_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<ApiError>() {
        Some(ApiError::InvalidCredentials) => "Invalid username or password".to_string(),
        Some(ApiError::NetworkError(inner)) if inner.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        Some(ApiError::NetworkError(inner)) if inner.is_connect() => {
            "Unable to connect to server. Check that the backend is running.".to_string()
        }
        _ => format!("Login failed: {:#}", e),
    }
}
