//! Auth API: login, registration, session verification, logout.
//!
//! The service is a two-state machine over {Anonymous, Authenticated}.
//! Login and register persist the returned token to the token store on
//! success; logout and failed verification clear it. Credential checks run
//! locally before any network call.

use crate::{
    client::{CallOptions, Client},
    error::{Error, Result},
    types::{AuthResponse, AuthStatus, LoginRequest, RegisterRequest, UserProfile},
};

/// Auth API client.
#[derive(Debug)]
pub struct AuthApi<'a> {
    pub(crate) client: &'a Client,
}

impl AuthApi<'_> {
    /// Log in with a username (or email) and password.
    ///
    /// On success the returned token is written to the token store. On
    /// failure the store is left untouched and the server's message is
    /// rewritten into a user-facing one.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        let errors = validate_login(identifier, password);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let request = LoginRequest {
            username: identifier.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .client
            .post("tour-auth/login", &request, CallOptions::default())
            .await
            .map_err(rewrite_auth_error)?;

        if let Some(token) = &response.token {
            self.client.token_store().set(token);
            tracing::info!(identifier = identifier, "Login succeeded, token stored");
        } else {
            tracing::warn!(identifier = identifier, "Login response carried no token");
        }
        Ok(response)
    }

    /// Register a new account.
    ///
    /// Same token-persist-on-success contract as [`login`](Self::login).
    pub async fn register(&self, profile: RegisterRequest) -> Result<AuthResponse> {
        let errors = validate_registration(&profile);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let response: AuthResponse = self
            .client
            .post("tour-auth/register", &profile, CallOptions::default())
            .await
            .map_err(rewrite_auth_error)?;

        if let Some(token) = &response.token {
            self.client.token_store().set(token);
            tracing::info!(username = %profile.username, "Registration succeeded, token stored");
        }
        Ok(response)
    }

    /// Check whether the stored session is still valid.
    ///
    /// Called once at application start; never fails. If no token is stored
    /// this returns [`AuthStatus::Anonymous`] without touching the network.
    /// Otherwise the token is verified against the backend; any failure
    /// clears it and maps to `Anonymous`.
    pub async fn check_auth_status(&self) -> AuthStatus {
        if self.client.token_store().get().is_none() {
            tracing::debug!("No stored token, skipping verification");
            return AuthStatus::Anonymous;
        }

        match self
            .client
            .get::<UserProfile>("tour-auth/verify", CallOptions::authed())
            .await
        {
            Ok(user) => AuthStatus::Authenticated(user),
            Err(err) => {
                tracing::info!(error = %err, "Stored token failed verification");
                // The 401 path has already cleared via the client; this
                // covers network failures and other statuses.
                self.client.token_store().clear();
                AuthStatus::Anonymous
            }
        }
    }

    /// Log out.
    ///
    /// The server call is best-effort: a failure is logged, never surfaced.
    /// The token store is cleared unconditionally so the logged-out state
    /// holds even when the server is unreachable.
    pub async fn logout(&self) {
        if let Err(err) = self
            .client
            .post_empty::<serde_json::Value>("tour-auth/logout", CallOptions::authed())
            .await
        {
            tracing::warn!(error = %err, "Logout request failed, clearing local session anyway");
        }
        self.client.token_store().clear();
    }
}

/// Rewrite known server messages into user-facing ones.
fn rewrite_auth_error(err: Error) -> Error {
    if let Error::Api { status, message } = &err {
        let rewritten = if message.contains("Username already registered") {
            Some("That username is already taken")
        } else if message.contains("Email already registered") {
            Some("An account with this email already exists")
        } else if message.contains("Invalid credentials") || message.contains("Incorrect password")
        {
            Some("Incorrect username or password")
        } else {
            None
        };
        if let Some(rewritten) = rewritten {
            return Error::Api {
                status: *status,
                message: rewritten.to_string(),
            };
        }
    }
    err
}

/// Validate login inputs. Returns human-readable messages; empty means ok.
#[must_use]
pub fn validate_login(identifier: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if identifier.trim().is_empty() {
        errors.push("Username or email is required".to_string());
    }
    errors.extend(validate_password(password));
    errors
}

/// Validate registration inputs. Returns human-readable messages.
#[must_use]
pub fn validate_registration(profile: &RegisterRequest) -> Vec<String> {
    let mut errors = Vec::new();

    let username = profile.username.trim();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    } else {
        if username.chars().count() < 3 {
            errors.push("Username must be at least 3 characters".to_string());
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push("Username may only contain letters, digits and underscores".to_string());
        }
    }

    if profile.full_name.trim().is_empty() {
        errors.push("Full name is required".to_string());
    }

    let email = profile.email.trim();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_basic_email(email) {
        errors.push("Email address is not valid".to_string());
    }

    errors.extend(validate_password(&profile.password));
    errors
}

fn validate_password(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        errors.push("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit".to_string());
    }
    errors
}

// Basic local@domain shape, nothing more. The server does the real check.
fn is_basic_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.starts_with('.') && domain.contains('.')
        }
        None => false,
    }
}
