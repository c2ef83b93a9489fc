use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::common::{Session, User};
use crate::error::FeedError;
use crate::network::backend::BackendContext;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

/// Sign up / sign in / sign out against the auth collaborator.
pub struct Account {
    backend: BackendContext,
    users_table: String,
}

impl Account {
    pub fn new(backend: BackendContext, users_table: impl Into<String>) -> Self {
        Self {
            backend,
            users_table: users_table.into(),
        }
    }

    /// Register, then record the user in the users table.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, FeedError> {
        let email = validate_credentials(email, password)?;
        let user = self
            .backend
            .auth
            .sign_up(email, password)
            .await
            .map_err(FeedError::from_auth)?;

        self.backend
            .store
            .insert(
                &self.users_table,
                json!({ "id": user.id, "email": user.email }),
            )
            .await?;

        log::info!("Registered {}", user.id);
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, FeedError> {
        let email = validate_credentials(email, password)?;
        self.backend
            .auth
            .sign_in(email, password)
            .await
            .map_err(FeedError::from_auth)
    }

    pub async fn sign_out(&self) -> Result<(), FeedError> {
        self.backend.auth.sign_out().await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<User>, FeedError> {
        Ok(self.backend.auth.current_user().await?)
    }
}

/// Returns the trimmed email.
fn validate_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str, FeedError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FeedError::Validation("Email is required.".to_string()));
    }
    if !EMAIL.is_match(email) {
        return Err(FeedError::Validation(format!(
            "`{email}` is not a valid email address."
        )));
    }
    if password.is_empty() {
        return Err(FeedError::Validation("Password is required.".to_string()));
    }
    Ok(email)
}
