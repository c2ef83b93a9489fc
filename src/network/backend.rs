use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::common::{Session, User};
use crate::config::{AppConfig, BackendConfig};
use crate::error::BackendError;
use crate::storage::LocalBackend;

use super::supabase::SupabaseClient;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Authentication collaborator.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;
    /// `None` when nobody is signed in or the session is no longer valid.
    async fn current_user(&self) -> Result<Option<User>, BackendError>;
    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Remote table storage. Records are JSON objects.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn insert(&self, table: &str, record: Value) -> Result<Value, BackendError>;
    async fn query(
        &self,
        table: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<Value>, BackendError>;
}

/// The collaborators every component is handed explicitly.
#[derive(Clone)]
pub struct BackendContext {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn RowStore>,
}

impl BackendContext {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn RowStore>) -> Self {
        Self { auth, store }
    }

    /// Both roles served by one client sharing its session.
    pub fn shared<T>(client: Arc<T>) -> Self
    where
        T: AuthProvider + RowStore + 'static,
    {
        Self {
            auth: client.clone(),
            store: client,
        }
    }
}

/// Build the configured backend.
pub fn connect(config: &AppConfig) -> Result<BackendContext, BackendError> {
    match &config.backend {
        BackendConfig::Supabase { url, anon_key } => {
            log::info!("Using hosted backend at {url}");
            Ok(BackendContext::shared(Arc::new(SupabaseClient::new(
                url, anon_key,
            )?)))
        }
        BackendConfig::Local { database_path } => {
            log::info!("Using local backend at {database_path}");
            Ok(BackendContext::shared(Arc::new(LocalBackend::open(
                database_path,
            )?)))
        }
    }
}

/// Table and column names end up in URLs and SQL, so only plain identifiers pass.
pub fn validate_identifier(name: &str) -> Result<&str, BackendError> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(BackendError::InvalidIdentifier(name.to_string()))
    }
}
