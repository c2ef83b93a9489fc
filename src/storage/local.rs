use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result as SqlResult, params};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::database::Database;
use crate::common::{Session, User};
use crate::error::BackendError;
use crate::network::backend::{AuthProvider, RowStore, validate_identifier};

const DUPLICATE_ACCOUNT: &str = "User already registered";
const BAD_CREDENTIALS: &str = "Invalid login credentials";

/// SQLite-backed stand-in for the hosted auth service and row store.
/// Statements run on the blocking pool so the worker's runtime stays free.
pub struct LocalBackend {
    db: Arc<Mutex<Database>>,
    session: RwLock<Option<Session>>,
}

impl LocalBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        Ok(Self::with_database(Database::new(path)?))
    }

    pub fn in_memory() -> Result<Self, BackendError> {
        Ok(Self::with_database(Database::in_memory()?))
    }

    fn with_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            session: RwLock::new(None),
        }
    }

    fn with_connection<T>(
        db: &Mutex<Database>,
        work: impl FnOnce(&Connection) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let db = db
            .lock()
            .map_err(|_| BackendError::Request("Local database is unavailable".to_string()))?;
        work(db.connection())
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, BackendError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || Self::with_connection(&db, work))
            .await
            .map_err(|err| BackendError::Request(format!("Local database task failed: {err}")))?
    }

    fn set_session(&self, session: Option<Session>) {
        if let Ok(mut slot) = self.session.write() {
            *slot = session;
        }
    }

    /// Number of stored rows in a table.
    pub fn row_count(&self, table: &str) -> Result<usize, BackendError> {
        let table = validate_identifier(table)?;
        Self::with_connection(&self.db, |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM rows WHERE table_name = ?1",
                params![table],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }
}

// ========== Accounts ==========

fn create_account(conn: &Connection, email: &str, password: &str) -> Result<User, BackendError> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM accounts WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(BackendError::Auth(DUPLICATE_ACCOUNT.to_string()));
    }

    let id = Uuid::new_v4().to_string();
    let salt = Uuid::new_v4().simple().to_string();
    conn.execute(
        "INSERT INTO accounts (id, email, password_hash, salt) VALUES (?1, ?2, ?3, ?4)",
        params![id, email, hash_password(&salt, password), salt],
    )?;

    Ok(User {
        id,
        email: email.to_string(),
        display_name: None,
    })
}

fn verify_account(conn: &Connection, email: &str, password: &str) -> Result<User, BackendError> {
    let account = conn
        .query_row(
            "SELECT id, password_hash, salt, display_name FROM accounts WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?;

    match account {
        Some((id, stored_hash, salt, display_name))
            if hash_password(&salt, password) == stored_hash =>
        {
            Ok(User {
                id,
                email: email.to_string(),
                display_name,
            })
        }
        _ => Err(BackendError::Auth(BAD_CREDENTIALS.to_string())),
    }
}

// ========== Rows ==========

/// Returns the stored record, with its `id` filled in.
fn prepare_row(record: Value) -> Result<(String, Value), BackendError> {
    let Value::Object(mut fields) = record else {
        return Err(BackendError::Request(
            "Record must be a JSON object".to_string(),
        ));
    };

    let id = match fields.get("id") {
        None | Some(Value::Null) => {
            let id = Uuid::new_v4().to_string();
            fields.insert("id".to_string(), Value::String(id.clone()));
            id
        }
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
    };
    Ok((id, Value::Object(fields)))
}

fn insert_row(conn: &Connection, table: &str, id: &str, body: &str) -> Result<(), BackendError> {
    match conn.execute(
        "INSERT INTO rows (table_name, id, body) VALUES (?1, ?2, ?3)",
        params![table, id, body],
    ) {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            Err(BackendError::Request(format!(
                "duplicate key value violates unique constraint \"{table}_pkey\""
            )))
        }
        Err(err) => Err(err.into()),
    }
}

fn query_rows(
    conn: &Connection,
    table: &str,
    path: &str,
    direction: &str,
) -> Result<Vec<String>, BackendError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT body FROM rows
         WHERE table_name = ?1
         ORDER BY json_extract(body, ?2) {direction}, row_id {direction}"
    ))?;
    let bodies = stmt
        .query_map(params![table, path], |row| row.get::<_, String>(0))?
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(bodies)
}

fn hash_password(salt: &str, password: &str) -> String {
    hex::encode(
        Sha256::new()
            .chain_update(salt.as_bytes())
            .chain_update(password.as_bytes())
            .finalize(),
    )
}

#[async_trait]
impl AuthProvider for LocalBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let (email, password) = (email.to_string(), password.to_string());
        let user = self
            .blocking(move |conn| create_account(conn, &email, &password))
            .await?;
        log::info!("Registered local account {}", user.id);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let (email, password) = (email.to_string(), password.to_string());
        let user = self
            .blocking(move |conn| verify_account(conn, &email, &password))
            .await?;
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            user,
        };
        self.set_session(Some(session.clone()));
        log::info!("Signed in as {}", session.user.id);
        Ok(session)
    }

    async fn current_user(&self) -> Result<Option<User>, BackendError> {
        Ok(self
            .session
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|session| session.user.clone())))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.set_session(None);
        Ok(())
    }
}

#[async_trait]
impl RowStore for LocalBackend {
    async fn insert(&self, table: &str, record: Value) -> Result<Value, BackendError> {
        let table = validate_identifier(table)?.to_string();
        let (id, record) = prepare_row(record)?;
        let body = serde_json::to_string(&record)?;

        self.blocking(move |conn| insert_row(conn, &table, &id, &body))
            .await?;
        Ok(record)
    }

    async fn query(
        &self,
        table: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<Value>, BackendError> {
        let table = validate_identifier(table)?.to_string();
        let path = format!("$.{}", validate_identifier(order_by)?);
        let direction = if ascending { "ASC" } else { "DESC" };

        let bodies = self
            .blocking(move |conn| query_rows(conn, &table, &path, direction))
            .await?;
        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(BackendError::from))
            .collect()
    }
}
