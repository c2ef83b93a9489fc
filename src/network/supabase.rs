use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::common::{Session, User};
use crate::error::BackendError;

use super::backend::{AuthProvider, RowStore, validate_identifier};

/// Client for a Supabase-style project: GoTrue auth under `/auth/v1`,
/// PostgREST tables under `/rest/v1`.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Value>,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        let display_name = payload.user_metadata.as_ref().and_then(|meta| {
            ["name", "full_name", "display_name"]
                .iter()
                .find_map(|key| meta.get(*key).and_then(Value::as_str))
                .map(str::to_string)
        });
        User {
            id: payload.id,
            email: payload.email.unwrap_or_default(),
            display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    user: UserPayload,
}

/// Sign up answers with a session when e-mail confirmation is off, a bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpPayload {
    Session(TokenPayload),
    User(UserPayload),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorPayload {
    fn into_message(self, status: StatusCode) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| status.to_string())
    }
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
        })
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|slot| slot.clone())
    }

    fn set_session(&self, session: Option<Session>) {
        if let Ok(mut slot) = self.session.write() {
            *slot = session;
        }
    }

    fn access_token(&self) -> Option<String> {
        self.session().map(|session| session.access_token)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, table: &str) -> Result<String, BackendError> {
        Ok(format!("{}/rest/v1/{}", self.base_url, validate_identifier(table)?))
    }

    /// Row requests run as the signed-in user, or anonymously with the project key.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token().unwrap_or_else(|| self.anon_key.clone());
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    async fn rejection(response: Response) -> String {
        let status = response.status();
        let payload = response
            .json::<ErrorPayload>()
            .await
            .unwrap_or_default();
        payload.into_message(status)
    }

    async fn auth_request(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.header("apikey", &self.anon_key).send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(BackendError::Auth(Self::rejection(response).await))
        }
    }

    async fn row_request(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self.authorized(request).send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(BackendError::Request(Self::rejection(response).await))
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError> {
        log::debug!("POST {}", self.auth_url("signup"));
        let response = self
            .auth_request(
                self.http
                    .post(self.auth_url("signup"))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        match response.json::<SignUpPayload>().await? {
            SignUpPayload::Session(token) => {
                let user = User::from(token.user);
                self.set_session(Some(Session {
                    access_token: token.access_token,
                    user: user.clone(),
                }));
                Ok(user)
            }
            SignUpPayload::User(user) => Ok(User::from(user)),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let response = self
            .auth_request(
                self.http
                    .post(self.auth_url("token"))
                    .query(&[("grant_type", "password")])
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        let token = response.json::<TokenPayload>().await?;
        let session = Session {
            access_token: token.access_token,
            user: User::from(token.user),
        };
        self.set_session(Some(session.clone()));
        log::info!("Signed in as {}", session.user.id);
        Ok(session)
    }

    async fn current_user(&self) -> Result<Option<User>, BackendError> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                Ok(Some(User::from(response.json::<UserPayload>().await?)))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                log::warn!("Session rejected by auth service; dropping it");
                self.set_session(None);
                Ok(None)
            }
            _ => Err(BackendError::Auth(Self::rejection(response).await)),
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let token = self.access_token();
        self.set_session(None);

        if let Some(token) = token {
            self.auth_request(self.http.post(self.auth_url("logout")).bearer_auth(token))
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RowStore for SupabaseClient {
    async fn insert(&self, table: &str, record: Value) -> Result<Value, BackendError> {
        let url = self.table_url(table)?;
        log::debug!("POST {url}");
        let response = self
            .row_request(
                self.http
                    .post(url)
                    .header("Prefer", "return=representation")
                    .json(&record),
            )
            .await?;

        // Without select rights the representation comes back empty.
        let rows = match response.json::<Vec<Value>>().await {
            Ok(rows) => rows,
            Err(err) => {
                log::debug!("Insert into {table} returned no usable representation: {err}");
                Vec::new()
            }
        };
        Ok(rows.into_iter().next().unwrap_or(record))
    }

    async fn query(
        &self,
        table: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table)?;
        let direction = if ascending { "asc" } else { "desc" };
        let order = format!("{}.{direction}", validate_identifier(order_by)?);
        log::debug!("GET {url} order={order}");

        let response = self
            .row_request(
                self.http
                    .get(url)
                    .query(&[("select", "*"), ("order", order.as_str())]),
            )
            .await?;

        Ok(response.json::<Vec<Value>>().await?)
    }
}
