//! Message feed synchronizer.
//!
//! Keeps the displayed feed in step with the row store: every successful
//! write is followed by a full, ordered refetch instead of a local append.

use chrono::Utc;
use tokio::sync::watch;

use crate::common::{Message, NewMessage};
use crate::error::{BackendError, FeedError};
use crate::network::backend::BackendContext;

const ORDER_COLUMN: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    /// An append is writing or refetching.
    Pending,
}

#[derive(Debug)]
pub enum AppendOutcome {
    /// Blank content; nothing was written.
    Ignored,
    /// Written and the feed was refetched.
    Sent,
    /// Written, but the refetch failed and the displayed feed is stale.
    SentWithoutRefresh(FeedError),
}

pub struct MessageFeed {
    backend: BackendContext,
    table: String,
    messages: Vec<Message>,
    phase: watch::Sender<FeedPhase>,
}

impl MessageFeed {
    pub fn new(backend: BackendContext, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            messages: Vec::new(),
            phase: watch::Sender::new(FeedPhase::Idle),
        }
    }

    /// The last successfully fetched feed.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> FeedPhase {
        *self.phase.borrow()
    }

    /// Follow phase changes while an append is awaited elsewhere.
    pub fn subscribe_phase(&self) -> watch::Receiver<FeedPhase> {
        self.phase.subscribe()
    }

    /// Fetch every message, oldest first. On failure the displayed feed is left as it was.
    pub async fn list(&mut self) -> Result<&[Message], FeedError> {
        let rows = self
            .backend
            .store
            .query(&self.table, ORDER_COLUMN, true)
            .await
            .map_err(FeedError::Fetch)?;

        let mut messages = rows
            .into_iter()
            .map(serde_json::from_value::<Message>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| FeedError::Fetch(BackendError::Decode(err)))?;
        // Stable, so rows sharing a timestamp keep the store's order.
        messages.sort_by_key(|message| message.created_at);

        log::debug!("Fetched {} messages", messages.len());
        self.messages = messages;
        Ok(&self.messages)
    }

    /// Write `content` as the signed-in user, then refetch.
    /// The session is checked first, so blank content without one is still an error.
    pub async fn append(&mut self, content: &str) -> Result<AppendOutcome, FeedError> {
        let user = self
            .backend
            .auth
            .current_user()
            .await?
            .ok_or(FeedError::AuthenticationRequired)?;

        if content.trim().is_empty() {
            return Ok(AppendOutcome::Ignored);
        }

        let record = NewMessage {
            content: content.to_string(),
            sender_id: user.id.clone(),
            sender: user.display_name().to_string(),
            created_at: Utc::now(),
        };
        let record = serde_json::to_value(&record).map_err(BackendError::from)?;

        self.phase.send_replace(FeedPhase::Pending);
        let outcome = self.write_and_refresh(record).await;
        self.phase.send_replace(FeedPhase::Idle);
        outcome
    }

    async fn write_and_refresh(
        &mut self,
        record: serde_json::Value,
    ) -> Result<AppendOutcome, FeedError> {
        if let Err(err) = self.backend.store.insert(&self.table, record).await {
            log::warn!("Failed to add message: {err}");
            return Err(FeedError::Send(err));
        }

        match self.list().await {
            Ok(_) => Ok(AppendOutcome::Sent),
            Err(err) => {
                log::warn!("Message stored but refetch failed: {err}");
                Ok(AppendOutcome::SentWithoutRefresh(err))
            }
        }
    }

    /// Messages in the displayed feed written by `user_id`.
    pub fn history(&self, user_id: &str) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|message| message.sender_id == user_id)
            .cloned()
            .collect()
    }
}
