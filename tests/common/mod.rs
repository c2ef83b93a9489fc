#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use rust_feed_chat::BackendError;
use rust_feed_chat::network::{BackendContext, RowStore};
use rust_feed_chat::storage::LocalBackend;
use serde_json::Value;

pub const MESSAGES: &str = "messages";
pub const USERS: &str = "users";

/// Row store wrapper that can be told to fail or to hold writes, and counts the
/// writes that reached it.
pub struct FlakyStore {
    inner: Arc<LocalBackend>,
    fail_queries: AtomicBool,
    fail_inserts: AtomicBool,
    hold_inserts: AtomicBool,
    release: Notify,
    inserts: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<LocalBackend>) -> Self {
        Self {
            inner,
            fail_queries: AtomicBool::new(false),
            fail_inserts: AtomicBool::new(false),
            hold_inserts: AtomicBool::new(false),
            release: Notify::new(),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Writes wait for `release_insert` before reaching the inner store.
    pub fn hold_inserts(&self, hold: bool) {
        self.hold_inserts.store(hold, Ordering::SeqCst);
    }

    pub fn release_insert(&self) {
        self.release.notify_one();
    }

    pub fn insert_attempts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowStore for FlakyStore {
    async fn insert(&self, table: &str, record: Value) -> Result<Value, BackendError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.hold_inserts.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(BackendError::Request("new row violates row-level security policy".into()));
        }
        self.inner.insert(table, record).await
    }

    async fn query(
        &self,
        table: &str,
        order_by: &str,
        ascending: bool,
    ) -> Result<Vec<Value>, BackendError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(BackendError::Request("connection reset by peer".into()));
        }
        self.inner.query(table, order_by, ascending).await
    }
}

pub struct Harness {
    pub local: Arc<LocalBackend>,
    pub store: Arc<FlakyStore>,
    pub backend: BackendContext,
}

/// In-memory backend with a switchable row store in front of it.
pub fn harness() -> Harness {
    let local = Arc::new(LocalBackend::in_memory().expect("in-memory database"));
    let store = Arc::new(FlakyStore::new(local.clone()));
    let backend = BackendContext::new(local.clone(), store.clone());
    Harness {
        local,
        store,
        backend,
    }
}
