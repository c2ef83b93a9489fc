pub mod account;
pub mod common;
pub mod config;
pub mod error;
pub mod feed;
pub mod network;
pub mod storage;
pub mod ui;

pub use account::Account;
pub use error::{BackendError, ErrorKind, FeedError};
pub use feed::{AppendOutcome, FeedPhase, MessageFeed};
