pub mod commands;
pub mod events;
pub mod types;

pub use commands::FeedCommand;
pub use events::FeedEvent;
pub use types::{Message, NewMessage, Notice, NoticeLevel, Session, User};
