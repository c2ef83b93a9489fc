use super::types::{Message, Notice, User};

/// Events the feed worker sends back to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    SignedUp(User),
    SignedIn(User),
    SignedOut,
    MessagesLoaded(Vec<Message>),
    /// The write succeeded; the input field may be cleared.
    MessageSent,
    /// The write failed; the input field keeps its content.
    MessageRejected,
    /// Blank content, nothing was written.
    MessageIgnored,
    Notice(Notice),
}
