/// Commands the UI sends to the feed worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    SignUp { email: String, password: String },
    SignIn { email: String, password: String },
    SignOut,
    /// Re-run the ordered feed query.
    Refresh,
    /// Append the typed content to the feed.
    SendMessage(String),
}
