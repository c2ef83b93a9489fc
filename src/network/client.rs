use tokio::sync::mpsc;

use crate::account::Account;
use crate::common::{FeedCommand, FeedEvent, Notice};
use crate::config::AppConfig;
use crate::feed::{AppendOutcome, MessageFeed};

use super::backend::BackendContext;

/// Background worker owning the account flow and the message feed.
/// Commands are handled one at a time, in arrival order.
pub struct FeedClient {
    event_sender: mpsc::Sender<FeedEvent>,
    command_receiver: mpsc::Receiver<FeedCommand>,
    account: Account,
    feed: MessageFeed,
}

impl FeedClient {
    pub fn new(
        event_sender: mpsc::Sender<FeedEvent>,
        command_receiver: mpsc::Receiver<FeedCommand>,
        backend: BackendContext,
        config: &AppConfig,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            account: Account::new(backend.clone(), config.users_table.clone()),
            feed: MessageFeed::new(backend, config.messages_table.clone()),
        }
    }

    pub async fn run(mut self) {
        log::info!("Feed worker started");

        while let Some(command) = self.command_receiver.recv().await {
            for event in self.handle_command(command).await {
                if let Err(err) = self.event_sender.send(event).await {
                    log::warn!("Failed to notify UI: {err}");
                    return;
                }
            }
        }

        log::info!("Command channel closed; feed worker stopping");
    }

    pub async fn handle_command(&mut self, command: FeedCommand) -> Vec<FeedEvent> {
        match command {
            FeedCommand::SignUp { email, password } => {
                match self.account.sign_up(&email, &password).await {
                    Ok(user) => vec![
                        FeedEvent::Notice(Notice::success("User registered!")),
                        FeedEvent::SignedUp(user),
                    ],
                    Err(err) => vec![FeedEvent::Notice(err.notice())],
                }
            }
            FeedCommand::SignIn { email, password } => {
                match self.account.sign_in(&email, &password).await {
                    Ok(session) => vec![
                        FeedEvent::Notice(Notice::success("Signed in successfully!")),
                        FeedEvent::SignedIn(session.user),
                    ],
                    Err(err) => vec![FeedEvent::Notice(err.notice())],
                }
            }
            // The local session is gone even when the remote logout fails.
            FeedCommand::SignOut => match self.account.sign_out().await {
                Ok(()) => vec![FeedEvent::SignedOut],
                Err(err) => vec![FeedEvent::SignedOut, FeedEvent::Notice(err.notice())],
            },
            FeedCommand::Refresh => match self.feed.list().await {
                Ok(messages) => vec![FeedEvent::MessagesLoaded(messages.to_vec())],
                Err(err) => {
                    log::warn!("{err}");
                    vec![FeedEvent::Notice(err.notice())]
                }
            },
            FeedCommand::SendMessage(content) => match self.feed.append(&content).await {
                Ok(AppendOutcome::Ignored) => vec![FeedEvent::MessageIgnored],
                Ok(AppendOutcome::Sent) => vec![
                    FeedEvent::MessageSent,
                    FeedEvent::MessagesLoaded(self.feed.messages().to_vec()),
                ],
                Ok(AppendOutcome::SentWithoutRefresh(err)) => {
                    vec![FeedEvent::MessageSent, FeedEvent::Notice(err.notice())]
                }
                Err(err) => vec![FeedEvent::MessageRejected, FeedEvent::Notice(err.notice())],
            },
        }
    }
}
