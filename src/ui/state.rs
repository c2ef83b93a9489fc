use std::collections::VecDeque;

use crate::common::{FeedCommand, FeedEvent, Message, Notice, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignUp,
    SignIn,
    Home,
    Profile,
    History,
    Settings,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::SignUp,
        Screen::SignIn,
        Screen::Home,
        Screen::Profile,
        Screen::History,
        Screen::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::SignUp => "Sign Up",
            Screen::SignIn => "Sign In",
            Screen::Home => "Home",
            Screen::Profile => "Profile",
            Screen::History => "History",
            Screen::Settings => "Settings",
        }
    }

    /// Screens that show the feed load it when opened.
    fn shows_feed(self) -> bool {
        matches!(self, Screen::Home | Screen::History)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Local UI state, driven by worker events.
pub struct AppState {
    pub screen: Screen,
    pub sign_up: Credentials,
    pub sign_in: Credentials,
    pub messages: Vec<Message>,
    pub input_text: String,
    /// An append is in flight; Send stays disabled until it settles.
    pub sending: bool,
    pub current_user: Option<User>,
    notices: VecDeque<Notice>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::SignIn,
            sign_up: Credentials::default(),
            sign_in: Credentials::default(),
            messages: Vec::new(),
            input_text: String::new(),
            sending: false,
            current_user: None,
            notices: VecDeque::new(),
        }
    }

    /// Switch screens; returns the refresh to issue when the target shows the feed.
    pub fn navigate(&mut self, screen: Screen) -> Option<FeedCommand> {
        self.screen = screen;
        screen.shows_feed().then_some(FeedCommand::Refresh)
    }

    pub fn apply_event(&mut self, event: FeedEvent) -> Option<FeedCommand> {
        match event {
            FeedEvent::SignedUp(_) => {
                self.sign_up = Credentials::default();
                self.navigate(Screen::SignIn)
            }
            FeedEvent::SignedIn(user) => {
                self.sign_in.password.clear();
                self.current_user = Some(user);
                self.navigate(Screen::Home)
            }
            FeedEvent::SignedOut => {
                self.current_user = None;
                self.messages.clear();
                self.navigate(Screen::SignIn)
            }
            FeedEvent::MessagesLoaded(messages) => {
                self.messages = messages;
                None
            }
            FeedEvent::MessageSent => {
                self.sending = false;
                self.input_text.clear();
                None
            }
            FeedEvent::MessageRejected | FeedEvent::MessageIgnored => {
                self.sending = false;
                None
            }
            FeedEvent::Notice(notice) => {
                self.notices.push_back(notice);
                None
            }
        }
    }

    pub fn submit_sign_up(&self) -> FeedCommand {
        FeedCommand::SignUp {
            email: self.sign_up.email.clone(),
            password: self.sign_up.password.clone(),
        }
    }

    pub fn submit_sign_in(&self) -> FeedCommand {
        FeedCommand::SignIn {
            email: self.sign_in.email.clone(),
            password: self.sign_in.password.clone(),
        }
    }

    /// The input text is kept until the worker confirms the write.
    pub fn submit_message(&mut self) -> Option<FeedCommand> {
        if self.sending {
            return None;
        }
        self.sending = true;
        Some(FeedCommand::SendMessage(self.input_text.clone()))
    }

    /// The worker never received `command`; undo what submitting it started.
    pub fn command_undelivered(&mut self, command: FeedCommand) {
        if matches!(command, FeedCommand::SendMessage(_)) {
            self.sending = false;
        }
        self.notices
            .push_back(Notice::error("The feed service is not responding. Please try again."));
    }

    /// The notice currently blocking the screen.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    /// Messages in the feed sent by the signed-in user.
    pub fn history(&self) -> impl Iterator<Item = &Message> {
        let user_id = self.current_user.as_ref().map(|user| user.id.clone());
        self.messages
            .iter()
            .filter(move |message| Some(&message.sender_id) == user_id.as_ref())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
