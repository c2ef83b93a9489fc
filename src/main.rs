use std::error::Error;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use rust_feed_chat::common::{FeedCommand, FeedEvent};
use rust_feed_chat::config::{self, AppConfig};
use rust_feed_chat::network::{self, BackendContext, FeedClient};
use rust_feed_chat::ui::ChatApp;
use rust_feed_chat::{Account, AppendOutcome, MessageFeed};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "rust_feed_chat",
    version,
    about = "Message feed client for a hosted auth + row-store backend"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
enum Mode {
    /// Write a default config file and exit
    InitConfig,
    /// Run without UI: sign in, optionally send, print the feed
    Feed {
        #[arg(long, env = "FEED_EMAIL")]
        email: String,
        #[arg(long, env = "FEED_PASSWORD", hide_env_values = true)]
        password: String,
        /// Message to append before printing
        #[arg(long)]
        send: Option<String>,
        /// Only print messages sent by the signed-in user
        #[arg(long)]
        mine: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    if cli.mode == Some(Mode::InitConfig) {
        config::save_config(&cli.config, &AppConfig::default())?;
        log::info!("Wrote default config to {}", cli.config);
        return Ok(());
    }

    let app_config = config::apply_env_overrides(config::load_config(&cli.config), |key| {
        std::env::var(key).ok()
    });
    let backend = network::connect(&app_config)?;

    match cli.mode {
        Some(Mode::Feed {
            email,
            password,
            send,
            mine,
        }) => run_headless(backend, &app_config, &email, &password, send, mine).await,
        _ => run_full_client(backend, app_config).await,
    }
}

async fn run_headless(
    backend: BackendContext,
    app_config: &AppConfig,
    email: &str,
    password: &str,
    send: Option<String>,
    mine: bool,
) -> Result<(), Box<dyn Error>> {
    let account = Account::new(backend.clone(), app_config.users_table.clone());
    let session = account.sign_in(email, password).await?;

    let mut feed = MessageFeed::new(backend, app_config.messages_table.clone());
    match send {
        Some(content) => match feed.append(&content).await? {
            AppendOutcome::Ignored => log::warn!("Nothing to send: message is blank"),
            AppendOutcome::Sent => {}
            AppendOutcome::SentWithoutRefresh(err) => return Err(err.into()),
        },
        None => {
            feed.list().await?;
        }
    }

    let messages = if mine {
        feed.history(&session.user.id)
    } else {
        feed.messages().to_vec()
    };
    for message in messages {
        println!("{}: {}", message.sender, message.content);
    }
    Ok(())
}

async fn run_full_client(
    backend: BackendContext,
    app_config: AppConfig,
) -> Result<(), Box<dyn Error>> {
    // UI -> worker
    let (cmd_tx, cmd_rx) = mpsc::channel::<FeedCommand>(100);
    // worker -> UI
    let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(100);

    tokio::spawn(async move {
        FeedClient::new(event_tx, cmd_rx, backend, &app_config)
            .run()
            .await;
    });

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Messaging App",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Client UI started");

            Ok(Box::new(ChatApp::new(cc, cmd_tx.clone(), event_receiver)))
        }),
    )?;
    Ok(())
}
