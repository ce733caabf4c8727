//! Scramble Player - console client binary.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scramble_player::application::{assemble_guess, GameClient, SessionError};
use scramble_player::config::{load_dotenv_from_repo_root, ClientConfig};
use scramble_player::infrastructure::platform::FileStorageProvider;
use scramble_player::infrastructure::websocket::{ResilientPushChannel, TungsteniteConnector};
use scramble_player::infrastructure::{ReqwestTransport, ResilientRequestClient};
use scramble_player::ports::outbound::{
    storage_keys, ConnectionState, GameOutcome, Notice, Presenter, StorageProvider,
};
use scramble_protocol::PlayerScore;

/// Prints to stdout and signals when the game screen should be left.
struct ConsolePresenter {
    leave: Arc<Notify>,
}

impl Presenter for ConsolePresenter {
    fn show_word(&self, scrambled: &str) {
        println!("\nUnscramble: {}", scrambled.to_uppercase());
    }

    fn show_guess_feedback(&self, correct: bool) {
        if correct {
            println!("Correct!");
        } else {
            println!("Incorrect!");
        }
    }

    fn hide_guess_feedback(&self) {}

    fn show_roster(&self, roster: &[PlayerScore]) {
        println!("Players:");
        for entry in roster {
            println!("  {:<16} {}", entry.name, entry.score);
        }
    }

    fn show_game_over(&self, outcome: &GameOutcome) {
        match outcome {
            GameOutcome::Won => println!("YOU WON THE GAME!!"),
            GameOutcome::Lost { .. } => println!("GAME OVER"),
        }
    }

    fn leave_game(&self) {
        self.leave.notify_one();
    }

    fn notify(&self, notice: &Notice) {
        println!("[!] {notice}");
    }

    fn connection_changed(&self, state: ConnectionState) {
        tracing::debug!(?state, "Push connection state");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scramble_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Scramble Player");

    let config = ClientConfig::from_env()?;
    tracing::info!(
        primary = %config.endpoints.primary(),
        secondary = %config.endpoints.secondary(),
        "Configured endpoints"
    );

    // Storage, seeded with identity from the environment when given
    let storage: Arc<dyn StorageProvider> = Arc::new(match &config.storage_path {
        Some(path) => FileStorageProvider::open(path),
        None => FileStorageProvider::open_default(),
    });
    if let Some(username) = &config.username {
        storage.save(storage_keys::USERNAME, username);
    }
    if let Some(player_id) = &config.player_id {
        storage.save(storage_keys::PLAYER_ID, player_id);
    }

    // Session
    let leave = Arc::new(Notify::new());
    let presenter = Arc::new(ConsolePresenter {
        leave: Arc::clone(&leave),
    });
    let requests = ResilientRequestClient::new(
        Arc::new(ReqwestTransport::new(config.request_timeout)),
        config.endpoints.clone(),
    );
    let (client, session) =
        GameClient::new(requests, Arc::clone(&storage), presenter, config.timings);
    let session_task = tokio::spawn(session.run());

    // Push channel
    let channel = ResilientPushChannel::new(
        Arc::new(TungsteniteConnector),
        config.endpoints.clone(),
        Arc::clone(&storage),
        Arc::new(client.dispatcher()),
    )
    .with_reconnect_delay(config.reconnect_delay)
    .spawn();

    let result = play(&client, &config, &leave).await;

    tracing::info!(state = ?channel.state(), "Disconnecting push channel");
    channel.disconnect().await;
    drop(client);
    if let Err(e) = session_task.await {
        tracing::error!("Game session task failed: {}", e);
    }

    match result {
        Err(SessionError::NotLoggedIn) => {
            anyhow::bail!("no player id stored; set SCRAMBLE_PLAYER_ID")
        }
        other => other.map_err(Into::into),
    }
}

async fn play(
    client: &GameClient,
    config: &ClientConfig,
    leave: &Notify,
) -> Result<(), SessionError> {
    client.choose_menu(config.menu_choice).await?;
    client.start_game().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = leave.notified() => {
                println!("Returning to menu.");
                return Ok(());
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    return Ok(());
                };
                if line.trim().eq_ignore_ascii_case("quit") {
                    return Ok(());
                }
                let guess = assemble_guess(line.split_whitespace());
                if guess.is_empty() {
                    continue;
                }
                match client.submit_guess(&guess).await {
                    Ok(_) => {}
                    Err(SessionError::GameOver) => println!("The game is over."),
                    // Already surfaced through the presenter
                    Err(e) => tracing::debug!("Guess not submitted: {}", e),
                }
            }
        }
    }
}
