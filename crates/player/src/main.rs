//! Ballot player - headless session runner.
//!
//! ```text
//! ballot-player join <game-id> <player-name>
//! ballot-player host <player-name>
//! ```
//!
//! Without arguments, `BALLOT_GAME_ID` and `BALLOT_PLAYER_NAME` are used.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ballot_player::application::LobbyService;
use ballot_player::infrastructure::HttpGameApi;
use ballot_player::{visible_allies, ClientConfig, LifecycleEvent, LifecycleKind, SessionHandle};
use ballot_shared::{MessageKind, ServerMessage};

enum Command {
    Join { game_id: String, player: String },
    Host { player: String },
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["join", game_id, player] => Ok(Command::Join {
            game_id: game_id.to_string(),
            player: player.to_string(),
        }),
        ["host", player] => Ok(Command::Host {
            player: player.to_string(),
        }),
        [] => Ok(Command::Join {
            game_id: std::env::var("BALLOT_GAME_ID").context("BALLOT_GAME_ID is not set")?,
            player: std::env::var("BALLOT_PLAYER_NAME")
                .context("BALLOT_PLAYER_NAME is not set")?,
        }),
        _ => bail!("usage: ballot-player join <game-id> <player-name> | host <player-name>"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ballot_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let command = parse_args()?;

    let (game_id, player) = match command {
        Command::Join { game_id, player } => (game_id, player),
        Command::Host { player } => {
            let lobby = LobbyService::new(Arc::new(HttpGameApi::from_config(&config)));
            let hosted = lobby.host_game(&player, config.secure).await?;
            match &hosted.join_url {
                Some(url) => {
                    tracing::info!(game_id = %hosted.game_id, join_url = %url, "Game created")
                }
                None => tracing::info!(game_id = %hosted.game_id, "Game created"),
            }
            (hosted.game_id, player)
        }
    };

    tracing::info!(game_id = %game_id, player = %player, "Starting Ballot player");

    let session = SessionHandle::spawn(config);
    session.lifecycle().subscribe(LifecycleKind::ReconnectFailed, |_| {
        tracing::error!("Gave up reconnecting; restart to try again");
    });
    session.lifecycle().subscribe(LifecycleKind::Reconnecting, |event| {
        if let LifecycleEvent::Reconnecting { attempt, .. } = event {
            tracing::info!(attempt, "Connection lost, retrying");
        }
    });

    let store = session.store().clone();
    let viewer = player.clone();
    session.store().subscribe_replaced(move |snapshot| {
        tracing::info!(
            phase = %snapshot.phase,
            liberal = snapshot.liberal_policies,
            fascist = snapshot.fascist_policies,
            "Game state"
        );
        if snapshot.is_over() {
            tracing::info!(winner = ?snapshot.winner, "Game over");
        }
        if store.local_flags().role_revealed {
            let allies: Vec<&str> = visible_allies(snapshot, &viewer)
                .into_iter()
                .map(|p| p.name.as_str())
                .collect();
            if !allies.is_empty() {
                tracing::info!(?allies, "Known allies");
            }
        }
    });
    session.store().subscribe_choice(|choice| match choice.sole_power() {
        Some(power) => tracing::info!(
            power = %power,
            candidates = ?choice.candidates,
            "Executive action available"
        ),
        None => tracing::info!(
            powers = ?choice.powers,
            candidates = ?choice.candidates,
            "Choose an executive action"
        ),
    });
    session
        .messages()
        .subscribe(MessageKind::InvestigationResult, |message| {
            if let ServerMessage::InvestigationResult { target, result } = message {
                tracing::info!(suspect = %target, loyalty = ?result, "Investigation result");
            }
        });

    let chat_store = session.store().clone();
    session.messages().subscribe(MessageKind::ChatMessage, move |message| {
        if let ServerMessage::ChatMessage(entry) = message {
            let sender = chat_store
                .current()
                .and_then(|s| s.player(&entry.sender).map(|p| p.display_name().to_string()))
                .unwrap_or_else(|| entry.sender.clone());
            let sent_at = entry.sent_at().map(|t| t.format("%H:%M").to_string());
            tracing::info!(sender = %sender, sent_at = ?sent_at, "{}", entry.message);
        }
    });

    session.connect(&game_id, &player).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down");
    session.disconnect().await?;
    session.shutdown();
    Ok(())
}
