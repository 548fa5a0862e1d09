use std::env;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;

use rustls::crypto::ring::default_provider;

use rusty_commands::handle_message;
use rusty_core::Context;
use rusty_interactive::InteractiveConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();

    // Store Discord Bot Token
    let token = env::var("DISCORD_TOKEN")?;
    let config = InteractiveConfig::from_env()?;

    // Create a single shared HTTP Client
    let http = Arc::new(Client::new(token.clone()));
    let ctx = Context::new(Arc::clone(&http), config);

    // Declare which intents the bot has
    let intents = Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::GUILD_MESSAGE_REACTIONS
        | Intents::MESSAGE_CONTENT;

    // A shard is one Gateway WebSocket connection to Discord
    let mut shard = Shard::new(ShardId::new(0, 1), token, intents);

    info!("Rusty is connecting...");

    // Our ears, listens for stuff to do
    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        // Sessions and waiters see every event; the router never blocks this loop.
        ctx.interactive.handle_gateway_event(&event);

        match event {
            Event::Ready(_) => {
                info!("Rusty has successfully awoken!");
            }
            Event::MessageCreate(msg) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(source) = handle_message(ctx, msg).await {
                        error!(?source, "command failed");
                    }
                });
            }
            _ => {} // Ignore unused events
        }
    }
    Ok(()) // Return Success, shutdown cleanly
}
