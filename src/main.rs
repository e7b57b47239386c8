mod context;
mod event;
mod handler;
mod helper;
mod key;
mod lang;
mod logging;
mod plugin;
mod settings;
mod store;
mod stores;
mod tags;
mod template;

use serenity::{all::GatewayIntents, Client};
use std::sync::Arc;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the token may come from settings.toml
    dotenvy::dotenv().ok();

    let settings = crate::settings::Settings::load().await?;
    let token = settings.general.discord_token.clone();
    let stores = crate::stores::Stores::open(&settings.stores).await?;
    let stores = Arc::new(RwLock::new(stores));
    let handler = handler::Handler::new(settings, Arc::clone(&stores));

    // Things we want discord to tell us about.
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;
    let shard_manager = Arc::clone(&client.shard_manager);

    tokio::select! {
        result = client.start() => result?,
        _ = tokio::signal::ctrl_c() => {
            crate::log_internal!("Interrupted, shutting down");
            shard_manager.shutdown_all().await;
        }
    }

    stores.write().await.shutdown().await?;
    Ok(())
}
