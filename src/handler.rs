use crate::{context::Context, event::Event, settings::Settings, stores::Stores};
use serenity::all::{Message, Ready};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Discord event handler
pub struct Handler {
    settings: Settings,
    stores: Arc<RwLock<Stores>>,
}

impl<'a> Handler {
    pub fn new(settings: Settings, stores: Arc<RwLock<Stores>>) -> Self {
        Self { settings, stores }
    }

    fn ctx(&'a self, discord_ctx: &'a serenity::all::Context) -> Context<'a> {
        Context {
            settings: &self.settings,
            stores: &self.stores,
            cache: &discord_ctx.cache,
            http: &discord_ctx.http,
            cache_http: discord_ctx,
        }
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        Event::Ready(ready).handle(self.ctx(&discord_ctx)).await;
    }

    async fn message(&self, discord_ctx: serenity::all::Context, msg: Message) {
        Event::Message(msg).handle(self.ctx(&discord_ctx)).await;
    }
}
