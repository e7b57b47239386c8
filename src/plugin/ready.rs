use crate::{context::Context, event::*, key, log_internal, logging::PrintColor, plugin::*};
use anyhow::Result;

/// Announces on the terminal that the bot is up.
pub struct Ready;

#[serenity::async_trait]
impl Plugin for Ready {
    fn name(&self) -> &'static str {
        "ready"
    }

    async fn usage(&self, _ctx: &Context<'_>) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::Ready(ready) = event else {
            return Ok(EventHandled::No);
        };

        let stores = ctx.stores.read().await;
        log_internal!(
            "{}",
            stores
                .lang()
                .format(&key!(messages.system.bot_ready), &[&ready.user.color()]),
        );

        Ok(EventHandled::Yes)
    }
}
