use crate::{context::Context, event::*, helper::MessageHelper, key, log_internal, plugin::*};
use anyhow::Result;

pub struct Reload;

#[serenity::async_trait]
impl Plugin for Reload {
    fn name(&self) -> &'static str {
        "reload"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.settings.general.command_prefix;
        Some(format!(
            "{}{} - reload config, language and tags (bot owner only)",
            prefix,
            self.name()
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, _)) = event.is_bot_cmd(ctx, self.name()) else {
            return Ok(EventHandled::No);
        };

        let response = if msg.is_from_owner(ctx) {
            let mut stores = ctx.stores.write().await;
            match stores.reload().await {
                Ok(()) => {
                    log_internal!("Stores reloaded");
                    stores.lang().text(&key!(messages.reload.success))
                }
                // Previous stores stay in place; tell the owner what is wrong with the files
                Err(err) => stores
                    .lang()
                    .format(&key!(messages.reload.failed), &[&err]),
            }
        } else {
            let stores = ctx.stores.read().await;
            stores
                .lang()
                .text(&key!(messages.no_permission.to_run_command))
        };

        msg.reply(ctx.cache_http, response).await?;
        Ok(EventHandled::Yes)
    }
}
