use crate::{context::Context, event::*, helper::MessageHelper, key, plugin::*};
use anyhow::Result;

const TRIGGER: &str = "!f ";

/// `!f <text>` - echo `text` with its markup expanded
pub struct Format;

#[serenity::async_trait]
impl Plugin for Format {
    fn name(&self) -> &'static str {
        "format"
    }

    async fn usage(&self, _ctx: &Context<'_>) -> Option<String> {
        Some(format!(
            "{}<text> - expand @!sender, @&role, #channel and !!tag markup in text",
            TRIGGER
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::Message(msg) = event else {
            return Ok(EventHandled::No);
        };
        let Some(text) = msg.content.strip_prefix(TRIGGER) else {
            return Ok(EventHandled::No);
        };

        let reply = {
            let stores = ctx.stores.read().await;
            let lang = stores.lang();
            let template = lang.format(&key!(messages.ex_f.used), &[&text]);
            match stores
                .expander()
                .expand(&template, Some(&msg.sender_mention()))
            {
                Ok(expanded) => expanded,
                Err(e) => expansion_failure(&lang, e)?,
            }
        };

        msg.reply(ctx.cache_http, reply).await?;
        Ok(EventHandled::Yes)
    }
}
