use crate::{context::Context, event::*, plugin::*};
use anyhow::Result;

/// Swallows messages from bots, including our own replies, so they never trigger templates.
pub struct IgnoreSelf;

#[serenity::async_trait]
impl Plugin for IgnoreSelf {
    fn name(&self) -> &'static str {
        "ignore_self"
    }

    async fn usage(&self, _ctx: &Context<'_>) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::Message(msg) = event else {
            return Ok(EventHandled::No);
        };

        if msg.author.bot || msg.author.id == ctx.cache.current_user().id {
            Ok(EventHandled::Yes)
        } else {
            Ok(EventHandled::No)
        }
    }
}
