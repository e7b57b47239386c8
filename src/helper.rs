//! Miscellaneous convenience methods

use crate::context::Context;
use serenity::all::Mentionable;

pub trait MessageHelper {
    fn is_from_owner(&self, ctx: &Context<'_>) -> bool;
    fn sender_mention(&self) -> String;
}

impl MessageHelper for serenity::all::Message {
    fn is_from_owner(&self, ctx: &Context<'_>) -> bool {
        let owners = &ctx.settings.general.bot_owners;
        let author_global_name = &self.author.name;

        owners.contains(author_global_name)
    }

    /// What `@!sender` expands to for this message
    fn sender_mention(&self) -> String {
        self.author.mention().to_string()
    }
}
