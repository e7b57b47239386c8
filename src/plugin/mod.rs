use crate::{context::Context, event::EventHandled, key, lang::Language, store};
use anyhow::Result;

mod format;
mod help;
mod ignore_self;
mod log;
mod ready;
mod reload;
mod tag;

#[serenity::async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Used as the command word for plugins that have one
    fn name(&self) -> &'static str;
    /// Help message line.  None if no help message
    async fn usage(&self, ctx: &Context<'_>) -> Option<String>;
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other plugin should attempt to
    /// handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &Context<'_>, event: &crate::event::Event)
        -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        // Core bot operations
        Box::new(log::Log),
        Box::new(ignore_self::IgnoreSelf),
        Box::new(ready::Ready),
        Box::new(help::Help),
        Box::new(reload::Reload),
        // Message templates
        Box::new(format::Format),
        Box::new(tag::Tag),
    ]
}

/// Reply text for an expansion the user's markup made fail.  Other errors are passed on.
fn expansion_failure(lang: &Language<'_>, error: store::Error) -> Result<String> {
    match error {
        store::Error::ExpansionTooDeep { tag, max } => Ok(lang.format(
            &key!(messages.expansion.too_deep),
            &[&tag, &max],
        )),
        other => Err(other.into()),
    }
}
