//! The Serenity crate we're using for the Discord API is designed around callbacks to handle
//! events.  However, this does not mesh well with our plugin framework here.  To resolve this,
//! the handler translates the callbacks to a distinct Event enum.

use crate::context::Context;
use serenity::all::{Message, Ready};

/// A Discord event
pub enum Event {
    Ready(Ready),
    Message(Message),
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => eprintln!("Error in plugin {}: {}", plugin.name(), err),
            }
        }
    }

    // Check if a message should be interpreted as a special bot command.
    //
    // These are prefixed with the configured command prefix, e. g. `;tag rules`.  Returns the
    // message and everything after the command word.
    pub fn is_bot_cmd(&self, ctx: &Context<'_>, cmd: &str) -> Option<(&Message, &str)> {
        let Event::Message(msg) = self else {
            return None;
        };

        let (word, args) = split_command(&msg.content, &ctx.settings.general.command_prefix)?;
        (word == cmd).then_some((msg, args))
    }
}

fn split_command<'m>(content: &'m str, prefix: &str) -> Option<(&'m str, &'m str)> {
    let rest = content.strip_prefix(prefix)?;
    let (word, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Some((word, args.trim()))
}

pub enum EventHandled {
    Yes,
    No,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_word_and_args_are_split() {
        assert_eq!(split_command(";tag rules", ";"), Some(("tag", "rules")));
        assert_eq!(split_command(";reload", ";"), Some(("reload", "")));
        assert_eq!(split_command("!!tag  spaced  ", "!!"), Some(("tag", "spaced")));
    }

    #[test]
    fn other_messages_are_not_commands() {
        assert_eq!(split_command("tag rules", ";"), None);
        assert_eq!(split_command("", ";"), None);
    }
}
