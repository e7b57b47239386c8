use crate::{
    context::Context,
    event::*,
    helper::MessageHelper,
    key,
    plugin::*,
    store,
    stores::Stores,
    tags::{RichTag, TagEntry},
};
use anyhow::Result;
use serenity::all::{
    Colour, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, Message, Timestamp,
};

const TRIGGER: &str = "!!";

/// Posts a tag, either as `!!name` or as `;tag name`.  Without a name, lists the known tags.
pub struct Tag;

#[derive(Debug, PartialEq)]
enum Reply {
    Text(String),
    Rich(RichTag),
}

#[serenity::async_trait]
impl Plugin for Tag {
    fn name(&self) -> &'static str {
        "tag"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.settings.general.command_prefix;
        Some(format!(
            "{}{} <name> or {}<name> - post a tag",
            prefix,
            self.name(),
            TRIGGER
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, name)) = tag_request(ctx, event, self.name()) else {
            return Ok(EventHandled::No);
        };

        let (reply, footer) = {
            let stores = ctx.stores.read().await;
            let lang = stores.lang();
            let reply = match compose(&stores, name, &msg.sender_mention()) {
                Ok(reply) => reply,
                Err(e) => Reply::Text(expansion_failure(&lang, e)?),
            };
            let footer = lang.format(&key!(messages.tag.author), &[&msg.author.name]);
            (reply, footer)
        };

        match reply {
            Reply::Text(text) => {
                msg.reply(ctx.cache_http, text).await?;
            }
            Reply::Rich(tag) => {
                let footer = CreateEmbedFooter::new(footer).icon_url(msg.author.face());
                let mut builder = CreateMessage::new()
                    .embed(embed(&tag, footer, msg.timestamp))
                    .reference_message(msg);
                if let Some(message) = &tag.message {
                    builder = builder.content(message);
                }
                msg.channel_id.send_message(ctx.cache_http, builder).await?;
            }
        }

        Ok(EventHandled::Yes)
    }
}

/// What to answer a request for tag `name`.  Only expansion can fail.
fn compose(stores: &Stores, name: &str, sender: &str) -> store::Result<Reply> {
    let lang = stores.lang();
    let tags = stores.tags();

    if name.is_empty() {
        let names = tags.completions("");
        return Ok(Reply::Text(if names.is_empty() {
            lang.text(&key!(messages.tag.none))
        } else {
            names.join(", ")
        }));
    }

    let empty = || Reply::Text(lang.format(&key!(messages.tag.empty), &[&name]));
    Ok(match tags.get(name) {
        None if tags.contains(name) => {
            Reply::Text(lang.format(&key!(messages.tag.invalid), &[&name]))
        }
        None => Reply::Text(lang.format(&key!(messages.tag.not_found), &[&name])),
        Some(TagEntry::Text(content)) => {
            let text = stores.expander().expand(&content, Some(sender))?;
            if text.trim().is_empty() {
                empty()
            } else {
                Reply::Text(text)
            }
        }
        Some(TagEntry::Rich(tag)) => {
            let tag = tag.expand(&stores.expander(), Some(sender))?;
            if tag.is_empty() {
                empty()
            } else {
                Reply::Rich(tag)
            }
        }
    })
}

fn tag_request<'e>(
    ctx: &Context<'_>,
    event: &'e Event,
    cmd: &str,
) -> Option<(&'e Message, &'e str)> {
    if let Some((msg, args)) = event.is_bot_cmd(ctx, cmd) {
        return Some((msg, first_word(args)));
    }

    let Event::Message(msg) = event else {
        return None;
    };
    let name = first_word(msg.content.strip_prefix(TRIGGER)?);
    // A bare `!!` is just punctuation
    (!name.is_empty()).then_some((msg, name))
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or_default()
}

/// `footer` names who asked for the tag, `requested_at` is when they did.
fn embed(tag: &RichTag, footer: CreateEmbedFooter, requested_at: Timestamp) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .colour(Colour::BLURPLE)
        .footer(footer)
        .timestamp(requested_at);
    if let Some(title) = &tag.title {
        embed = embed.title(title);
    }
    if let Some(content) = &tag.content {
        embed = embed.description(content);
    }
    if let Some(image) = &tag.image {
        embed = embed.image(image);
    }
    if let Some(thumbnail) = &tag.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(author) = &tag.author {
        let mut author = CreateEmbedAuthor::new(author);
        if let Some(icon) = &tag.author_icon {
            author = author.icon_url(icon);
        }
        embed = embed.author(author);
    }
    embed
}
