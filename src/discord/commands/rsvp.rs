use crate::core::rsvp::{merge_rsvp_fields, RsvpBoard};
use crate::discord::rsvp::{rsvp_components, RSVP_COLOR};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

const RSVP_FOOTER: &str = "Powered by Eternal Bot";

/// Create and manage RSVP events
#[poise::command(slash_command, subcommands("create"), guild_only)]
pub async fn rsvp(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Create an RSVP with Going / Maybe / Not Going buttons.
#[poise::command(slash_command, guild_only)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Event title"] title: String,
    #[description = "Event description"] description: String,
    #[description = "Optional image url"] banner_url: Option<String>,
    #[description = "Unix timestamp (seconds)"] timestamp: Option<i64>,
) -> Result<(), Error> {
    let author = ctx.author();
    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(RSVP_COLOR)
        .author(serenity::CreateEmbedAuthor::new(author.display_name()).icon_url(author.face()));

    if let Some(ts) = timestamp {
        embed = embed.field("Event Time", format!("<t:{}:F>", ts), false);
    }
    if let Some(url) = banner_url.filter(|u| !u.trim().is_empty()) {
        embed = embed.image(url);
    }
    embed = embed.footer(serenity::CreateEmbedFooter::new(RSVP_FOOTER));

    // Empty lists up front, so the first press doesn't reshuffle the embed.
    let options = ctx.data().rsvp.options();
    for field in merge_rsvp_fields(Vec::new(), options, &RsvpBoard::new(options)) {
        embed = embed.field(field.name, field.value, field.inline);
    }

    let handle = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(rsvp_components(options)),
        )
        .await?;
    let message = handle.message().await?;

    ctx.data().rsvp.register(message.id.get()).await?;
    tracing::info!(message_id = message.id.get(), "RSVP created");
    Ok(())
}
