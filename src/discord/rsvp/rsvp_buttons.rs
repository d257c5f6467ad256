// RSVP buttons: building them, and handling presses.
//
// Presses are routed from the raw interaction event by custom id, so buttons
// on messages posted before a restart keep working.

use crate::core::rsvp::{
    merge_rsvp_fields, parse_custom_id, pretty_key, EmbedField, RsvpBoard, RsvpError,
    RsvpOption, RsvpStyle, RsvpToggle,
};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;

/// Discord blurple, the colour of freshly created RSVP embeds.
pub const RSVP_COLOR: u32 = 0x5865F2;

fn button_style(style: RsvpStyle) -> serenity::ButtonStyle {
    match style {
        RsvpStyle::Success => serenity::ButtonStyle::Success,
        RsvpStyle::Primary => serenity::ButtonStyle::Primary,
        RsvpStyle::Danger => serenity::ButtonStyle::Danger,
    }
}

/// One row with a button per option.
pub fn rsvp_components(options: &[RsvpOption]) -> Vec<serenity::CreateActionRow> {
    let buttons = options
        .iter()
        .map(|opt| {
            serenity::CreateButton::new(opt.custom_id())
                .label(&opt.label)
                .style(button_style(opt.style))
        })
        .collect();
    vec![serenity::CreateActionRow::Buttons(buttons)]
}

/// Handle a component interaction if it is an RSVP button.
///
/// Returns `false` for any other component.
pub async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
) -> Result<bool, Error> {
    let Some(key) = parse_custom_id(&interaction.data.custom_id) else {
        return Ok(false);
    };

    let message_id = interaction.message.id;
    let mention = interaction.user.mention().to_string();

    let reply = match data.rsvp.respond(message_id.get(), &mention, key).await {
        Ok((RsvpToggle::Removed { .. }, board)) => {
            Some(("You have been removed from this RSVP.".to_string(), board))
        }
        Ok((RsvpToggle::Added { key }, board)) => {
            Some((format!("You responded: **{}**", pretty_key(&key)), board))
        }
        Err(RsvpError::UnknownOption(key)) => {
            tracing::warn!(message_id = message_id.get(), "Unknown RSVP option {}", key);
            None
        }
        Err(e) => return Err(e.into()),
    };

    let Some((content, board)) = reply else {
        respond_ephemeral(ctx, interaction, "This RSVP option is no longer available.").await?;
        return Ok(true);
    };

    respond_ephemeral(ctx, interaction, &content).await?;
    tracing::debug!(
        message_id = message_id.get(),
        user_id = interaction.user.id.get(),
        "RSVP updated"
    );

    update_rsvp_message(ctx, data, interaction.channel_id, message_id, &board).await;
    Ok(true)
}

async fn respond_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Re-render the embed of an RSVP message from the current board.
async fn update_rsvp_message(
    ctx: &serenity::Context,
    data: &Data,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    board: &RsvpBoard,
) {
    // Fetch again rather than trusting the interaction's copy.
    let mut message = match channel_id.message(&ctx.http, message_id).await {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(message_id = message_id.get(), "Failed to fetch RSVP message: {}", e);
            return;
        }
    };

    let Some(embed) = message.embeds.first() else {
        tracing::warn!(message_id = message_id.get(), "RSVP message has no embeds; skipping update");
        return;
    };

    let embed = rebuild_embed(embed, data.rsvp.options(), board);
    if let Err(e) = message
        .edit(&ctx.http, serenity::EditMessage::new().embed(embed))
        .await
    {
        tracing::error!(message_id = message_id.get(), "Failed to edit RSVP message: {}", e);
    }
}

/// Copy everything but the RSVP lists, then append fresh lists.
fn rebuild_embed(
    embed: &serenity::Embed,
    options: &[RsvpOption],
    board: &RsvpBoard,
) -> serenity::CreateEmbed {
    let mut rebuilt = serenity::CreateEmbed::new()
        .color(embed.colour.map(|c| c.0).unwrap_or(RSVP_COLOR));

    if let Some(title) = &embed.title {
        rebuilt = rebuilt.title(title);
    }
    if let Some(description) = &embed.description {
        rebuilt = rebuilt.description(description);
    }
    if let Some(author) = &embed.author {
        let mut new_author = serenity::CreateEmbedAuthor::new(&author.name);
        if let Some(icon_url) = &author.icon_url {
            new_author = new_author.icon_url(icon_url);
        }
        rebuilt = rebuilt.author(new_author);
    }
    if let Some(image) = &embed.image {
        rebuilt = rebuilt.image(&image.url);
    }
    if let Some(footer) = &embed.footer {
        rebuilt = rebuilt.footer(serenity::CreateEmbedFooter::new(&footer.text));
    }

    let existing = embed
        .fields
        .iter()
        .map(|field| EmbedField {
            name: field.name.clone(),
            value: field.value.clone(),
            inline: field.inline,
        })
        .collect();

    for field in merge_rsvp_fields(existing, options, board) {
        rebuilt = rebuilt.field(field.name, field.value, field.inline);
    }
    rebuilt
}
