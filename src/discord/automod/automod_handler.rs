// Discord-specific automod handling - runs the content filter on messages
// and display names and turns violations into Discord actions.
//
// If the banned word list can't be read the event is logged and left alone.

use crate::core::automod::Outcome;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use std::time::Duration;

const NOTICE_LIFETIME: Duration = Duration::from_secs(5);

/// Check a guild message and remove it if it contains a banned word.
pub async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    msg: &serenity::Message,
) -> Result<(), Error> {
    // Skip bots
    if msg.author.bot {
        return Ok(());
    }

    // Only check guild messages
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    let outcome = match data
        .automod
        .enforce_on_message(msg.author.id.get(), &msg.content)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(
                guild_id = guild_id.get(),
                message_id = msg.id.get(),
                "Automod could not check message: {}",
                e
            );
            return Ok(());
        }
    };

    let Outcome::Violation { warning } = outcome else {
        return Ok(());
    };

    if let Err(e) = msg.delete(&ctx.http).await {
        tracing::warn!("Failed to delete inappropriate message: {}", e);
    }

    data.moderation
        .record_automod_warning(guild_id.get(), &warning)
        .await;

    let notice = msg
        .channel_id
        .say(
            &ctx.http,
            format!("Don't send inappropriate messages, {}", msg.author.mention()),
        )
        .await?;

    // Remove the notice after a few seconds
    let http = ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(NOTICE_LIFETIME).await;
        if let Err(e) = notice.delete(&http).await {
            tracing::warn!("Failed to delete automod notice: {}", e);
        }
    });

    Ok(())
}

/// New member: check their name, then grant the default role and greet them.
pub async fn handle_member_join(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<(), Error> {
    moderate_nickname(
        ctx,
        data,
        member.guild_id,
        member.user.id,
        member.display_name(),
    )
    .await;

    if member.guild_id.get() != data.config.guild_id {
        return Ok(());
    }

    if let Err(e) = member
        .add_role(&ctx.http, serenity::RoleId::new(data.config.default_role))
        .await
    {
        tracing::warn!(user_id = member.user.id.get(), "Failed to add default role: {}", e);
    }

    serenity::ChannelId::new(data.config.welcome_channel)
        .say(
            &ctx.http,
            format!("Welcome to the server {}", member.user.name),
        )
        .await?;
    Ok(())
}

/// Member update: re-check the display name when the nickname changed.
pub async fn handle_member_update(
    ctx: &serenity::Context,
    data: &Data,
    old: Option<&serenity::Member>,
    event: &serenity::GuildMemberUpdateEvent,
) {
    // Without a cached copy we can't tell, so check anyway.
    if old.is_some_and(|old| old.nick == event.nick) {
        return;
    }

    let display_name = event
        .nick
        .as_deref()
        .unwrap_or_else(|| event.user.display_name());
    moderate_nickname(ctx, data, event.guild_id, event.user.id, display_name).await;
}

/// Rename the member and log a warning if their display name is banned.
async fn moderate_nickname(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    display_name: &str,
) {
    let outcome = match data
        .automod
        .enforce_on_nickname(user_id.get(), display_name)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(
                guild_id = guild_id.get(),
                user_id = user_id.get(),
                "Automod could not check nickname: {}",
                e
            );
            return;
        }
    };

    let Outcome::ViolationRename {
        warning,
        replacement,
    } = outcome
    else {
        return;
    };

    if let Err(e) = guild_id
        .edit_member(
            &ctx.http,
            user_id,
            serenity::EditMember::new().nickname(replacement),
        )
        .await
    {
        tracing::warn!(user_id = user_id.get(), "Failed to rename member: {}", e);
    }

    data.moderation
        .record_automod_warning(guild_id.get(), &warning)
        .await;
}
