// Moderator commands backed by the warning log.

use crate::core::moderation::format_warning_summary;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;

const DEFAULT_BAN_REASON: &str = "No reason provided";

async fn reply_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Shows all warnings for the specified user
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MODERATE_MEMBERS",
    member_cooldown = 2
)]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "Member to look up"] member: serenity::Member,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    tracing::info!(
        guild_id = guild_id.get(),
        user_id = member.user.id.get(),
        "Fetching warnings"
    );

    let summary = ctx
        .data()
        .moderation
        .warning_summary(guild_id.get(), member.user.id.get())
        .await?;

    tracing::info!(
        user_id = summary.member_id,
        total = summary.total,
        "Displayed warnings"
    );
    reply_ephemeral(
        ctx,
        format_warning_summary(&member.mention().to_string(), &summary),
    )
    .await
}

/// Clears all warnings for the specified user
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MODERATE_MEMBERS",
    member_cooldown = 2
)]
pub async fn clearwarnings(
    ctx: Context<'_>,
    #[description = "Member whose warnings should be cleared"] member: serenity::Member,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;

    let cleared = ctx
        .data()
        .moderation
        .clear_warnings(guild_id.get(), member.user.id.get())
        .await?;

    reply_ephemeral(
        ctx,
        format!("Cleared {} warnings for {}.", cleared, member.mention()),
    )
    .await
}

/// Bans the specified member from the server.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "BAN_MEMBERS",
    member_cooldown = 2
)]
pub async fn banmember(
    ctx: Context<'_>,
    #[description = "Member to ban"] member: serenity::Member,
    #[description = "Reason for the ban"] reason: Option<String>,
) -> Result<(), Error> {
    let reason = reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BAN_REASON.to_string());

    tracing::info!(
        guild_id = member.guild_id.get(),
        user_id = member.user.id.get(),
        reason = %reason,
        "Banning member"
    );
    member.ban_with_reason(ctx.http(), 0, &reason).await?;

    reply_ephemeral(
        ctx,
        format!("{} has been banned. Reason: {}", member.mention(), reason),
    )
    .await
}

/// Unbans the specified user from the server.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "BAN_MEMBERS",
    member_cooldown = 2
)]
pub async fn unbanmember(
    ctx: Context<'_>,
    #[description = "ID of the user to unban"] user_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let user_id = match user_id.trim().parse::<u64>() {
        Ok(id) if id > 0 => serenity::UserId::new(id),
        _ => {
            return reply_ephemeral(ctx, format!("`{}` is not a valid user id.", user_id)).await;
        }
    };

    let user = user_id.to_user(ctx.http()).await?;
    guild_id.unban(ctx.http(), user.id).await?;
    tracing::info!(guild_id = guild_id.get(), user_id = user.id.get(), "Unbanned user");

    reply_ephemeral(ctx, format!("{} has been unbanned.", user.mention())).await
}
