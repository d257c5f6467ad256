// Event server provisioning: per-team categories, roles and channels.
//
// Discord calls are paced one second apart; bulk channel work otherwise runs
// straight into rate limits.

use crate::core::event_server::{parse_team_list, TeamLayout};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

const ADMIN_ROLE: &str = "Admin";
const STEP_DELAY: Duration = Duration::from_secs(1);
const MEMBER_PAGE_SIZE: u64 = 1000;

/// Only members holding the `Admin` role may run event commands.
async fn has_admin_role(ctx: Context<'_>) -> Result<bool, Error> {
    let Some(member) = ctx.author_member().await else {
        return Ok(false);
    };
    let role_ids = member.roles.clone();

    let is_admin = {
        let guild = ctx.guild().ok_or("Guild not found")?;
        role_ids
            .iter()
            .any(|id| guild.roles.get(id).is_some_and(|r| r.name == ADMIN_ROLE))
    };

    if !is_admin {
        ctx.send(
            poise::CreateReply::default()
                .content(format!("You need the `{}` role to use this command.", ADMIN_ROLE))
                .ephemeral(true),
        )
        .await?;
    }
    Ok(is_admin)
}

fn everyone_role(guild_id: serenity::GuildId) -> serenity::RoleId {
    // @everyone role ID is same as guild ID
    serenity::RoleId::new(guild_id.get())
}

/// Hidden from everyone, visible to `role`.
fn private_to(
    guild_id: serenity::GuildId,
    role: serenity::RoleId,
) -> Vec<serenity::PermissionOverwrite> {
    let access = serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::CONNECT;
    vec![
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::empty(),
            deny: access,
            kind: serenity::PermissionOverwriteType::Role(everyone_role(guild_id)),
        },
        serenity::PermissionOverwrite {
            allow: access,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Role(role),
        },
    ]
}

/// Create role, category, text and voice channel for one layout.
/// Returns the category and role ids.
async fn create_area(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    layout: &TeamLayout,
) -> Result<(serenity::ChannelId, serenity::RoleId), Error> {
    let role = guild_id
        .create_role(ctx.http(), serenity::EditRole::new().name(&layout.role_name))
        .await?;
    let permissions = private_to(guild_id, role.id);

    let category = guild_id
        .create_channel(
            ctx.http(),
            serenity::CreateChannel::new(&layout.category_name)
                .kind(serenity::ChannelType::Category)
                .permissions(permissions.clone()),
        )
        .await?;

    guild_id
        .create_channel(
            ctx.http(),
            serenity::CreateChannel::new(&layout.text_channel)
                .kind(serenity::ChannelType::Text)
                .category(category.id)
                .permissions(permissions.clone()),
        )
        .await?;
    tokio::time::sleep(STEP_DELAY).await;

    guild_id
        .create_channel(
            ctx.http(),
            serenity::CreateChannel::new(&layout.voice_channel)
                .kind(serenity::ChannelType::Voice)
                .category(category.id)
                .permissions(permissions),
        )
        .await?;
    tokio::time::sleep(STEP_DELAY).await;

    Ok((category.id, role.id))
}

/// Every member of the guild, fetched page by page.
async fn fetch_all_members(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
) -> Result<Vec<serenity::Member>, Error> {
    let mut members = Vec::new();
    let mut after: Option<serenity::UserId> = None;

    loop {
        let page = guild_id
            .members(ctx.http(), Some(MEMBER_PAGE_SIZE), after)
            .await?;
        let page_len = page.len() as u64;
        after = page.last().map(|m| m.user.id);
        members.extend(page);

        if page_len < MEMBER_PAGE_SIZE {
            break;
        }
    }

    Ok(members)
}

/// Creates team categories, roles, and channels for an event.
#[poise::command(slash_command, guild_only, check = "has_admin_role")]
pub async fn createteams(
    ctx: Context<'_>,
    #[description = "Comma separated team names, e.g. Red Team, Blue Team"] list_of_teams: String,
    #[description = "Also create a leaders area that can see every team"] leaders: Option<bool>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let teams = parse_team_list(&list_of_teams);
    if teams.is_empty() {
        ctx.say("❌ Give at least one team name.").await?;
        return Ok(());
    }

    ctx.say(format!("🚧 Creating categories for teams: {}", teams.join(", ")))
        .await?;

    let mut categories = Vec::with_capacity(teams.len());
    for team in &teams {
        let layout = TeamLayout::for_team(team);
        ctx.say(format!("📁 Setting up channels for team: {}", layout.team_name))
            .await?;

        let (category_id, _) = create_area(ctx, guild_id, &layout).await?;
        categories.push(category_id);
        tracing::info!(guild_id = guild_id.get(), team = %layout.team_name, "Team created");

        ctx.say(format!("✅ Channels created for team: {}", layout.team_name))
            .await?;
    }

    if leaders.unwrap_or(false) {
        let (_, leaders_role) = create_area(ctx, guild_id, &TeamLayout::leaders()).await?;

        let access = serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::CONNECT;
        for category_id in categories {
            category_id
                .create_permission(
                    ctx.http(),
                    serenity::PermissionOverwrite {
                        allow: access,
                        deny: serenity::Permissions::empty(),
                        kind: serenity::PermissionOverwriteType::Role(leaders_role),
                    },
                )
                .await?;
        }

        ctx.say("✅ Leaders category and channels created").await?;
    }

    Ok(())
}

/// Removes a team: deletes its category, channels, and role.
#[poise::command(slash_command, guild_only, check = "has_admin_role")]
pub async fn removeteam(
    ctx: Context<'_>,
    #[description = "The team role, e.g. Red Team_role"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let layout = TeamLayout::from_role_name(&role.name);

    ctx.say(format!(
        "🧹 Starting removal process for team **{}**...",
        layout.team_name
    ))
    .await?;

    for member in fetch_all_members(ctx, guild_id).await? {
        if !member.roles.contains(&role.id) {
            continue;
        }
        let reply = match member.remove_role(ctx.http(), role.id).await {
            Ok(()) => format!("👢 Removed {}'s {} role.", member.display_name(), role.name),
            Err(e) => {
                tracing::warn!(user_id = member.user.id.get(), "Failed to remove team role: {}", e);
                format!("⚠️ Couldn't remove role from {}.", member.display_name())
            }
        };
        ctx.say(reply).await?;
    }

    let channels = guild_id.channels(ctx.http()).await?;
    let targets = [
        ("Category", serenity::ChannelType::Category, &layout.category_name),
        ("Text channel", serenity::ChannelType::Text, &layout.text_channel),
        ("Voice channel", serenity::ChannelType::Voice, &layout.voice_channel),
    ];

    for (label, kind, name) in targets {
        let found = channels
            .values()
            .find(|channel| channel.kind == kind && &channel.name == name);

        let reply = match found {
            None => format!("⚠️ {} `{}` not found.", label, name),
            Some(channel) => match channel.id.delete(ctx.http()).await {
                Ok(_) => format!("✅ {} `{}` deleted.", label, name),
                Err(e) => {
                    tracing::warn!(channel_id = channel.id.get(), "Failed to delete channel: {}", e);
                    format!("⚠️ Couldn't delete {} `{}`.", label.to_lowercase(), name)
                }
            },
        };
        ctx.say(reply).await?;
    }

    let reply = match guild_id.delete_role(ctx.http(), role.id).await {
        Ok(()) => format!("🧾 Role `{}` deleted successfully.", role.name),
        Err(e) => {
            tracing::warn!(role_id = role.id.get(), "Failed to delete team role: {}", e);
            format!("⚠️ Couldn't delete role `{}`.", role.name)
        }
    };
    ctx.say(reply).await?;

    ctx.say(format!("✅ Team **{}** has been fully removed.", layout.team_name))
        .await?;
    Ok(())
}

/// Kicks all members with the specified team role.
#[poise::command(slash_command, guild_only, check = "has_admin_role")]
pub async fn kickteam(
    ctx: Context<'_>,
    #[description = "The team role"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    ctx.say(format!("👢 Kicking every member of {}...", role.name))
        .await?;

    let mut kicked = 0;
    for member in fetch_all_members(ctx, guild_id).await? {
        if !member.roles.contains(&role.id) {
            continue;
        }
        match member.kick(ctx.http()).await {
            Ok(()) => {
                kicked += 1;
                ctx.say(format!("Kicked {}", member.display_name())).await?;
            }
            Err(e) => {
                tracing::warn!(user_id = member.user.id.get(), "Failed to kick member: {}", e);
                ctx.say(format!("⚠️ Couldn't kick {}.", member.display_name()))
                    .await?;
            }
        }
    }

    ctx.say(format!("✅ Kicked {} member(s).", kicked)).await?;
    Ok(())
}

/// Performs a full cleanup of the event server (use with caution!).
///
/// Kicks everyone without administrator rights, then deletes every role and
/// channel the bot is allowed to delete.
#[poise::command(slash_command, guild_only, owners_only)]
pub async fn cleanup(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be used in a server")?;
    let bot_id = ctx.framework().bot_id;

    ctx.say("⚠️ Starting full server cleanup...").await?;
    tracing::warn!(guild_id = guild_id.get(), user_id = ctx.author().id.get(), "Server cleanup started");

    let owner_id = guild_id.to_partial_guild(ctx.http()).await?.owner_id;
    let roles = guild_id.roles(ctx.http()).await?;
    let is_administrator = |member: &serenity::Member| {
        member.user.id == owner_id
            || member.roles.iter().any(|id| {
                roles
                    .get(id)
                    .is_some_and(|role| role.permissions.administrator())
            })
    };

    for member in fetch_all_members(ctx, guild_id).await? {
        if member.user.id == bot_id || is_administrator(&member) {
            continue;
        }
        if let Err(e) = member
            .kick_with_reason(ctx.http(), "Server cleanup in progress")
            .await
        {
            tracing::warn!(user_id = member.user.id.get(), "Failed to kick member: {}", e);
        }
    }

    let everyone = everyone_role(guild_id);
    for role in roles.values() {
        if role.id == everyone || role.managed {
            continue;
        }
        tokio::time::sleep(STEP_DELAY).await;
        match guild_id.delete_role(ctx.http(), role.id).await {
            Ok(()) => tracing::info!(role_id = role.id.get(), "Deleted role {}", role.name),
            Err(e) => tracing::warn!(
                role_id = role.id.get(),
                "Failed to delete role {}: {}",
                role.name,
                e
            ),
        }
    }

    // Categories last so their channels go first.
    let mut channels: Vec<_> = guild_id.channels(ctx.http()).await?.into_values().collect();
    channels.sort_by_key(|channel| channel.kind == serenity::ChannelType::Category);
    for channel in channels {
        tokio::time::sleep(STEP_DELAY).await;
        match channel.id.delete(ctx.http()).await {
            Ok(_) => tracing::info!(
                channel_id = channel.id.get(),
                "Deleted channel {}",
                channel.name
            ),
            Err(e) => tracing::warn!(
                channel_id = channel.id.get(),
                "Failed to delete channel {}: {}",
                channel.name,
                e
            ),
        }
    }

    // The invoking channel is usually gone by now.
    if let Err(e) = ctx.say("🧹 Server cleanup completed successfully!").await {
        tracing::info!("Cleanup finished, could not report back: {}", e);
    }
    Ok(())
}
