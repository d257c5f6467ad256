// Runtime administration of the automod banned word list.

use crate::core::moderation::ModerationError;
use crate::discord::{Context, Error};

/// Manage the automod banned word list.
#[poise::command(
    slash_command,
    subcommands("add", "remove", "list"),
    required_permissions = "MODERATE_MEMBERS",
    guild_only
)]
pub async fn automod(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - subcommands do the work
    Ok(())
}

/// Ban a word. Matching ignores case and anything that isn't a letter.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Word to ban"] word: String,
) -> Result<(), Error> {
    let reply = match ctx.data().moderation.add_banned_word(&word).await {
        Ok(true) => format!("✅ `{}` is now banned.", word.trim().to_lowercase()),
        Ok(false) => format!("`{}` was already banned.", word.trim().to_lowercase()),
        Err(ModerationError::InvalidWord(_)) => {
            "❌ A banned word needs at least one letter.".to_string()
        }
        Err(e) => return Err(e.into()),
    };

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}

/// Unban a word.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Word to remove from the list"] word: String,
) -> Result<(), Error> {
    let removed = ctx.data().moderation.remove_banned_word(&word).await?;
    let reply = if removed {
        format!("✅ `{}` is no longer banned.", word.trim().to_lowercase())
    } else {
        format!("`{}` was not on the list.", word.trim().to_lowercase())
    };

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}

/// Show the words added with /automod add.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let words = ctx.data().moderation.banned_words().await?;
    let static_count = ctx.data().config.banned_words.len();

    let mut reply = if words.is_empty() {
        "No words have been added with `/automod add`.".to_string()
    } else {
        format!("**Banned words ({})**\n||{}||", words.len(), words.join(", "))
    };
    reply.push_str(&format!(
        "\n{} more word(s) come from the bot configuration.",
        static_count
    ));
    if reply.chars().count() > 2000 {
        reply = format!(
            "**Banned words ({})**\nThe list is too long to show here.",
            words.len()
        );
    }

    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}
