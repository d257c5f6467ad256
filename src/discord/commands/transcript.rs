// Transcript export: render channel or thread history to HTML and DM it to
// the moderator who asked for it.

use crate::core::transcript::{
    color_hex, render_transcript, top_role_color, transcript_file_name, TranscriptMessage,
};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

const HISTORY_PAGE_SIZE: u8 = 100;
const ARCHIVED_PAGE_SIZE: u64 = 100;

/// Create HTML transcripts of channels and threads
#[poise::command(
    slash_command,
    subcommands("channel", "thread", "threads"),
    required_permissions = "MANAGE_MESSAGES",
    guild_only
)]
pub async fn transcript(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Creates a transcript for a channel
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn channel(
    ctx: Context<'_>,
    #[description = "Channel to export"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let html = build_transcript(ctx, &channel, None).await?;
    deliver(ctx, vec![(transcript_file_name(&channel.name), html)]).await
}

/// Creates a transcript for a thread
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn thread(
    ctx: Context<'_>,
    #[description = "Thread to export"]
    #[channel_types("PublicThread", "PrivateThread", "NewsThread")]
    thread: serenity::GuildChannel,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let html = build_transcript(ctx, &thread, Some(&thread)).await?;
    deliver(ctx, vec![(transcript_file_name(&thread.name), html)]).await
}

/// Creates transcripts for all archived threads in a channel
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn threads(
    ctx: Context<'_>,
    #[description = "Channel whose archived threads should be exported"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let mut archived = Vec::new();
    let mut before: Option<u64> = None;
    loop {
        let page = channel
            .id
            .get_archived_public_threads(ctx.http(), before, Some(ARCHIVED_PAGE_SIZE))
            .await?;

        let last_archived = page
            .threads
            .last()
            .and_then(|t| t.thread_metadata.as_ref())
            .and_then(|m| m.archive_timestamp)
            .map(|ts| ts.unix_timestamp());
        let has_more = page.has_more;
        archived.extend(page.threads);

        match next_archive_cursor(has_more, last_archived, before) {
            Some(cursor) => before = Some(cursor),
            None => break,
        }
    }

    let mut files = Vec::with_capacity(archived.len());
    for thread in &archived {
        let html = build_transcript(ctx, thread, Some(thread)).await?;
        files.push((transcript_file_name(&thread.name), html));
    }

    deliver(ctx, files).await
}

/// Where the next archived-thread page starts, or `None` when paging is done.
///
/// Stops when Discord reports no more threads, when the last thread carries no
/// archive timestamp, or when the cursor would not move backwards.
fn next_archive_cursor(
    has_more: bool,
    last_archived: Option<i64>,
    before: Option<u64>,
) -> Option<u64> {
    if !has_more {
        return None;
    }
    let cursor = u64::try_from(last_archived?).ok()?;
    match before {
        Some(previous) if cursor >= previous => None,
        _ => Some(cursor),
    }
}

/// Full history of `channel`, newest first.
async fn fetch_history(
    ctx: Context<'_>,
    channel_id: serenity::ChannelId,
) -> Result<Vec<serenity::Message>, Error> {
    let mut history = Vec::new();
    let mut before: Option<serenity::MessageId> = None;

    loop {
        let mut request = serenity::GetMessages::new().limit(HISTORY_PAGE_SIZE);
        if let Some(id) = before {
            request = request.before(id);
        }

        let page = channel_id.messages(ctx.http(), request).await?;
        let page_len = page.len();
        before = page.last().map(|m| m.id);
        history.extend(page);

        if page_len < HISTORY_PAGE_SIZE as usize {
            break;
        }
    }

    Ok(history)
}

async fn build_transcript(
    ctx: Context<'_>,
    channel: &serenity::GuildChannel,
    thread: Option<&serenity::GuildChannel>,
) -> Result<String, Error> {
    let history = fetch_history(ctx, channel.id).await?;
    tracing::info!(
        channel_id = channel.id.get(),
        messages = history.len(),
        "Rendering transcript"
    );

    let roles = channel.guild_id.roles(ctx.http()).await?;
    let mut colors: HashMap<serenity::UserId, u32> = HashMap::new();

    let messages: Vec<TranscriptMessage> = history
        .iter()
        .map(|message| {
            let color = *colors
                .entry(message.author.id)
                .or_insert_with(|| author_color(ctx, channel.guild_id, message, &roles));

            TranscriptMessage {
                author_name: message
                    .member
                    .as_ref()
                    .and_then(|m| m.nick.clone())
                    .unwrap_or_else(|| message.author.display_name().to_string()),
                avatar_url: message.author.face(),
                name_color: color_hex(color),
                content: message.content.clone(),
                attachment_urls: message.attachments.iter().map(|a| a.url.clone()).collect(),
            }
        })
        .collect();

    let thread_info = thread.map(|t| (t.id.get(), t.name.as_str()));
    Ok(render_transcript(&channel.name, thread_info, &messages))
}

/// Role colour of a message author, from the message itself or the cache.
fn author_color(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    message: &serenity::Message,
    roles: &HashMap<serenity::RoleId, serenity::Role>,
) -> u32 {
    let role_ids: Vec<serenity::RoleId> = match &message.member {
        Some(member) => member.roles.clone(),
        None => ctx
            .cache()
            .member(guild_id, message.author.id)
            .map(|member| member.roles.clone())
            .unwrap_or_default(),
    };

    let ranked: Vec<(u16, u32)> = role_ids
        .iter()
        .filter_map(|id| roles.get(id))
        .map(|role| (role.position, role.colour.0))
        .collect();
    top_role_color(&ranked)
}

/// DM every file to the invoker and report back ephemerally.
async fn deliver(ctx: Context<'_>, files: Vec<(String, String)>) -> Result<(), Error> {
    if files.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .content("There was nothing to export.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let count = files.len();
    for (file_name, html) in files {
        let attachment = serenity::CreateAttachment::bytes(html.into_bytes(), file_name.clone());
        let dm = serenity::CreateMessage::new().add_file(attachment);

        if let Err(e) = ctx.author().direct_message(ctx.http(), dm).await {
            tracing::error!(
                user_id = ctx.author().id.get(),
                "Unable to send transcript {}: {}",
                file_name,
                e
            );
            ctx.send(
                poise::CreateReply::default()
                    .content("I couldn't DM you. Allow direct messages from server members and try again.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
    }

    tracing::info!(user_id = ctx.author().id.get(), count, "Transcripts sent");

    let reply = format!("📨 Sent {} transcript(s) to your DMs.", count);
    ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_paging_continues_while_more_remain() {
        assert_eq!(next_archive_cursor(true, Some(1_700_000_000), None), Some(1_700_000_000));
        assert_eq!(
            next_archive_cursor(true, Some(1_600_000_000), Some(1_700_000_000)),
            Some(1_600_000_000)
        );
    }

    #[test]
    fn test_archive_paging_stops() {
        assert_eq!(next_archive_cursor(false, Some(1_700_000_000), None), None);
        // No timestamp to page from
        assert_eq!(next_archive_cursor(true, None, None), None);
        // Cursor did not move
        assert_eq!(
            next_archive_cursor(true, Some(1_700_000_000), Some(1_700_000_000)),
            None
        );
        assert_eq!(next_archive_cursor(true, Some(-5), None), None);
    }
}
