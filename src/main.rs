// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite, JSON files)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Route gateway events to their handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::automod::ContentFilter;
use crate::core::config::BotConfig;
use crate::core::moderation::ModerationService;
use crate::core::rsvp::{default_options, RsvpService};
use crate::discord::automod as automod_events;
use crate::discord::commands::presence;
use crate::discord::rsvp as rsvp_buttons;
use crate::discord::{Data, Error};
use crate::infra::moderation::SqliteModerationStore;
use crate::infra::rsvp::JsonRsvpStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = automod_events::handle_message(ctx, data, new_message).await {
                tracing::error!("Error running automod on message: {}", e);
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = automod_events::handle_member_join(ctx, data, new_member).await {
                tracing::error!("Error handling member join: {}", e);
            }
        }
        serenity::FullEvent::GuildMemberUpdate {
            old_if_available,
            event,
            ..
        } => {
            automod_events::handle_member_update(ctx, data, old_if_available.as_ref(), event)
                .await;
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            if let Err(e) = rsvp_buttons::handle_component(ctx, data, component).await {
                tracing::error!("Error handling RSVP button: {}", e);
            }
        }

        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Initialize logging so we can see what's happening (RUST_LOG, default info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = BotConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // Keep runtime data in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&config.data_dir).context("Failed to create data directory")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!(
            "sqlite://{}?mode=rwc",
            config.database_path().display()
        ))
        .await
        .context("Failed to connect to the moderation database")?;
    let moderation_store = SqliteModerationStore::new(pool);
    moderation_store
        .migrate()
        .await
        .context("Failed to migrate the moderation database")?;
    let moderation_service = Arc::new(ModerationService::new(moderation_store.clone()));

    let rsvp_store = JsonRsvpStore::new(config.rsvp_store_path());
    let rsvp_service = Arc::new(
        RsvpService::new(rsvp_store, default_options())
            .await
            .context("Failed to load RSVP responses")?,
    );
    tracing::info!(
        "Tracking {} RSVP messages",
        rsvp_service.tracked_messages().await.len()
    );

    let token = config.token.clone();
    let config = Arc::new(config);

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            // Event handler for messages and other events
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("Logged in as {}", ready.user.name);

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered");

                presence::on_ready(ctx);

                // Automod warnings are issued in the bot's own name.
                let automod = Arc::new(ContentFilter::new(
                    config.banned_words.clone(),
                    moderation_store,
                    ready.user.id.get(),
                ));

                Ok(Data {
                    config,
                    automod,
                    moderation: moderation_service,
                    rsvp: rsvp_service,
                })
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
