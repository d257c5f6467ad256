// Discord commands module.
// Each feature gets its own command file.

pub mod administration;

pub mod automod;

pub mod event_server;

// Bot presence management
pub mod presence;

pub mod rsvp;

pub mod transcript;

use crate::core::automod::ContentFilter;
use crate::core::config::BotConfig;
use crate::core::moderation::ModerationService;
use crate::core::rsvp::RsvpService;
use crate::infra::moderation::SqliteModerationStore;
use crate::infra::rsvp::JsonRsvpStore;
use std::sync::Arc;

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands and event handlers.
pub struct Data {
    pub config: Arc<BotConfig>,
    pub automod: Arc<ContentFilter<SqliteModerationStore>>,
    pub moderation: Arc<ModerationService<SqliteModerationStore>>,
    pub rsvp: Arc<RsvpService<JsonRsvpStore>>,
}

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        administration::warnings(),
        administration::clearwarnings(),
        administration::banmember(),
        administration::unbanmember(),
        automod::automod(),
        event_server::createteams(),
        event_server::removeteam(),
        event_server::kickteam(),
        event_server::cleanup(),
        rsvp::rsvp(),
        transcript::transcript(),
    ]
}
