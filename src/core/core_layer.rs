// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "automod/mod.rs"]
pub mod automod;

#[path = "config/bot_config.rs"]
pub mod config;

#[path = "event_server/team_layout.rs"]
pub mod event_server;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "rsvp/mod.rs"]
pub mod rsvp;

#[path = "transcript/mod.rs"]
pub mod transcript;
