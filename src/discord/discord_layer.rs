// Discord layer - commands and event handlers.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "automod/automod_handler.rs"]
pub mod automod;

#[path = "rsvp/rsvp_buttons.rs"]
pub mod rsvp;

// Re-export command types for convenience
pub use commands::{Context, Data, Error};
