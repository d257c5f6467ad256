// Core automod module - banned word detection for messages and nicknames.
// Same layout as the moderation module: models + service.

pub mod automod_models;
pub mod automod_service;

pub use automod_models::*;
pub use automod_service::*;
