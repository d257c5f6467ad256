// Core moderation module - warning log and banned word administration.
// Following the same pattern as the logging module.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
