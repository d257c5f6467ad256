pub mod rsvp_models;
pub mod rsvp_service;

pub use rsvp_models::*;
pub use rsvp_service::*;
