// Core moderation module - banned-word screening for submissions.
// Following the same pattern as the posts module.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
