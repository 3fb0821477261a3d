// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "posts/mod.rs"]
pub mod posts;

#[path = "follows/follow_service.rs"]
pub mod follows;
