// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "moderation/word_store.rs"]
pub mod moderation;

#[path = "posts/post_store.rs"]
pub mod posts;

#[path = "follows/follow_store.rs"]
pub mod follows;
