// This is the entry point of the blogging backend.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases, files)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Seed the banned vocabulary from a word-list file, if configured
// 4. Run a line-oriented console loop against the publishing pipeline

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::follows::{FollowError, FollowService};
use crate::core::moderation::{BannedWord, ModerationError, ModerationService};
use crate::core::posts::{PostDraft, PostError, PostService, PostStore, Submission};
use crate::infra::follows::SqliteFollowStore;
use crate::infra::moderation::SqliteBannedWordStore;
use crate::infra::posts::SqlitePostStore;
use std::io::BufRead;

/// Author id used for posts submitted through the console loop.
const DEMO_AUTHOR_ID: u64 = 1;

/// Load an initial word list into an empty vocabulary.
///
/// The file named by BANNED_WORDS_FILE is split on whitespace; entries
/// already present (case-insensitively) are skipped. Nothing happens when
/// the variable is unset or the vocabulary already has entries.
async fn seed_vocabulary(store: &SqliteBannedWordStore) -> anyhow::Result<()> {
    use crate::core::moderation::BannedWordStore;

    let path = match std::env::var("BANNED_WORDS_FILE") {
        Ok(path) => path,
        Err(_) => return Ok(()),
    };
    if !store.list_words().await?.is_empty() {
        return Ok(());
    }
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("Failed to read word list at {}: {}", path, e);
            return Ok(());
        }
    };

    let mut added = 0usize;
    for word in contents.split_whitespace() {
        match store
            .insert_word(BannedWord::new(word, "imported", ""))
            .await
        {
            Ok(()) => added += 1,
            Err(ModerationError::DuplicateWord(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!("Seeded {} banned words from {}", added, path);
    Ok(())
}

fn print_help() {
    println!("commands:");
    println!(
        "  <text>                submit <text> as a post by author {}",
        DEMO_AUTHOR_ID
    );
    println!("  show <post>           a post and its comments");
    println!("  comment <post> <text> comment on a post");
    println!("  recent                latest posts");
    println!("  author <id>           latest posts by one author");
    println!("  newgroup <slug> <title>   create a group");
    println!("  group <slug>          latest posts in a group");
    println!("  ban <word>            add a word to the banned vocabulary");
    println!("  unban <word>          remove a word from the vocabulary");
    println!("  words                 list the vocabulary");
    println!("  follow <user> <author>    subscribe a user to an author");
    println!("  unfollow <user> <author>  remove the subscription");
    println!("  followers <author>    users following an author");
    println!("  feed <user>           latest posts by the user's followed authors");
    println!("  help                  this text");
    println!("  quit                  exit");
}

fn print_posts(posts: &[crate::core::posts::Post]) {
    for post in posts {
        println!("#{} by {}: {}", post.id, post.author_id, post.text);
    }
    println!("{} posts", posts.len());
}

async fn submit<P: PostStore, B: crate::core::moderation::BannedWordStore>(
    posts: &PostService<P, B>,
    text: &str,
) {
    match posts.submit_post(DEMO_AUTHOR_ID, PostDraft::text(text)).await {
        Ok(Submission::Published(post)) => println!("published post {}", post.id),
        Ok(Submission::Rejected { message }) => println!("{}", message),
        // Fail-closed: a submission the vocabulary could not be checked
        // against is a failed submission, not an accepted one.
        Err(e) => tracing::error!("Submission failed: {}", e),
    }
}

fn parse_pair(rest: &str) -> Option<(u64, u64)> {
    let mut parts = rest.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    Some((a, b))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Keep runtime databases in a dedicated folder so the repo root stays tidy.
    let data_dir = std::env::var("BLOG_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    std::fs::create_dir_all(&data_dir)?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let word_store = SqliteBannedWordStore::new(&format!("{}/moderation.db", data_dir)).await?;
    seed_vocabulary(&word_store).await?;

    let post_store = SqlitePostStore::new(&format!("{}/posts.db", data_dir)).await?;
    let follow_store = SqliteFollowStore::new(&format!("{}/follows.db", data_dir)).await?;

    let posts = PostService::new(post_store, ModerationService::new(word_store));
    let follows = FollowService::new(follow_store);

    tracing::info!("inkstream console ready (data dir: {})", data_dir);
    print_help();

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (cmd, rest) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match cmd {
            "quit" | "exit" => break,
            "help" => print_help(),
            "ban" if !rest.is_empty() => {
                match posts.moderation().add_word(rest, "manual", "").await {
                    Ok(()) => println!("banned '{}'", rest),
                    Err(e) => println!("{}", e),
                }
            }
            "unban" if !rest.is_empty() => match posts.moderation().remove_word(rest).await {
                Ok(true) => println!("removed '{}'", rest),
                Ok(false) => println!("'{}' was not in the vocabulary", rest),
                Err(e) => tracing::error!("Vocabulary unavailable: {}", e),
            },
            "words" => match posts.moderation().list_words().await {
                Ok(words) => {
                    for w in &words {
                        println!("{} ({})", w.word, w.word_type);
                    }
                    println!("{} words", words.len());
                }
                Err(e) => tracing::error!("Vocabulary unavailable: {}", e),
            },
            "follow" => match parse_pair(rest) {
                Some((user, author)) => match follows.follow(user, author).await {
                    Ok(true) => println!("{} now follows {}", user, author),
                    Ok(false) => println!("{} already follows {}", user, author),
                    Err(FollowError::SelfFollow) => println!("users cannot follow themselves"),
                    Err(e) => tracing::error!("Follow failed: {}", e),
                },
                None => println!("usage: follow <user> <author>"),
            },
            "unfollow" => match parse_pair(rest) {
                Some((user, author)) => match follows.unfollow(user, author).await {
                    Ok(true) => println!("{} unfollowed {}", user, author),
                    Ok(false) => println!("{} was not following {}", user, author),
                    Err(e) => tracing::error!("Unfollow failed: {}", e),
                },
                None => println!("usage: unfollow <user> <author>"),
            },
            "followers" => match rest.parse::<u64>() {
                Ok(author) => match follows.followers(author).await {
                    Ok(users) => println!("{:?}", users),
                    Err(e) => tracing::error!("Followers unavailable: {}", e),
                },
                Err(_) => println!("usage: followers <author>"),
            },
            "feed" => match rest.parse::<u64>() {
                Ok(user) => {
                    let result: Result<(), PostError> = async {
                        let authors = follows
                            .following(user)
                            .await
                            .map_err(|e| PostError::StorageError(e.to_string()))?;
                        let feed = posts.feed(&authors, 10).await?;
                        print_posts(&feed);
                        Ok(())
                    }
                    .await;
                    if let Err(e) = result {
                        tracing::error!("Feed unavailable: {}", e);
                    }
                }
                Err(_) => println!("usage: feed <user>"),
            },
            "recent" => match posts.recent_posts(10).await {
                Ok(latest) => print_posts(&latest),
                Err(e) => tracing::error!("Posts unavailable: {}", e),
            },
            "author" => match rest.parse::<u64>() {
                Ok(author) => match posts.author_posts(author, 10).await {
                    Ok(theirs) => print_posts(&theirs),
                    Err(e) => tracing::error!("Posts unavailable: {}", e),
                },
                Err(_) => println!("usage: author <id>"),
            },
            "show" => match rest.parse::<u64>() {
                Ok(post_id) => match posts.post_detail(post_id).await {
                    Ok((post, comments)) => {
                        println!("#{} by {}: {}", post.id, post.author_id, post.text);
                        for c in &comments {
                            println!("  {} says: {}", c.author_id, c.text);
                        }
                    }
                    Err(PostError::PostNotFound(_)) => println!("no post {}", post_id),
                    Err(e) => tracing::error!("Post unavailable: {}", e),
                },
                Err(_) => println!("usage: show <post>"),
            },
            "comment" => {
                let parsed = rest
                    .split_once(' ')
                    .and_then(|(id, text)| id.parse::<u64>().ok().map(|id| (id, text.trim())));
                match parsed {
                    Some((post_id, text)) if !text.is_empty() => {
                        match posts.add_comment(DEMO_AUTHOR_ID, post_id, text).await {
                            Ok(comment) => println!("comment {} added", comment.id),
                            Err(PostError::PostNotFound(_)) => println!("no post {}", post_id),
                            Err(e) => tracing::error!("Comment failed: {}", e),
                        }
                    }
                    _ => println!("usage: comment <post> <text>"),
                }
            }
            "newgroup" => match rest.split_once(' ') {
                Some((slug, title)) if !title.trim().is_empty() => {
                    match posts.create_group(title.trim(), slug, "").await {
                        Ok(group) => println!("created group '{}' (id {})", group.slug, group.id),
                        Err(PostError::DuplicateSlug(_)) => println!("slug '{}' is taken", slug),
                        Err(e) => tracing::error!("Group creation failed: {}", e),
                    }
                }
                _ => println!("usage: newgroup <slug> <title>"),
            },
            "group" if !rest.is_empty() => match posts.group_posts(rest, 10).await {
                Ok(grouped) => print_posts(&grouped),
                Err(PostError::GroupNotFound(_)) => println!("no group '{}'", rest),
                Err(e) => tracing::error!("Posts unavailable: {}", e),
            },
            "post" if !rest.is_empty() => submit(&posts, rest).await,
            "ban" | "unban" | "post" | "group" => println!("usage: {} <argument>", cmd),
            // Anything else is treated as post text.
            _ => submit(&posts, line).await,
        }
    }

    Ok(())
}
