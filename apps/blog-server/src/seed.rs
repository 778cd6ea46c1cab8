//! Demo content for a fresh store.

use blogger_core::domain::{PageRequest, PostDraft, User};

use crate::middleware::error::AppResult;
use crate::state::AppState;

const DEMO_PASSWORD: &str = "top_secret";
const DEMO_USERS: [&str; 5] = ["edith", "norman", "harriet", "oscar", "maud"];
const POSTS_PER_AUTHOR: usize = 5;

const LOREM: [&str; 5] = [
    "Some days the light comes in sideways and everything looks new.",
    "I finally fixed the gate, and the neighbours' dog is not amused.",
    "Three cups of coffee in and the chapter is still not written.",
    "The market had fresh figs today, so dinner planned itself.",
    "A long walk by the river untangled most of this week.",
];

fn demo_post(username: &str, n: usize) -> PostDraft {
    let title = format!("{} on day {}", capitalize(username), n + 1);
    let content = (0..5)
        .map(|i| LOREM[(n + i) % LOREM.len()])
        .collect::<Vec<_>>()
        .join("\n\n");
    PostDraft::new(title, content)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Create 5 accounts with 5 posts each, and a comment from every author on
/// every post. Does nothing when the store already has posts or accounts
/// with the demo names.
pub async fn seed_demo_data(state: &AppState) -> AppResult<()> {
    let existing = state.content.list_posts(PageRequest::new(1, 1)).await?;
    if existing.total_items > 0 {
        tracing::info!(posts = existing.total_items, "Store not empty, skipping demo data");
        return Ok(());
    }
    for username in DEMO_USERS {
        if state.users.find_by_username(username).await?.is_some() {
            tracing::info!(username, "Demo account exists, skipping demo data");
            return Ok(());
        }
    }

    let mut authors = Vec::with_capacity(DEMO_USERS.len());
    for username in DEMO_USERS {
        let hash = state.passwords.hash(DEMO_PASSWORD)?;
        let user = state
            .users
            .insert(User::new(username.to_string(), hash))
            .await?;
        authors.push((username, state.authors.resolve_or_create(user.id).await?));
    }

    let mut posts = Vec::with_capacity(DEMO_USERS.len() * POSTS_PER_AUTHOR);
    for (username, author) in &authors {
        for n in 0..POSTS_PER_AUTHOR {
            posts.push(state.content.create_post(author, demo_post(username, n)).await?);
        }
    }

    for post in &posts {
        for (username, author) in &authors {
            let text = format!("Lovely read, from {}.", capitalize(username));
            state.content.add_comment(post, author, &text).await?;
        }
    }

    tracing::info!(
        users = authors.len(),
        posts = posts.len(),
        comments = posts.len() * authors.len(),
        "Demo data created"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_titles_are_distinct() {
        let mut slugs: Vec<String> = DEMO_USERS
            .iter()
            .flat_map(|u| (0..POSTS_PER_AUTHOR).map(move |n| demo_post(u, n)))
            .map(|d| blogger_core::domain::slugify(&d.title))
            .collect();
        slugs.sort();
        slugs.dedup();

        assert_eq!(slugs.len(), DEMO_USERS.len() * POSTS_PER_AUTHOR);
    }
}
