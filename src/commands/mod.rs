//! CLI command implementations

pub mod check;
pub mod init;
pub mod list;
pub mod query;
pub mod show;
pub mod watch;

use crate::content::Post;
use crate::Postdex;

/// One-line summary of a post used by listings
pub(crate) fn post_line(app: &Postdex, post: &Post) -> String {
    let tags = if post.tags.is_empty() {
        String::new()
    } else {
        format!(
            " [{}]",
            post.tags.iter().cloned().collect::<Vec<_>>().join(", ")
        )
    };
    format!(
        "{} - {} ({}) by {}{}",
        post.date.format(&app.config.date_format),
        post.title,
        post.id,
        post.author.name,
        tags
    )
}
