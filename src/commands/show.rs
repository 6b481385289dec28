//! Show a single post

use anyhow::Result;

use super::post_line;
use crate::Postdex;

const RELATED_LIMIT: usize = 5;

/// Print one post's metadata, its neighbors, and related posts.
/// `key` is matched against ids first, then slugs.
pub fn run(app: &Postdex, key: &str) -> Result<()> {
    let opened = app.open()?;
    let store = &opened.store;

    let post = store
        .get(key)
        .or_else(|| store.find_by_slug(key))
        .ok_or_else(|| anyhow::anyhow!("No post with id or slug: {}", key))?;

    println!("{}", post.title);
    println!("  id:        {}", post.id);
    println!("  slug:      {}", post.slug);
    println!("  date:      {}", post.date.format(&app.config.date_format));
    println!("  author:    {}", post.author.name);
    if let Some(read_time) = &post.read_time {
        println!("  read time: {}", read_time);
    }
    if !post.tags.is_empty() {
        let tags: Vec<_> = post.tags.iter().cloned().collect();
        println!("  tags:      {}", tags.join(", "));
    }
    if !post.excerpt.is_empty() {
        println!("  excerpt:   {}", post.excerpt);
    }

    if let Some((newer, older)) = store.neighbors(&post.id) {
        if let Some(newer) = newer {
            println!("Newer: {}", post_line(app, &newer));
        }
        if let Some(older) = older {
            println!("Older: {}", post_line(app, &older));
        }
    }

    let related = store.related(&post.id, RELATED_LIMIT);
    if !related.is_empty() {
        println!("Related:");
        for p in related {
            println!("  {}", post_line(app, &p));
        }
    }

    Ok(())
}
