//! List collection content

use anyhow::Result;

use super::post_line;
use crate::Postdex;

/// List collection content by type
pub fn run(app: &Postdex, content_type: &str) -> Result<()> {
    let opened = app.open()?;
    let snapshot = opened.store.snapshot();
    let indices = snapshot.indices();

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", snapshot.len());
            for id in indices.ids_by_date() {
                if let Some(post) = snapshot.get(id) {
                    println!("  {}", post_line(app, &post));
                }
            }
        }
        "tag" | "tags" => {
            let tags = indices.tag_counts();
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "author" | "authors" => {
            let authors = indices.author_counts();
            println!("Authors ({}):", authors.len());
            for (author, count) in authors {
                println!("  {} ({})", author, count);
            }
        }
        "archive" | "archives" => {
            let months = indices.archives();
            println!("Archives ({}):", months.len());
            for (month, count) in months {
                println!("  {} ({})", month, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, author, archive",
                content_type
            );
        }
    }

    Ok(())
}
