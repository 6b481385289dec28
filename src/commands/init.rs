//! Initialize a new collection

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILE;

const CONFIG_TEMPLATE: &str = r#"# postdex configuration

# Collection
title: Posts

# Directory holding *.json / *.yaml / *.yml record files
source_dir: source
# Glob patterns (relative to source_dir) to ignore
skip: []

# Tags
lowercase_tags: true
tag_map: {}

# Display
date_format: "%Y-%m-%d"

# Pagination
per_page: 10
"#;

/// The sample post written to a new collection
pub(crate) fn seed_records() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "1",
            "title": "Building a Modern React Application: A Complete Guide",
            "excerpt": "Learn how to build a production-ready React application with TypeScript, Tailwind CSS, and best practices for 2024.",
            "content": "<article class=\"prose prose-invert prose-blue max-w-none\">\n  <h1>Building a Modern React Application</h1>\n  <p class=\"lead\">In this comprehensive guide, we'll walk through building a modern React application from scratch.</p>\n  <h2>Getting Started</h2>\n  <ul>\n    <li>Node.js (version 18 or higher)</li>\n    <li>npm or yarn package manager</li>\n  </ul>\n  <h2>Project Setup</h2>\n  <pre><code>npm create vite@latest my-app -- --template react-ts</code></pre>\n</article>\n",
            "date": "2024-03-15",
            "tags": ["react", "typescript", "tutorial"],
            "readTime": "12 min read",
            "image": "https://images.unsplash.com/photo-1555066931-4365d14bab8c?auto=format&fit=crop&w=1600&q=80",
            "author": {
                "name": "Baha",
                "avatar": "https://avatars.githubusercontent.com/u/91181868?v=4"
            }
        }
    ])
}

/// Initialize a new collection in the given directory
pub fn init_collection(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("Collection already initialized: {:?}", config_path);
    }

    fs::create_dir_all(target_dir.join("source"))?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;

    let seed_path = target_dir.join("source").join("posts.json");
    if !seed_path.exists() {
        fs::write(&seed_path, serde_json::to_string_pretty(&seed_records())?)?;
        tracing::debug!("Wrote seed records to {:?}", seed_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Postdex;

    #[test]
    fn test_init_creates_loadable_collection() {
        let dir = tempfile::tempdir().unwrap();
        init_collection(dir.path()).unwrap();

        let app = Postdex::new(dir.path()).unwrap();
        assert_eq!(app.config.per_page, 10);

        let opened = app.open().unwrap();
        assert!(opened.report.is_clean());
        assert!(opened.load_errors.is_empty());
        assert_eq!(opened.store.len(), 1);
        let post = opened.store.get("1").unwrap();
        assert_eq!(post.read_time.as_deref(), Some("12 min read"));

        assert!(init_collection(dir.path()).is_err());
    }
}
