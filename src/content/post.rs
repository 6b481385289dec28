//! Post and Author models

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A validated blog post
///
/// Posts are immutable once created. An edit is a new `Post` under the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier within a collection
    pub id: String,

    /// Post title
    pub title: String,

    /// URL-friendly form of the title
    pub slug: String,

    /// Short summary shown in listings
    pub excerpt: String,

    /// Formatted body, kept as an opaque payload
    pub content: String,

    /// Publication date
    pub date: NaiveDate,

    /// Normalized tag labels, first-seen order, no duplicates
    pub tags: IndexSet<String>,

    /// Advisory display string such as "12 min read"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,

    /// Cover image URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub author: Author,
}

/// Post author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,

    /// Avatar URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Post {
    /// Create a post with the required fields; optional fields start empty
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
        author: Author,
    ) -> Self {
        let title = title.into();
        let slug = slug::slugify(&title);
        Self {
            id: id.into(),
            title,
            slug,
            excerpt: String::new(),
            content: String::new(),
            date,
            tags: IndexSet::new(),
            read_time: None,
            image: None,
            author,
        }
    }

    /// Whether the post carries the given (already normalized) tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Case-insensitive substring match over title and excerpt.
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.excerpt.to_lowercase().contains(needle)
    }
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut post = Post::new(
            "1",
            "Building a Modern React Application",
            date,
            Author::new("Baha"),
        );
        post.excerpt = "Learn how to build a production-ready app".to_string();
        post.tags.insert("react".to_string());
        post
    }

    #[test]
    fn test_new_derives_slug() {
        let post = sample();
        assert_eq!(post.slug, "building-a-modern-react-application");
        assert!(post.has_tag("react"));
        assert!(!post.has_tag("vue"));
    }

    #[test]
    fn test_matches_text() {
        let post = sample();
        assert!(post.matches_text("modern react"));
        assert!(post.matches_text("production-ready"));
        assert!(!post.matches_text("svelte"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut post = sample();
        post.read_time = Some("12 min read".to_string());
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["readTime"], "12 min read");
        assert_eq!(json["date"], "2024-03-15");
        assert_eq!(json["tags"], serde_json::json!(["react"]));
        assert!(json.get("image").is_none());
    }
}
