//! Raw records and validation into posts

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{Author, Post};
use crate::config::CollectionConfig;
use crate::error::CollectionError;

/// Tags arrive as a list, as one label, or as a comma-separated line
/// (`tags: rust, wasm`). Pieces are split here; trimming and case are left to
/// normalization.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};

    struct TagList;

    impl<'de> Visitor<'de> for TagList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a tag, a comma-separated line of tags, or a list of tags")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.split(',').map(str::to_string).collect())
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut tags = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(tag) = seq.next_element::<String>()? {
                tags.push(tag);
            }
            Ok(tags)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(TagList)
}

/// Ids are strings, but YAML and hand-written JSON often carry bare numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

/// A candidate record as supplied by a content loader. Every field is optional;
/// [`RawRecord::validate`] decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(alias = "read_time")]
    pub read_time: Option<String>,
    pub image: Option<String>,
    pub author: Option<RawAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAuthor {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Every reason a record was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// The record's id, when it had a usable one
    pub id: Option<String>,
    pub reasons: Vec<String>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {}: {}",
            self.id.as_deref().unwrap_or("<no id>"),
            self.reasons.join("; ")
        )
    }
}

impl From<ValidationFailure> for CollectionError {
    fn from(failure: ValidationFailure) -> Self {
        CollectionError::Validation {
            id: failure.id.unwrap_or_default(),
            reasons: failure.reasons,
        }
    }
}

/// Returns the trimmed value if it is present and not blank
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RawRecord {
    /// The record's id, trimmed, if it has a non-blank one
    pub fn id(&self) -> Option<&str> {
        non_blank(&self.id)
    }

    /// Validate with default tag normalization
    pub fn validate(&self) -> Result<Post, ValidationFailure> {
        self.validate_with(&CollectionConfig::default())
    }

    /// Validate into a [`Post`], collecting every violated field
    pub fn validate_with(&self, config: &CollectionConfig) -> Result<Post, ValidationFailure> {
        let mut reasons = Vec::new();

        let id = self.id();
        if id.is_none() {
            reasons.push("id is required".to_string());
        }

        let title = non_blank(&self.title);
        if title.is_none() {
            reasons.push("title is required".to_string());
        }

        // Content is opaque, so only presence is checked
        let content = self.content.as_deref().filter(|c| !c.trim().is_empty());
        if content.is_none() {
            reasons.push("content is required".to_string());
        }

        let date = match non_blank(&self.date) {
            None => {
                reasons.push("date is required".to_string());
                None
            }
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    reasons.push(format!("date '{}' is not a valid calendar date", raw));
                }
                parsed
            }
        };

        let author_name = self.author.as_ref().and_then(|a| non_blank(&a.name));
        if author_name.is_none() {
            reasons.push("author.name is required".to_string());
        }

        if self.read_time.is_some() && non_blank(&self.read_time).is_none() {
            reasons.push("readTime must not be blank".to_string());
        }

        let (Some(id), Some(title), Some(content), Some(date), Some(author_name)) =
            (id, title, content, date, author_name)
        else {
            return Err(ValidationFailure {
                id: id.map(str::to_string),
                reasons,
            });
        };
        if !reasons.is_empty() {
            return Err(ValidationFailure {
                id: Some(id.to_string()),
                reasons,
            });
        }

        let mut author = Author::new(author_name);
        author.avatar = self
            .author
            .as_ref()
            .and_then(|a| non_blank(&a.avatar))
            .map(str::to_string);

        let mut post = Post::new(id, title, date, author);
        post.excerpt = self.excerpt.as_deref().unwrap_or_default().trim().to_string();
        post.content = content.to_string();
        post.tags = normalize_tags(&self.tags, config);
        post.read_time = non_blank(&self.read_time).map(str::to_string);
        post.image = non_blank(&self.image).map(str::to_string);

        Ok(post)
    }
}

fn normalize_tags(raw: &[String], config: &CollectionConfig) -> IndexSet<String> {
    raw.iter().filter_map(|t| config.normalize_tag(t)).collect()
}

/// Parse a date string in various formats, keeping only the calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    // Try RFC 3339 / ISO 8601 with offset first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> serde_json::Value {
        serde_json::json!({
            "id": "1",
            "title": "Building a Modern React Application: A Complete Guide",
            "excerpt": "Learn how to build a production-ready React application.",
            "content": "<article><h1>Building a Modern React Application</h1></article>",
            "date": "2024-03-15",
            "tags": ["react", "typescript", "tutorial"],
            "readTime": "12 min read",
            "image": "https://images.unsplash.com/photo-1555066931-4365d14bab8c",
            "author": {
                "name": "Baha",
                "avatar": "https://avatars.githubusercontent.com/u/91181868?v=4"
            }
        })
    }

    #[test]
    fn test_validate_full_record() {
        let raw: RawRecord = serde_json::from_value(valid_json()).unwrap();
        let post = raw.validate().unwrap();
        assert_eq!(post.id, "1");
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(post.tags.len(), 3);
        assert_eq!(post.read_time.as_deref(), Some("12 min read"));
        assert_eq!(post.author.name, "Baha");
        assert!(post.author.avatar.is_some());
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let raw = RawRecord::default();
        let failure = raw.validate().unwrap_err();
        assert_eq!(failure.id, None);
        assert_eq!(
            failure.reasons,
            vec![
                "id is required",
                "title is required",
                "content is required",
                "date is required",
                "author.name is required",
            ]
        );
    }

    #[test]
    fn test_invalid_date_is_a_failure() {
        let mut json = valid_json();
        json["date"] = serde_json::json!("2024-02-30");
        json["readTime"] = serde_json::json!("  ");
        let raw: RawRecord = serde_json::from_value(json).unwrap();
        let failure = raw.validate().unwrap_err();
        assert_eq!(failure.id.as_deref(), Some("1"));
        assert_eq!(failure.reasons.len(), 2);
        assert!(failure.reasons[0].contains("2024-02-30"));
        assert_eq!(failure.reasons[1], "readTime must not be blank");
    }

    #[test]
    fn test_tags_default_and_dedupe() {
        let mut json = valid_json();
        json.as_object_mut().unwrap().remove("tags");
        let raw: RawRecord = serde_json::from_value(json).unwrap();
        assert!(raw.validate().unwrap().tags.is_empty());

        let raw = RawRecord {
            tags: vec!["React".into(), "react".into(), " ".into(), "vue".into()],
            ..serde_json::from_value(valid_json()).unwrap()
        };
        let tags: Vec<_> = raw.validate().unwrap().tags.into_iter().collect();
        assert_eq!(tags, vec!["react", "vue"]);
    }

    #[test]
    fn test_yaml_record_with_numeric_id_and_single_tag() {
        let yaml = r#"
id: 42
title: Hello
content: "<p>hi</p>"
date: 2024/01/05 10:30
tags: Rust
read_time: 3 min read
author:
  name: Someone
"#;
        let raw: RawRecord = serde_yaml::from_str(yaml).unwrap();
        let post = raw.validate().unwrap();
        assert_eq!(post.id, "42");
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(post.has_tag("rust"));
        assert_eq!(post.read_time.as_deref(), Some("3 min read"));
    }

    #[test]
    fn test_tags_from_comma_separated_line() {
        let mut json = valid_json();
        json["tags"] = serde_json::json!("React, typescript,, tutorial ");
        let raw: RawRecord = serde_json::from_value(json).unwrap();
        let tags: Vec<_> = raw.validate().unwrap().tags.into_iter().collect();
        assert_eq!(tags, vec!["react", "typescript", "tutorial"]);

        let raw: RawRecord = serde_yaml::from_str("tags: ~").unwrap();
        assert!(raw.tags.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("2024/03/15"), expected);
        assert_eq!(parse_date("2024-03-15 08:00:00"), expected);
        assert_eq!(parse_date("2024-03-15T08:00:00"), expected);
        assert_eq!(parse_date("2024-03-15T08:00:00+02:00"), expected);
        assert_eq!(parse_date("March 15"), None);
        assert_eq!(parse_date(""), None);
    }
}
