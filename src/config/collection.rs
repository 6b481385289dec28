//! Collection configuration (postdex.yml)

use anyhow::Result;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the configuration file in the base directory
pub const CONFIG_FILE: &str = "postdex.yml";

/// Main collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Display name of the collection
    pub title: String,

    // Directory
    pub source_dir: String,
    /// Glob patterns (relative to `source_dir`) the loader ignores
    #[serde(default)]
    pub skip: Vec<String>,

    // Tags
    pub lowercase_tags: bool,
    /// Alias -> canonical tag
    #[serde(default)]
    pub tag_map: HashMap<String, String>,

    // Display
    pub date_format: String,

    // Pagination
    pub per_page: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            title: "Posts".to_string(),
            source_dir: "source".to_string(),
            skip: Vec::new(),
            lowercase_tags: true,
            tag_map: HashMap::new(),
            date_format: "%Y-%m-%d".to_string(),
            per_page: 10,
            extra: HashMap::new(),
        }
    }
}

impl CollectionConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        // An empty file is valid and means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: CollectionConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Reject settings that would only fail later, mid-output
    pub fn validate(&self) -> Result<()> {
        let bad_format =
            StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error));
        if bad_format {
            anyhow::bail!("Invalid date_format: {}", self.date_format);
        }
        if self.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }
        Ok(())
    }

    /// Normalize a raw tag label: trim, optionally lowercase, then apply `tag_map`.
    ///
    /// Returns `None` for labels that are empty after trimming.
    pub fn normalize_tag(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let label = if self.lowercase_tags {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        };
        let mapped = self
            .tag_map
            .get(&label)
            .or_else(|| self.tag_map.get(trimmed))
            .cloned()
            .unwrap_or(label);
        Some(mapped)
    }
}
