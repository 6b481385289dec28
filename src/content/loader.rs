//! Content loader - reads raw post records from the source directory

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::RawRecord;
use crate::Postdex;

/// A raw record together with the file it came from
#[derive(Debug, Clone)]
pub struct SourcedRecord {
    /// Source file path relative to the source directory
    pub source: String,
    pub record: RawRecord,
}

/// A file (or one entry of a file) that could not be turned into a raw record
#[derive(Debug, Clone, Serialize)]
pub struct LoadError {
    pub source: String,
    pub message: String,
}

/// Everything read from the source directory
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub records: Vec<SourcedRecord>,
    pub errors: Vec<LoadError>,
}

impl LoadedRecords {
    /// The raw records in load order, ready for ingestion
    pub fn raw(&self) -> Vec<RawRecord> {
        self.records.iter().map(|r| r.record.clone()).collect()
    }
}

/// Loads records from `*.json`, `*.yaml` and `*.yml` files under the source directory
pub struct ContentLoader {
    source_dir: PathBuf,
    skip: Vec<glob::Pattern>,
}

impl ContentLoader {
    /// Create a loader for a site
    pub fn new(app: &Postdex) -> Result<Self> {
        Self::with_skip(&app.source_dir, &app.config.skip)
    }

    /// Create a loader for a directory, ignoring files that match any of `skip`
    pub fn with_skip<P: AsRef<Path>>(source_dir: P, skip: &[String]) -> Result<Self> {
        let skip = skip
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid skip pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            skip,
        })
    }

    /// The directory this loader reads from
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Load every record file. A missing source directory yields nothing.
    pub fn load(&self) -> LoadedRecords {
        let mut loaded = LoadedRecords::default();
        if !self.source_dir.exists() {
            tracing::debug!("Source directory {:?} does not exist", self.source_dir);
            return loaded;
        }

        for entry in WalkDir::new(&self.source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || record_format(path).is_none() {
                continue;
            }

            let source = path
                .strip_prefix(&self.source_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            if self.skip.iter().any(|p| p.matches(&source)) {
                tracing::debug!("Skipping {}", source);
                continue;
            }

            match self.load_file(path, &source) {
                Ok((records, errors)) => {
                    tracing::debug!("Loaded {} record(s) from {}", records.len(), source);
                    loaded.records.extend(records);
                    loaded.errors.extend(errors);
                }
                Err(e) => {
                    tracing::warn!("Failed to load {:?}: {}", path, e);
                    loaded.errors.push(LoadError {
                        source,
                        message: e.to_string(),
                    });
                }
            }
        }

        loaded
    }

    /// Load one file holding either a single record or an array of records
    fn load_file(&self, path: &Path, source: &str) -> Result<(Vec<SourcedRecord>, Vec<LoadError>)> {
        let text = fs::read_to_string(path)?;
        let entries = match record_format(path) {
            Some(Format::Json) => parse_json(&text)?,
            Some(Format::Yaml) => parse_yaml(&text)?,
            None => Vec::new(),
        };

        let mut records = Vec::new();
        let mut errors = Vec::new();
        for (i, entry) in entries.into_iter().enumerate() {
            match entry {
                Ok(record) => records.push(SourcedRecord {
                    source: source.to_string(),
                    record,
                }),
                Err(message) => {
                    tracing::warn!("Skipping entry #{} in {}: {}", i, source, message);
                    errors.push(LoadError {
                        source: format!("{}#{}", source, i),
                        message,
                    });
                }
            }
        }
        Ok((records, errors))
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Json,
    Yaml,
}

fn record_format(path: &Path) -> Option<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(Format::Json),
        Some("yaml") | Some("yml") => Some(Format::Yaml),
        _ => None,
    }
}

type Entry = std::result::Result<RawRecord, String>;

fn parse_json(text: &str) -> Result<Vec<Entry>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(|e| e.to_string()))
        .collect())
}

fn parse_yaml(text: &str) -> Result<Vec<Entry>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    let items = match value {
        serde_yaml::Value::Sequence(items) => items,
        serde_yaml::Value::Null => Vec::new(),
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .map(|v| serde_yaml::from_value(v).map_err(|e| e.to_string()))
        .collect())
}
