//! postdex: an indexed, validated in-memory collection of blog posts
//!
//! Raw records are loaded from JSON/YAML files, screened at ingestion, kept in
//! a [`store::CollectionStore`], and served through tag, author and date
//! indices by the query engine.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod index;
pub mod query;
pub mod store;

pub use error::{CollectionError, Result};

use std::path::{Path, PathBuf};

use content::loader::{ContentLoader, LoadError};
use store::{CollectionStore, IngestReport};

/// A collection rooted at a base directory
#[derive(Clone)]
pub struct Postdex {
    /// Collection configuration
    pub config: config::CollectionConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory the record files are read from
    pub source_dir: PathBuf,
}

/// A freshly loaded collection and everything that went wrong loading it
pub struct Opened {
    pub store: CollectionStore,
    pub report: IngestReport,
    pub load_errors: Vec<LoadError>,
}

impl Postdex {
    /// Create a new instance from a directory, reading `postdex.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            config::CollectionConfig::load(&config_path)?
        } else {
            config::CollectionConfig::default()
        };

        let source_dir = base_dir.join(&config.source_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
        })
    }

    /// Load every record file and ingest it into a new store
    pub fn open(&self) -> anyhow::Result<Opened> {
        let loaded = ContentLoader::new(self)?.load();
        let store = CollectionStore::with_config(self.config.clone());
        let report = store.ingest(&loaded.raw())?;
        Ok(Opened {
            store,
            report,
            load_errors: loaded.errors,
        })
    }
}
