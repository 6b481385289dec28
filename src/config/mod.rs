//! Configuration module

mod collection;

pub use collection::CollectionConfig;
pub use collection::CONFIG_FILE;
