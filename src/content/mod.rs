//! Content module - post records, validation, and loading

pub mod loader;
mod post;
mod record;

pub use post::{Author, Post};
pub use record::{parse_date, RawAuthor, RawRecord, ValidationFailure};
