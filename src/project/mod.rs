//! Project layer: level sources on disk.
//!
//! [`file_loader`] finds, reads and parses files; [`BatchConverter`] groups
//! them by level, runs the pipeline and writes the augmented `.java` files.

mod batch;
mod error;
pub mod file_loader;

pub use batch::{BatchConverter, ConvertOptions, LevelReport, ProjectReport};
pub use error::ProjectError;
pub use file_loader::{collect_source_paths, level_of, load_sources, parse_sources};
