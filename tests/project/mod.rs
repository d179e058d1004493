//! Project layer tests: directories on disk.

pub mod tests_directory;
