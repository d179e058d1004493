//! Shared helpers for the integration tests.

pub mod conversion_helpers;
pub mod source_fixtures;
