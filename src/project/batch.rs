//! Converting files on disk.
//!
//! Inputs are grouped by level (extension, unless the options force one)
//! and each group runs as its own batch. Clean files get their augmented
//! source written next to them.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::ProjectError;
use super::file_loader::{collect_source_paths, load_sources, parse_sources, require_level};
use crate::hir::pipeline::{ConversionResult, Converter, SourceInput};
use crate::levels::{Level, OUTPUT_EXTENSION};

/// How a batch on disk is converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Convert every file at this level regardless of its extension.
    pub level: Option<Level>,
    /// Write augmented sources to disk.
    pub write_outputs: bool,
    /// Extension of written files.
    pub output_extension: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            level: None,
            write_outputs: true,
            output_extension: OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl ConvertOptions {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.write_outputs = false;
        self
    }

    pub fn output_path(&self, input: &Path) -> PathBuf {
        input.with_extension(&self.output_extension)
    }
}

/// Outcome of one level group.
#[derive(Debug, Clone)]
pub struct LevelReport {
    pub level: Level,
    pub result: ConversionResult,
}

/// Outcome of a whole on-disk conversion.
#[derive(Debug, Clone, Default)]
pub struct ProjectReport {
    /// One entry per level present, most restrictive first.
    pub levels: Vec<LevelReport>,
    /// Files written, in the order they were written.
    pub written: Vec<PathBuf>,
}

impl ProjectReport {
    pub fn is_success(&self) -> bool {
        self.levels.iter().all(|r| r.result.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.levels.iter().map(|r| r.result.failure_count()).sum()
    }

    /// Every rendered failure, grouped by level.
    pub fn render_failures(&self) -> Vec<String> {
        self.levels
            .iter()
            .flat_map(|r| r.result.render_failures())
            .collect()
    }

    pub fn result_for(&self, level: Level) -> Option<&ConversionResult> {
        self.levels
            .iter()
            .find(|r| r.level == level)
            .map(|r| &r.result)
    }
}

/// Converts directories and file lists.
#[derive(Debug, Clone, Default)]
pub struct BatchConverter {
    options: ConvertOptions,
}

impl BatchConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert every level source file below `dir`.
    pub fn convert_directory(&self, dir: &Path) -> Result<ProjectReport, ProjectError> {
        let paths = collect_source_paths(dir)?;
        self.convert_paths(&paths)
    }

    /// Convert the given files. Without a level override every path must
    /// carry a level extension.
    pub fn convert_paths(&self, paths: &[PathBuf]) -> Result<ProjectReport, ProjectError> {
        let inputs = load_sources(paths)?;
        self.convert_inputs(inputs)
    }

    /// Convert sources already in memory, writing outputs if enabled.
    pub fn convert_inputs(&self, inputs: Vec<SourceInput>) -> Result<ProjectReport, ProjectError> {
        let mut groups: IndexMap<Level, Vec<SourceInput>> = IndexMap::new();
        for input in inputs {
            let level = match self.options.level {
                Some(level) => level,
                None => require_level(&input.path)?,
            };
            groups.entry(level).or_default().push(input);
        }
        groups.sort_keys();

        let mut report = ProjectReport::default();
        for (level, inputs) in groups {
            info!("converting {} {} files", inputs.len(), level);
            let batch = parse_sources(&inputs);
            let result = Converter::new(level).convert_parsed(
                batch.files,
                batch.units,
                batch.parse_failures,
            )?;
            if self.options.write_outputs {
                self.write_outputs(&result, &mut report.written)?;
            }
            report.levels.push(LevelReport { level, result });
        }
        Ok(report)
    }

    fn write_outputs(
        &self,
        result: &ConversionResult,
        written: &mut Vec<PathBuf>,
    ) -> Result<(), ProjectError> {
        for (input, text) in &result.outputs {
            let target = self.options.output_path(input);
            if &target == input {
                warn!("not overwriting input '{}'", input.display());
                continue;
            }
            debug!("writing '{}'", target.display());
            fs::write(&target, text).map_err(|source| ProjectError::Write {
                path: target.clone(),
                source,
            })?;
            written.push(target);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/tests_batch.rs"]
mod tests;
