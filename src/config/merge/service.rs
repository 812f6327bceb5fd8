//! MergeService: orchestrates sources, applies merge policy, deserializes to SatchelConfig.

use crate::config::sources::{environment, global_file, workdir_file};
use crate::config::SatchelConfig;
use config::{ConfigError, File};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from the standard sources.
    /// Precedence: defaults (lowest) -> global file -> workdir file -> environment (highest).
    pub fn load(workdir: &Path) -> Result<SatchelConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workdir_file::add_to_builder(builder, workdir)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// Load config from one explicit file with the environment overlay.
    /// The file must exist.
    pub fn load_from_file(path: &Path) -> Result<SatchelConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
