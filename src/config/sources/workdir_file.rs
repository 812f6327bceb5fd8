//! Config file next to the working directory.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "satchel.toml";

pub fn path_in(workdir: &Path) -> PathBuf {
    workdir.join(FILE_NAME)
}

/// Optional `<workdir>/satchel.toml`
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workdir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(File::from(path_in(workdir)).required(false)))
}
