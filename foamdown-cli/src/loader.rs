//! Config and workspace loading shared by every command.

use anyhow::{Context, Result};
use foamdown_core::{Config, Indexer, Workspace};
use std::path::Path;

const DEFAULT_CONFIG: &str = "foamdown.yml";

/// Load the configuration.
///
/// An explicit path must exist. Without one, `./foamdown.yml` is used when
/// present, otherwise defaults rooted at the current directory.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => {
            tracing::info!("Loading config from {:?}", path);
            Config::from_file(path)
                .with_context(|| format!("Failed to load configuration {:?}", path))
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            Config::from_file(DEFAULT_CONFIG).context("Failed to load configuration")
        }
        None => Ok(Config::default()),
    }
}

/// Load config and index every file under the configured root
pub fn load_workspace(config_path: Option<&Path>) -> Result<(Config, Workspace)> {
    let config = load_config(config_path)?;
    let indexer = Indexer::from_config(&config);

    let mut workspace = Workspace::new();
    indexer
        .index(&mut workspace)
        .with_context(|| format!("Failed to index {:?}", indexer.root()))?;

    Ok((config, workspace))
}
