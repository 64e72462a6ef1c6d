// Configuration: TOML file, environment overrides, CLI overrides

pub mod loader;
pub mod merger;

pub use loader::{ConfigLoader, LlmConfig, PrdRailsConfig, Sampling, ServerConfig, StorageConfig};
pub use merger::{ConfigMerger, PartialConfig};

use anyhow::Result;
use std::path::Path;

/// Load the effective configuration: file (explicit or global), then
/// environment, then CLI overrides
pub fn load_config(path: Option<&Path>, cli: PartialConfig) -> Result<PrdRailsConfig> {
    let loader = match path {
        Some(p) => ConfigLoader::with_path(p),
        None => ConfigLoader::new(),
    };

    let file = loader.load()?;
    if file.is_none() {
        log::debug!("No config file found at {:?}, using defaults", loader.config_path());
    }

    let merged = ConfigMerger::new()
        .with_file(file)
        .with_env(Some(PartialConfig::from_env()?))
        .with_cli(Some(cli))
        .merge();

    loader::validate_config(&merged)?;
    Ok(merged)
}
