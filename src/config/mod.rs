mod types;

pub use types::*;

use crate::Result;
use std::path::Path;
use tracing::debug;

pub async fn load(config_path: impl AsRef<Path>) -> Result<Config> {
    let config_path = config_path.as_ref();

    debug!("Loading configuration from: {}", config_path.display());

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}
