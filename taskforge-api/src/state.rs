//! Shared application state for the API server.

use std::sync::Arc;

use anyhow::{Context, Result};

use taskforge::io::config::ForgeConfig;
use taskforge::io::data_dir::DataDir;
use taskforge::io::gateway::HttpGateway;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ForgeConfig>,
    pub gateway: Arc<HttpGateway>,
    pub data_dir: Arc<DataDir>,
}

impl AppState {
    /// Build state from configuration: resolve the credential, construct the
    /// gateway, and confine the read interface to the data root.
    pub fn from_config(config: ForgeConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        let gateway = HttpGateway::new(&config.endpoint, api_key, config.gateway_timeout())
            .context("build model gateway")?;
        let data_dir = DataDir::new(&config.data_root).context("open data root")?;
        Ok(Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            data_dir: Arc::new(data_dir),
        })
    }
}
