use crate::{
    Config, Result,
    proxy::{Fetcher, ProxyClient, Transport},
};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Fetcher,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let client = ProxyClient::new(&config.fetch)?;
        Self::with_transport(config, Arc::new(client))
    }

    /// Build state around a custom transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let fetcher = Fetcher::new(transport, &config.fetch)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }
}
