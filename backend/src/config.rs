//! Environment-derived configuration.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ARKIV_RPC_URL: &str = "https://mendoza.hoodi.arkiv.network/rpc";
pub const DEFAULT_IPFS_API_URL: &str = "http://127.0.0.1:5001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub arkiv_rpc_url: String,
    pub arkiv_ws_url: Option<String>,
    pub arkiv_private_key: String,
    pub ipfs_api_url: String,
    pub storacha_space_did: Option<String>,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// `ARKIV_PRIVATE_KEY` is required; every other variable has a default
    /// or is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
                var: "PORT",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let arkiv_private_key = std::env::var("ARKIV_PRIVATE_KEY")
            .map_err(|_| ConfigError::MissingVar("ARKIV_PRIVATE_KEY"))?;

        Ok(Self {
            port,
            arkiv_rpc_url: std::env::var("ARKIV_RPC_URL")
                .unwrap_or_else(|_| DEFAULT_ARKIV_RPC_URL.to_string()),
            arkiv_ws_url: std::env::var("ARKIV_WS_URL").ok(),
            arkiv_private_key,
            ipfs_api_url: std::env::var("IPFS_API_URL")
                .unwrap_or_else(|_| DEFAULT_IPFS_API_URL.to_string()),
            storacha_space_did: std::env::var("STORACHA_SPACE_DID").ok(),
        })
    }
}
