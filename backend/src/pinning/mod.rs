//! Optional Storacha pinning via its CLI.
//!
//! Used by the upload-and-register script only; the HTTP surface never
//! pins. The CLI prints a gateway URL for the pinned content, which is
//! scraped from stdout.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;

pub const GATEWAY_PREFIX: &str = "https://storacha.link/ipfs/";

#[derive(Debug, Error)]
pub enum PinningError {
    #[error("failed to launch storacha CLI: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("storacha up exited with status {0}")]
    ExitStatus(i32),
    #[error("no storacha gateway URL found in CLI output")]
    UrlNotFound,
}

/// Pins a local file with `storacha up` and returns its gateway URL.
pub async fn pin_file(path: &Path) -> Result<String, PinningError> {
    log::info!("Pinning {} with storacha", path.display());
    let output = Command::new("storacha").arg("up").arg(path).output().await?;
    if !output.status.success() {
        return Err(PinningError::ExitStatus(output.status.code().unwrap_or(-1)));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_gateway_url(&stdout).ok_or(PinningError::UrlNotFound)
}

/// Finds the first storacha gateway URL in CLI output.
pub fn parse_gateway_url(output: &str) -> Option<String> {
    for token in output.split_whitespace() {
        if let Some(rest) = token.strip_prefix(GATEWAY_PREFIX) {
            let cid: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if !cid.is_empty() {
                return Some(format!("{}{}", GATEWAY_PREFIX, cid));
            }
        }
    }
    None
}
