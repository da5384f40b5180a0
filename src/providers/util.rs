use anyhow::Result;
use std::time::Duration;

const USER_AGENT: &str = concat!("cryptoval/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client whose requests give up after `timeout`.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
