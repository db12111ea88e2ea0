//! Shared HTTP client construction, mirroring `kargo_maven::download::build_client`.

use std::time::Duration;

use dvh_util::errors::DvhError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub fn build_client() -> miette::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent("dvh/0.1")
        .build()
        .map_err(|e| {
            DvhError::Network {
                message: format!("failed to create HTTP client: {e}"),
            }
            .into()
        })
}
