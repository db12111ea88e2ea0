//! Blocking-from-the-caller's-perspective download helper with bounded
//! retries and SHA-1 verification, grounded on `kargo_maven::download` and
//! `kargo_maven::checksum` narrowed to the single hash kind the upstream
//! manifest always supplies (spec §4.5 supplement in SPEC_FULL §4.5).

use std::path::Path;
use std::time::Duration;

use dvh_util::errors::DvhError;
use dvh_util::hash::sha1_bytes;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Download `url`'s body, retrying on timeout/connect failures and 5xx
/// responses, and verifying the SHA-1 of the body against `expected_sha1`
/// when supplied.
pub async fn download_verified(
    client: &reqwest::Client,
    url: &str,
    expected_sha1: Option<&str>,
) -> Result<Vec<u8>, DvhError> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY * attempt).await;
        }

        match client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    continue;
                }
                if !status.is_success() {
                    return Err(DvhError::Network {
                        message: format!("HTTP {status} fetching {url}"),
                    });
                }
                let bytes = resp.bytes().await.map_err(|e| DvhError::Network {
                    message: format!("failed to read response body from {url}: {e}"),
                })?;
                let bytes = bytes.to_vec();
                if let Some(expected) = expected_sha1 {
                    let actual = sha1_bytes(&bytes);
                    if !actual.eq_ignore_ascii_case(expected) {
                        return Err(DvhError::Network {
                            message: format!(
                                "SHA-1 mismatch for {url}: expected {expected}, got {actual}"
                            ),
                        });
                    }
                }
                return Ok(bytes);
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = format!("{e}");
                continue;
            }
            Err(e) => {
                return Err(DvhError::Network {
                    message: format!("request to {url} failed: {e}"),
                });
            }
        }
    }

    Err(DvhError::Network {
        message: format!("failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    })
}

/// Download `url` to `dest` if `dest` is absent or its SHA-1 doesn't match
/// `expected_sha1` (when supplied). Writes atomically.
pub async fn ensure_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    expected_sha1: Option<&str>,
) -> Result<(), DvhError> {
    if dest.is_file() {
        if let Some(expected) = expected_sha1 {
            if dvh_util::hash::sha1_file(dest)
                .map(|actual| actual.eq_ignore_ascii_case(expected))
                .unwrap_or(false)
            {
                return Ok(());
            }
        } else {
            return Ok(());
        }
    }

    let bytes = download_verified(client, url, expected_sha1).await?;
    dvh_util::fs::write_atomic(dest, &bytes).map_err(DvhError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_mismatch_detection_is_case_insensitive() {
        let data = b"hello";
        let actual = sha1_bytes(data);
        assert!(actual.eq_ignore_ascii_case(&actual.to_uppercase()));
    }
}
