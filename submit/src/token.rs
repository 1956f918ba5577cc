//! Access-token refresh against the hub URL (§4.4 header assembly).
//!
//! The refresher's own protocol is an external collaborator per §1
//! ("the remote service's authentication token refresher, beyond the
//! header-construction rules"); this module implements just enough of it
//! to produce a bearer token when no offline token is configured.
//!

use serde::Deserialize;
use simrun_common::{ClientError, Result};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange the caller's `JPY_API_TOKEN` for a fresh access token at the
/// hub URL.
#[tracing::instrument(skip(client, jpy_token))]
pub async fn fetch_access_token(
    client: &reqwest::Client,
    hub_url: &str,
    jpy_token: &str,
) -> Result<String> {
    let resp = client
        .get(hub_url)
        .bearer_auth(jpy_token)
        .send()
        .await
        .map_err(|e| ClientError::RemoteUnavailable(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(ClientError::RemoteServerError(format!(
            "token refresh failed with HTTP {}",
            resp.status()
        )));
    }

    let body: TokenResponse = resp
        .json()
        .await
        .map_err(|e| ClientError::RemoteServerError(e.to_string()))?;
    Ok(body.access_token)
}
