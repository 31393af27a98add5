//! GCP Cloud KMS adapter: `:encrypt`/`:decrypt` on a crypto key.

use crate::credentials::GcpCredentials;
use crate::error::{KmsError, KmsResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fieldseal_crypto::DataKey;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://cloudkms.googleapis.com";

#[derive(Deserialize)]
struct EncryptResponse {
    ciphertext: String,
}

#[derive(Deserialize)]
struct DecryptResponse {
    plaintext: String,
}

fn key_url(endpoint: Option<&str>, project_id: &str, location: &str, key_ring: &str, key_name: &str, op: &str) -> String {
    let base = endpoint.unwrap_or(DEFAULT_ENDPOINT).trim_end_matches('/');
    format!(
        "{base}/v1/projects/{project_id}/locations/{location}/keyRings/{key_ring}/cryptoKeys/{key_name}:{op}"
    )
}

async fn post(
    http: &Client,
    credentials: &GcpCredentials,
    url: &str,
    body: serde_json::Value,
) -> KmsResult<reqwest::Response> {
    let resp = http
        .post(url)
        .bearer_auth(&credentials.access_token)
        .json(&body)
        .send()
        .await?;

    if resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::FORBIDDEN {
        return Err(KmsError::Auth(format!(
            "GCP Cloud KMS rejected the request: HTTP {}",
            resp.status()
        )));
    }

    resp.error_for_status()
        .map_err(|e| KmsError::Response(format!("GCP Cloud KMS request failed: {e}")))
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn wrap(
    http: &Client,
    credentials: &GcpCredentials,
    project_id: &str,
    location: &str,
    key_ring: &str,
    key_name: &str,
    endpoint: Option<&str>,
    dek: &DataKey,
) -> KmsResult<Vec<u8>> {
    let url = key_url(endpoint, project_id, location, key_ring, key_name, "encrypt");
    let resp = post(
        http,
        credentials,
        &url,
        serde_json::json!({ "plaintext": STANDARD.encode(dek.as_bytes()) }),
    )
    .await?;

    let body: EncryptResponse = resp
        .json()
        .await
        .map_err(|e| KmsError::Response(format!("GCP encrypt response unreadable: {e}")))?;

    debug!("wrapped data key under GCP Cloud KMS key {key_name}");
    STANDARD
        .decode(&body.ciphertext)
        .map_err(|e| KmsError::Response(format!("GCP returned invalid base64: {e}")))
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn unwrap(
    http: &Client,
    credentials: &GcpCredentials,
    project_id: &str,
    location: &str,
    key_ring: &str,
    key_name: &str,
    endpoint: Option<&str>,
    wrapped: &[u8],
) -> KmsResult<DataKey> {
    let url = key_url(endpoint, project_id, location, key_ring, key_name, "decrypt");
    let resp = post(
        http,
        credentials,
        &url,
        serde_json::json!({ "ciphertext": STANDARD.encode(wrapped) }),
    )
    .await?;

    let body: DecryptResponse = resp
        .json()
        .await
        .map_err(|e| KmsError::Response(format!("GCP decrypt response unreadable: {e}")))?;

    let material = STANDARD
        .decode(&body.plaintext)
        .map_err(|e| KmsError::Response(format!("GCP returned invalid base64: {e}")))?;

    debug!("unwrapped data key via GCP Cloud KMS key {key_name}");
    Ok(DataKey::try_from_slice(&material)?)
}
