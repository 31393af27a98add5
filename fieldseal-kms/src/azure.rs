//! Azure Key Vault adapter: `wrapKey`/`unwrapKey` with RSA-OAEP-256.
//!
//! Each call performs a client-credentials token grant and then the key
//! operation — two HTTPS round trips, no token cached between calls.

use crate::credentials::AzureCredentials;
use crate::error::{KmsError, KmsResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use fieldseal_crypto::DataKey;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const API_VERSION: &str = "7.4";
const WRAP_ALGORITHM: &str = "RSA-OAEP-256";
const DEFAULT_IDENTITY_ENDPOINT: &str = "https://login.microsoftonline.com";
const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct KeyOperationResponse {
    /// Base64url, per the Key Vault REST contract.
    value: String,
}

async fn fetch_token(http: &Client, credentials: &AzureCredentials) -> KmsResult<String> {
    let base = credentials
        .identity_platform_endpoint
        .as_deref()
        .unwrap_or(DEFAULT_IDENTITY_ENDPOINT);
    let url = format!("{base}/{}/oauth2/v2.0/token", credentials.tenant_id);

    let resp = http
        .post(&url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", VAULT_SCOPE),
        ])
        .send()
        .await?;

    if resp.status() == StatusCode::UNAUTHORIZED
        || resp.status() == StatusCode::FORBIDDEN
        || resp.status() == StatusCode::BAD_REQUEST
    {
        return Err(KmsError::Auth(format!(
            "Azure token grant rejected for client {}: HTTP {}",
            credentials.client_id,
            resp.status()
        )));
    }

    let resp = resp
        .error_for_status()
        .map_err(|e| KmsError::Response(format!("Azure token grant failed: {e}")))?;

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| KmsError::Response(format!("Azure token response unreadable: {e}")))?;
    Ok(token.access_token)
}

fn key_operation_url(endpoint: &str, key_name: &str, key_version: Option<&str>, op: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    match key_version {
        Some(version) => format!("{base}/keys/{key_name}/{version}/{op}?api-version={API_VERSION}"),
        None => format!("{base}/keys/{key_name}/{op}?api-version={API_VERSION}"),
    }
}

async fn key_operation(
    http: &Client,
    credentials: &AzureCredentials,
    url: &str,
    value: &[u8],
) -> KmsResult<Vec<u8>> {
    let token = fetch_token(http, credentials).await?;

    let resp = http
        .post(url)
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "alg": WRAP_ALGORITHM,
            "value": URL_SAFE_NO_PAD.encode(value),
        }))
        .send()
        .await?;

    if resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::FORBIDDEN {
        return Err(KmsError::Auth(format!(
            "Azure Key Vault rejected the operation: HTTP {}",
            resp.status()
        )));
    }

    let resp = resp
        .error_for_status()
        .map_err(|e| KmsError::Response(format!("Azure Key Vault operation failed: {e}")))?;

    let body: KeyOperationResponse = resp
        .json()
        .await
        .map_err(|e| KmsError::Response(format!("Azure Key Vault response unreadable: {e}")))?;

    URL_SAFE_NO_PAD
        .decode(&body.value)
        .map_err(|e| KmsError::Response(format!("Azure Key Vault returned invalid base64url: {e}")))
}

pub(crate) async fn wrap(
    http: &Client,
    credentials: &AzureCredentials,
    key_vault_endpoint: &str,
    key_name: &str,
    key_version: Option<&str>,
    dek: &DataKey,
) -> KmsResult<Vec<u8>> {
    let url = key_operation_url(key_vault_endpoint, key_name, key_version, "wrapkey");
    let wrapped = key_operation(http, credentials, &url, dek.as_bytes()).await?;
    debug!("wrapped data key under Azure Key Vault key {key_name}");
    Ok(wrapped)
}

pub(crate) async fn unwrap(
    http: &Client,
    credentials: &AzureCredentials,
    key_vault_endpoint: &str,
    key_name: &str,
    key_version: Option<&str>,
    wrapped: &[u8],
) -> KmsResult<DataKey> {
    let url = key_operation_url(key_vault_endpoint, key_name, key_version, "unwrapkey");
    let material = key_operation(http, credentials, &url, wrapped).await?;
    debug!("unwrapped data key via Azure Key Vault key {key_name}");
    Ok(DataKey::try_from_slice(&material)?)
}
