//! AWS KMS adapter: `Encrypt`/`Decrypt` against a customer master key.
//!
//! A client is built per call from the static credentials — the adapter
//! keeps no state between calls. The endpoint override exists for tests.

use crate::credentials::AwsCredentials;
use crate::error::{KmsError, KmsResult};
use aws_sdk_kms::Client;
use aws_sdk_kms::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_kms::primitives::Blob;
use fieldseal_crypto::DataKey;
use tracing::debug;

fn build_client(credentials: &AwsCredentials, region: &str, endpoint: Option<&str>) -> Client {
    let creds = aws_credential_types::Credentials::new(
        &credentials.access_key_id,
        &credentials.secret_access_key,
        credentials.session_token.clone(),
        None,
        "fieldseal",
    );

    let mut config_builder = aws_sdk_kms::Config::builder()
        .region(aws_types::region::Region::new(region.to_string()))
        .credentials_provider(creds)
        .behavior_version_latest();

    if let Some(endpoint) = endpoint {
        config_builder = config_builder.endpoint_url(endpoint);
    }

    Client::from_conf(config_builder.build())
}

/// Error codes KMS returns for credential and authorization problems.
fn is_auth_code(code: &str) -> bool {
    code.contains("AccessDenied")
        || code == "UnrecognizedClientException"
        || code == "InvalidSignatureException"
        || code == "ExpiredTokenException"
        || code == "InvalidClientTokenId"
}

fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> KmsError
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            KmsError::Network(format!("AWS KMS {operation} did not complete: {err}"))
        }
        SdkError::ServiceError(ctx) => {
            let code = ctx.err().code().unwrap_or("unknown");
            if is_auth_code(code) {
                KmsError::Auth(format!("AWS KMS {operation} rejected ({code}): {}", ctx.err()))
            } else {
                KmsError::Response(format!("AWS KMS {operation} failed ({code}): {}", ctx.err()))
            }
        }
        _ => KmsError::Response(format!("AWS KMS {operation} failed: {err}")),
    }
}

pub(crate) async fn wrap(
    credentials: &AwsCredentials,
    region: &str,
    key: &str,
    endpoint: Option<&str>,
    dek: &DataKey,
) -> KmsResult<Vec<u8>> {
    let client = build_client(credentials, region, endpoint);

    let output = client
        .encrypt()
        .key_id(key)
        .plaintext(Blob::new(dek.as_bytes().to_vec()))
        .send()
        .await
        .map_err(|e| map_sdk_error("Encrypt", e))?;

    let blob = output
        .ciphertext_blob()
        .ok_or_else(|| KmsError::Response("AWS KMS Encrypt returned no ciphertext".to_string()))?;

    debug!("wrapped data key under AWS KMS key in {region}");
    Ok(blob.as_ref().to_vec())
}

pub(crate) async fn unwrap(
    credentials: &AwsCredentials,
    region: &str,
    key: &str,
    endpoint: Option<&str>,
    wrapped: &[u8],
) -> KmsResult<DataKey> {
    let client = build_client(credentials, region, endpoint);

    let output = client
        .decrypt()
        .key_id(key)
        .ciphertext_blob(Blob::new(wrapped.to_vec()))
        .send()
        .await
        .map_err(|e| map_sdk_error("Decrypt", e))?;

    let blob = output
        .plaintext()
        .ok_or_else(|| KmsError::Response("AWS KMS Decrypt returned no plaintext".to_string()))?;

    debug!("unwrapped data key via AWS KMS in {region}");
    Ok(DataKey::try_from_slice(blob.as_ref())?)
}
