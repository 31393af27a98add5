//! KMIP adapter.
//!
//! The master key lives on the KMIP server as a 96-byte `SecretData` object.
//! Wrap/unwrap fetches it with a TTLV `Get` over TLS and then applies the
//! local key-wrapping construction in process — the data key itself never
//! travels to the server.

use crate::credentials::KmipCredentials;
use crate::error::{KmsError, KmsResult};
use crate::ttlv::{self, TtlvWriter, tag};
use fieldseal_crypto::{DataKey, KEY_LEN};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::debug;

const DEFAULT_PORT: u16 = 5696;
const OPERATION_GET: u32 = 0x0A;
const RESULT_STATUS_SUCCESS: u32 = 0;

/// Builds the TTLV `Get` request for a unique identifier.
fn build_get_request(unique_identifier: &str) -> Vec<u8> {
    let mut w = TtlvWriter::new();
    w.structure(tag::REQUEST_MESSAGE, |w| {
        w.structure(tag::REQUEST_HEADER, |w| {
            w.structure(tag::PROTOCOL_VERSION, |w| {
                w.integer(tag::PROTOCOL_VERSION_MAJOR, 1);
                w.integer(tag::PROTOCOL_VERSION_MINOR, 2);
            });
            w.integer(tag::BATCH_COUNT, 1);
        });
        w.structure(tag::BATCH_ITEM, |w| {
            w.enumeration(tag::OPERATION, OPERATION_GET);
            w.structure(tag::REQUEST_PAYLOAD, |w| {
                w.text(tag::UNIQUE_IDENTIFIER, unique_identifier);
            });
        });
    });
    w.into_bytes()
}

/// Extracts the secret bytes from a `Get` response message.
fn parse_get_response(buf: &[u8]) -> KmsResult<Vec<u8>> {
    let message = ttlv::parse(buf)?;
    if message.tag != tag::RESPONSE_MESSAGE {
        return Err(KmsError::Response(format!(
            "KMIP: expected response message, got tag {:#08x}",
            message.tag
        )));
    }

    let batch_item = message.child(tag::BATCH_ITEM)?;
    let status = batch_item.child(tag::RESULT_STATUS)?.enumeration()?;
    if status != RESULT_STATUS_SUCCESS {
        let reason = batch_item
            .child(tag::RESULT_REASON)
            .and_then(|r| r.enumeration())
            .unwrap_or(0);
        let detail = batch_item
            .child(tag::RESULT_MESSAGE)
            .and_then(|m| m.text().map(str::to_string))
            .unwrap_or_default();
        return Err(KmsError::Response(format!(
            "KMIP Get failed: status {status}, reason {reason}: {detail}"
        )));
    }

    let payload = batch_item.child(tag::RESPONSE_PAYLOAD)?;
    let key_block = payload.child(tag::SECRET_DATA)?.child(tag::KEY_BLOCK)?;
    let key_value = key_block.child(tag::KEY_VALUE)?;

    // Raw-format key values nest the material; some servers inline it.
    let material = match key_value.child(tag::KEY_MATERIAL) {
        Ok(inner) => inner.bytes()?,
        Err(_) => key_value.bytes()?,
    };
    Ok(material.to_vec())
}

async fn connect(endpoint: &str) -> KmsResult<tokio_rustls::client::TlsStream<TcpStream>> {
    let (host, port) = match endpoint.rsplit_once(':') {
        Some((host, port)) => (
            host.to_string(),
            port.parse::<u16>()
                .map_err(|_| KmsError::Config(format!("invalid KMIP endpoint: {endpoint}")))?,
        ),
        None => (endpoint.to_string(), DEFAULT_PORT),
    };

    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(config));

    let tcp = TcpStream::connect((host.as_str(), port))
        .await
        .map_err(|e| KmsError::Network(format!("KMIP connect to {endpoint} failed: {e}")))?;

    let server_name = ServerName::try_from(host.clone())
        .map_err(|_| KmsError::Config(format!("invalid KMIP host name: {host}")))?;

    connector
        .connect(server_name, tcp)
        .await
        .map_err(|e| KmsError::Network(format!("KMIP TLS handshake with {endpoint} failed: {e}")))
}

/// Fetches the 96-byte secret identified by `key_id` from the KMIP server.
async fn get_secret(credentials: &KmipCredentials, endpoint: Option<&str>, key_id: &str) -> KmsResult<DataKey> {
    let endpoint = endpoint.unwrap_or(credentials.endpoint.as_str());
    let mut stream = connect(endpoint).await?;

    let request = build_get_request(key_id);
    stream
        .write_all(&request)
        .await
        .map_err(|e| KmsError::Network(format!("KMIP write failed: {e}")))?;

    // Top-level TTLV header first, then the advertised remainder.
    let mut header = [0u8; 8];
    stream
        .read_exact(&mut header)
        .await
        .map_err(|e| KmsError::Network(format!("KMIP read failed: {e}")))?;
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;

    let mut body = vec![0u8; len];
    stream
        .read_exact(&mut body)
        .await
        .map_err(|e| KmsError::Network(format!("KMIP read failed: {e}")))?;

    let mut response = header.to_vec();
    response.extend_from_slice(&body);

    let material = parse_get_response(&response)?;
    if material.len() != KEY_LEN {
        return Err(KmsError::Response(format!(
            "KMIP secret {key_id} has length {}, expected {KEY_LEN}",
            material.len()
        )));
    }

    debug!("fetched KMIP secret {key_id} from {endpoint}");
    DataKey::try_from_slice(&material).map_err(KmsError::from)
}

pub(crate) async fn wrap(
    credentials: &KmipCredentials,
    key_id: &str,
    endpoint: Option<&str>,
    dek: &DataKey,
) -> KmsResult<Vec<u8>> {
    let kek = get_secret(credentials, endpoint, key_id).await?;
    Ok(fieldseal_crypto::wrap_key(&kek, dek.as_bytes())?)
}

pub(crate) async fn unwrap(
    credentials: &KmipCredentials,
    key_id: &str,
    endpoint: Option<&str>,
    wrapped: &[u8],
) -> KmsResult<DataKey> {
    let kek = get_secret(credentials, endpoint, key_id).await?;
    let material = fieldseal_crypto::unwrap_key(&kek, wrapped)?;
    Ok(DataKey::try_from_slice(&material)?)
}
