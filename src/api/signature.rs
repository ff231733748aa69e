//! Ed25519 verification of inbound interactions
//!
//! Discord signs `timestamp ++ raw body` with the application's key and sends
//! the signature hex-encoded. Requests without a valid signature never reach
//! a handler.

use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use ed25519_dalek::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, Signature, Verifier, VerifyingKey};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use thiserror::Error;
use tracing::warn;

use super::error::ApiError;
use super::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("signature is not 64 hex-encoded bytes")]
    MalformedSignature,
    #[error("signature does not match")]
    Invalid,
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    pub fn from_hex(public_key: &str) -> Result<Self, SignatureError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = hex::decode(public_key.trim())
            .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?
            .try_into()
            .map_err(|bytes: Vec<u8>| {
                SignatureError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
            })?;

        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;

        Ok(Self::new(key))
    }

    pub fn verify(&self, timestamp: &str, body: &[u8], signature: &str) -> Result<(), SignatureError> {
        let bytes: [u8; SIGNATURE_LENGTH] = hex::decode(signature.trim())
            .map_err(|_| SignatureError::MalformedSignature)?
            .try_into()
            .map_err(|_| SignatureError::MalformedSignature)?;
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| SignatureError::Invalid)
    }

    pub fn verify_headers(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
        let signature = header_str(headers, SIGNATURE_HEADER)?;
        let timestamp = header_str(headers, TIMESTAMP_HEADER)?;

        self.verify(timestamp, body, signature)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}

/// Route middleware rejecting unsigned or tampered interaction requests
///
/// The body is buffered so the exact bytes that were signed are verified, then
/// handed on unchanged. Reading stops as soon as `server.max_body_bytes` is
/// exceeded.
pub async fn require_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();

    let bytes = read_bounded(body, state.config.server.max_body_bytes).await?;

    if let Err(e) = state.verifier.verify_headers(&parts.headers, &bytes) {
        warn!(error = %e, "Rejected interaction");
        return Err(e.into());
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

async fn read_bounded(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(ApiError::PayloadTooLarge(limit)),
        Err(e) => Err(ApiError::InvalidPayload(format!("failed to read body: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn sign(timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(signing_key().sign(&message).to_bytes())
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::from_hex(&hex::encode(signing_key().verifying_key().to_bytes())).unwrap()
    }

    #[test]
    fn test_valid_signature() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        assert_eq!(verifier().verify("1700000000", body, &signature), Ok(()));
    }

    #[test]
    fn test_tampered_body_or_timestamp() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        assert_eq!(
            verifier().verify("1700000000", br#"{"type":2}"#, &signature),
            Err(SignatureError::Invalid)
        );
        assert_eq!(
            verifier().verify("1700000001", body, &signature),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn test_malformed_signature() {
        assert_eq!(
            verifier().verify("1", b"{}", "zz"),
            Err(SignatureError::MalformedSignature)
        );
        assert_eq!(
            verifier().verify("1", b"{}", "abcd"),
            Err(SignatureError::MalformedSignature)
        );
    }

    #[test]
    fn test_missing_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, "00".parse().unwrap());

        assert_eq!(
            verifier().verify_headers(&headers, b"{}"),
            Err(SignatureError::MissingHeader(TIMESTAMP_HEADER))
        );
        assert_eq!(
            verifier().verify_headers(&HeaderMap::new(), b"{}"),
            Err(SignatureError::MissingHeader(SIGNATURE_HEADER))
        );
    }

    #[tokio::test]
    async fn test_read_bounded_stops_at_limit() {
        let bytes = read_bounded(Body::from(vec![1u8; 16]), 16).await.unwrap();
        assert_eq!(bytes.len(), 16);

        assert!(matches!(
            read_bounded(Body::from(vec![1u8; 17]), 16).await,
            Err(ApiError::PayloadTooLarge(16))
        ));
    }

    #[test]
    fn test_invalid_public_key() {
        assert!(matches!(
            SignatureVerifier::from_hex("not hex"),
            Err(SignatureError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            SignatureVerifier::from_hex("abcd"),
            Err(SignatureError::InvalidPublicKey(_))
        ));
    }
}
