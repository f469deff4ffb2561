//! Webhook signature verification.
//!
//! The hosting platform signs each delivery with an HMAC of the raw body,
//! sent as `X-Hub-Signature: <algorithm>=<hex digest>`. Verification only
//! applies when a shared secret is configured.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::WebhookSecret;

pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Largest delivery the platform sends.
pub const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// HMAC of `body` under `secret` with the named digest, or `None` for an
/// unsupported algorithm.
pub fn compute_signature(algorithm: &str, secret: &[u8], body: &[u8]) -> Option<Vec<u8>> {
    match algorithm {
        "sha1" => {
            let mut mac = HmacSha1::new_from_slice(secret).ok()?;
            mac.update(body);
            Some(mac.finalize().into_bytes().to_vec())
        }
        "sha256" => {
            let mut mac = HmacSha256::new_from_slice(secret).ok()?;
            mac.update(body);
            Some(mac.finalize().into_bytes().to_vec())
        }
        _ => None,
    }
}

/// Header value the platform would send for `body`.
pub fn signature_header(algorithm: &str, secret: &[u8], body: &[u8]) -> Option<String> {
    compute_signature(algorithm, secret, body)
        .map(|digest| format!("{}={}", algorithm, hex::encode(digest)))
}

/// Check an `<algorithm>=<hex>` header against the body.
#[must_use]
pub fn verify_signature(secret: &[u8], header: &str, body: &[u8]) -> bool {
    let Some((algorithm, digest)) = header.trim().split_once('=') else {
        return false;
    };
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let Some(computed) = compute_signature(algorithm, secret, body) else {
        tracing::warn!(algorithm, "Unsupported signature algorithm");
        return false;
    };

    computed.as_slice().ct_eq(&expected).into()
}

/// Rejects deliveries whose signature does not match the configured secret.
pub async fn signature_middleware(
    State(secret): State<WebhookSecret>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(key) = secret.key() else {
        return Ok(next.run(request).await);
    };

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_PAYLOAD_BYTES)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to read webhook body: {}", e);
            StatusCode::PAYLOAD_TOO_LARGE
        })?;

    let header = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok());

    match header {
        Some(header) if verify_signature(key, header, &bytes) => {
            Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
        }
        Some(_) => {
            tracing::warn!("Invalid webhook signature");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing X-Hub-Signature header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"key";
    const MESSAGE: &[u8] = b"The quick brown fox jumps over the lazy dog";

    #[test]
    fn accepts_known_sha1_vector() {
        assert!(verify_signature(
            KEY,
            "sha1=de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9",
            MESSAGE
        ));
    }

    #[test]
    fn accepts_known_sha256_vector() {
        assert!(verify_signature(
            KEY,
            "sha256=f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8",
            MESSAGE
        ));
    }

    #[test]
    fn rejects_other_digest_for_same_algorithm() {
        assert!(!verify_signature(
            KEY,
            "sha1=0000000000000000000000000000000000000000",
            MESSAGE
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(!verify_signature(KEY, "sha1", MESSAGE));
        assert!(!verify_signature(KEY, "sha1=nothex", MESSAGE));
        assert!(!verify_signature(KEY, "md5=notadigest", MESSAGE));
    }

    #[test]
    fn signature_header_round_trips() {
        let header = signature_header("sha1", b"s", b"{}").unwrap();
        assert!(header.starts_with("sha1="));
        assert!(verify_signature(b"s", &header, b"{}"));
        assert!(!verify_signature(b"other", &header, b"{}"));
    }
}
