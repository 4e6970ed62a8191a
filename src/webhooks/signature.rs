//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs webhook payloads using HMAC-SHA256 with a shared secret.
//! The signature is provided in the `X-Hub-Signature-256` header as `sha256=<hex>`.
//! Deliveries with a missing or wrong signature are rejected before parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature header is missing")]
    Missing,

    /// Not `sha256=` followed by hex.
    #[error("signature header is malformed")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,

    #[error("webhook secret cannot be used as an HMAC key")]
    InvalidKey,
}

fn mac_for(secret: &[u8]) -> Result<HmacSha256, SignatureError> {
    HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::InvalidKey)
}

/// Produces the `X-Hub-Signature-256` value GitHub would send for `payload`.
///
/// # Examples
///
/// ```
/// use bug_helpers::webhooks::{sign, verify_signature};
///
/// let header = sign(b"{}", b"secret").unwrap();
/// assert!(header.starts_with("sha256="));
/// assert_eq!(verify_signature(b"{}", Some(&header), b"secret"), Ok(()));
/// ```
pub fn sign(payload: &[u8], secret: &[u8]) -> Result<String, SignatureError> {
    let mut mac = mac_for(secret)?;
    mac.update(payload);
    Ok(format!("{}{}", PREFIX, hex::encode(mac.finalize().into_bytes())))
}

/// Verifies a delivery against the shared secret.
///
/// The comparison is constant-time (delegated to the HMAC library).
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &[u8],
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let expected = header
        .trim()
        .strip_prefix(PREFIX)
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SignatureError::Malformed)?;

    let mut mac = mac_for(secret)?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Example from GitHub's webhook documentation.
    #[test]
    fn github_documentation_vector() {
        let header = sign(b"Hello, World!", b"It's a Secret to Everybody").unwrap();
        assert_eq!(
            header,
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn missing_and_malformed_headers() {
        assert_eq!(
            verify_signature(b"x", None, b"s"),
            Err(SignatureError::Missing)
        );
        for header in ["", "abcd", "sha1=abcd", "sha256=xyz", "sha256=abc"] {
            assert_eq!(
                verify_signature(b"x", Some(header), b"s"),
                Err(SignatureError::Malformed),
                "{header:?}"
            );
        }
    }

    #[test]
    fn wrong_secret_is_a_mismatch() {
        let header = sign(b"payload", b"right").unwrap();
        assert_eq!(
            verify_signature(b"payload", Some(&header), b"wrong"),
            Err(SignatureError::Mismatch)
        );
    }

    proptest! {
        #[test]
        fn signed_payloads_verify(
            payload: Vec<u8>,
            secret in prop::collection::vec(any::<u8>(), 1..64)
        ) {
            let header = sign(&payload, &secret).unwrap();
            prop_assert_eq!(verify_signature(&payload, Some(&header), &secret), Ok(()));
        }

        #[test]
        fn tampered_payloads_fail(
            mut payload in prop::collection::vec(any::<u8>(), 1..256),
            index: usize
        ) {
            let header = sign(&payload, b"secret").unwrap();
            let i = index % payload.len();
            payload[i] ^= 0x01;
            prop_assert_eq!(
                verify_signature(&payload, Some(&header), b"secret"),
                Err(SignatureError::Mismatch)
            );
        }

        #[test]
        fn arbitrary_headers_never_panic(header: String) {
            let _ = verify_signature(b"x", Some(&header), b"s");
        }
    }
}
