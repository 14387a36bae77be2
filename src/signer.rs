use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::encode::sig_escape;

type HmacSha1 = Hmac<Sha1>;

/// Signature method used to sign an OAuth1 signature base string.
///
/// The request builder reads [`Signer::name`] for `oauth_signature_method`,
/// so a new method only needs a new implementation of this trait.
pub trait Signer: Send + Sync {
    /// The `oauth_signature_method` identifier, e.g. `HMAC-SHA1`.
    fn name(&self) -> &str;

    /// Signs `base_string`. `token_secret` is empty in the two-legged flow.
    fn sign(&self, token_secret: &str, base_string: &str) -> String;
}

/// `HMAC-SHA1` keyed with `consumer_secret&token_secret`, base64 encoded.
#[derive(Clone)]
pub struct HmacSha1Signer {
    consumer_secret: String,
}

impl HmacSha1Signer {
    pub fn new(consumer_secret: impl Into<String>) -> Self {
        HmacSha1Signer {
            consumer_secret: consumer_secret.into(),
        }
    }
}

impl Signer for HmacSha1Signer {
    fn name(&self) -> &str {
        "HMAC-SHA1"
    }

    fn sign(&self, token_secret: &str, base_string: &str) -> String {
        let key = format!("{}&{}", self.consumer_secret, token_secret);
        // HMAC pads or hashes the key, so no length is rejected
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .expect("HMAC-SHA1 accepts keys of any size");
        mac.update(base_string.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// `PLAINTEXT`: the encoded secrets themselves, joined by `&`.
///
/// Only meaningful over a confidential transport.
#[derive(Clone)]
pub struct PlaintextSigner {
    consumer_secret: String,
}

impl PlaintextSigner {
    pub fn new(consumer_secret: impl Into<String>) -> Self {
        PlaintextSigner {
            consumer_secret: consumer_secret.into(),
        }
    }
}

impl Signer for PlaintextSigner {
    fn name(&self) -> &str {
        "PLAINTEXT"
    }

    fn sign(&self, token_secret: &str, _base_string: &str) -> String {
        format!(
            "{}&{}",
            sig_escape(&self.consumer_secret),
            sig_escape(token_secret)
        )
    }
}

impl std::fmt::Debug for HmacSha1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSha1Signer").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for PlaintextSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaintextSigner").finish_non_exhaustive()
    }
}
