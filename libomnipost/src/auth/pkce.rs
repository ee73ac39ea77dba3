//! PKCE (Proof Key for Code Exchange) support for the Twitter flow.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// A PKCE verifier and its S256 challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    /// The code verifier (secret, sent during token exchange).
    verifier: String,
    /// The code challenge (sent during authorization).
    challenge: String,
}

impl Pkce {
    /// Generate a new pair from 32 random bytes.
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 32] = rng.gen();
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        let challenge = compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// Rebuild a pair from a verifier handed back by a client.
    pub fn from_verifier(verifier: &str) -> Result<Self, AuthError> {
        // RFC 7636 bounds: 43-128 unreserved characters.
        if verifier.len() < 43 || verifier.len() > 128 {
            return Err(AuthError::Exchange(format!(
                "Code verifier must be 43-128 characters, got {}",
                verifier.len()
            )));
        }
        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
        {
            return Err(AuthError::Exchange(
                "Code verifier contains invalid characters".to_string(),
            ));
        }

        Ok(Self {
            verifier: verifier.to_string(),
            challenge: compute_challenge(verifier),
        })
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

impl Default for Pkce {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate an opaque state token: 32 random bytes, hex encoded.
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
