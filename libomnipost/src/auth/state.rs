//! Short-lived storage for PKCE state.
//!
//! Each issued state maps to the code verifier the callback will need.
//! Entries expire after ten minutes and are consumed on first read, so a
//! replayed callback with the same state is rejected.

use std::time::Duration;

use moka::future::Cache;

use crate::auth::pkce::{generate_state, Pkce};
use crate::error::AuthError;

const STATE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone)]
pub struct StateStore {
    entries: Cache<String, String>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_ttl(STATE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Issue a fresh state token paired with a new PKCE verifier.
    pub async fn issue(&self) -> (String, Pkce) {
        let state = generate_state();
        let pkce = Pkce::new();
        self.entries
            .insert(state.clone(), pkce.verifier().to_string())
            .await;
        (state, pkce)
    }

    /// Take the verifier for a state, removing the entry.
    pub async fn consume(&self, state: &str) -> Result<String, AuthError> {
        let verifier = self
            .entries
            .get(state)
            .await
            .ok_or(AuthError::InvalidState)?;
        self.entries.invalidate(state).await;
        Ok(verifier)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
