//! Cross-platform publishing orchestration
//!
//! Fans one piece of content out to several platforms concurrently. Every
//! requested platform produces exactly one [`PostResult`], in request order,
//! whether it succeeded, failed upstream, or was never attempted.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{info, warn};

use crate::platforms::PlatformRegistry;
use crate::types::{PlatformAuth, PlatformId, PostContent, PostResult};

/// Error text reported for a requested platform with no registered adapter.
pub const UNSUPPORTED_PLATFORM: &str = "Platform not supported";

/// Orchestrates publishing one post to many platforms.
pub struct CrossPoster {
    registry: PlatformRegistry,
}

impl CrossPoster {
    pub fn new(registry: PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Publish to every requested platform concurrently.
    ///
    /// `platforms` is taken verbatim from the caller, so unknown names are
    /// reported per-platform rather than failing the whole batch. A missing
    /// or expired credential likewise fails only its own platform.
    pub async fn publish(
        &self,
        content: &PostContent,
        platforms: &[String],
        tokens: &HashMap<PlatformId, PlatformAuth>,
    ) -> Vec<PostResult> {
        let futures: Vec<_> = platforms
            .iter()
            .map(|name| self.publish_one(content, name, tokens))
            .collect();

        // join_all preserves input order, one result per requested platform
        join_all(futures).await
    }

    async fn publish_one(
        &self,
        content: &PostContent,
        name: &str,
        tokens: &HashMap<PlatformId, PlatformAuth>,
    ) -> PostResult {
        let id = match name.parse::<PlatformId>() {
            Ok(id) => id,
            Err(_) => {
                warn!(platform = name, "Requested platform is not supported");
                return PostResult::failed(name, UNSUPPORTED_PLATFORM);
            }
        };

        let platform = match self.registry.get(id) {
            Some(platform) => platform,
            None => {
                warn!(platform = name, "No adapter registered for platform");
                return PostResult::failed(name, UNSUPPORTED_PLATFORM);
            }
        };

        // Expired credentials are treated the same as absent ones; a stale
        // token is never sent upstream.
        let auth = match tokens.get(&id).filter(|auth| !auth.is_expired()) {
            Some(auth) => auth,
            None => {
                return PostResult::failed(name, format!("{} is not connected", id));
            }
        };

        if let Err(e) = platform.validate(content) {
            return PostResult::failed(name, e.to_string());
        }

        info!(platform = %id, "Publishing");
        match platform.publish(content, auth).await {
            Ok(receipt) => {
                info!(platform = %id, post_id = %receipt.post_id, "Published");
                PostResult::published(name, receipt)
            }
            Err(e) => {
                warn!(platform = %id, error = %e, "Publish failed");
                PostResult::failed(name, e.to_string())
            }
        }
    }
}
