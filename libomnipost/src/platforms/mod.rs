//! Platform abstraction and implementations
//!
//! One adapter per publishing target, all behind a common trait. Adapters
//! are stateless: every call carries the credentials to use, so a single
//! adapter instance serves every account.
//!
//! # Examples
//!
//! ```no_run
//! use libomnipost::platforms::{Platform, twitter::TwitterPlatform};
//! use libomnipost::types::{PlatformAuth, PlatformId, PostContent};
//!
//! # async fn example() -> libomnipost::error::Result<()> {
//! let platform = TwitterPlatform::new(reqwest::Client::new());
//! let auth = PlatformAuth::bearer(PlatformId::Twitter, "token", "42");
//!
//! let content = PostContent::new("Release day", "v2.0 is out", vec!["rust".to_string()]);
//! platform.validate(&content)?;
//!
//! let receipt = platform.publish(&content, &auth).await?;
//! println!("Posted: {}", receipt.url);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{PlatformError, Result};
use crate::types::{MediaKind, PlatformAuth, PlatformId, PostContent, PublishReceipt};

pub mod facebook;
pub mod instagram;
pub mod linkedin;
pub mod twitter;
pub mod youtube;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Common interface for publishing to one platform.
///
/// Implementations translate the shared [`PostContent`] into the provider's
/// wire format and return a [`PublishReceipt`] naming the created post.
#[async_trait]
pub trait Platform: Send + Sync {
    /// The platform this adapter publishes to.
    fn id(&self) -> PlatformId;

    /// Hard character limit for post text, if the platform has one.
    fn character_limit(&self) -> Option<usize> {
        None
    }

    /// Media kinds this platform accepts, empty when it is text-only.
    fn accepted_media(&self) -> &[MediaKind] {
        &[]
    }

    /// Whether the platform cannot publish without a media attachment.
    fn requires_media(&self) -> bool {
        false
    }

    /// Check content against platform rules before any network call.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Validation` when the content cannot be
    /// published as-is.
    fn validate(&self, content: &PostContent) -> Result<()> {
        if self.requires_media() && content.media.is_none() {
            return Err(PlatformError::Validation(format!(
                "{} requires a media attachment",
                self.id()
            ))
            .into());
        }
        if let Some(media) = &content.media {
            if let Some(kind) = media.kind() {
                if !self.accepted_media().contains(&kind) && self.requires_media() {
                    return Err(PlatformError::Validation(format!(
                        "{} does not accept {:?} attachments",
                        self.id(),
                        kind
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Publish content using the given credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credentials are rejected (`PlatformError::Authentication`)
    /// - The provider refuses the post (`PlatformError::Posting`)
    /// - The provider throttles the caller (`PlatformError::RateLimit`)
    /// - The request never completes (`PlatformError::Network`)
    async fn publish(&self, content: &PostContent, auth: &PlatformAuth) -> Result<PublishReceipt>;
}

/// Lookup table from [`PlatformId`] to a shared adapter instance.
#[derive(Default, Clone)]
pub struct PlatformRegistry {
    platforms: HashMap<PlatformId, Arc<dyn Platform>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self {
            platforms: HashMap::new(),
        }
    }

    /// Build a registry with every production adapter, sharing one HTTP client.
    pub fn with_defaults(http: reqwest::Client) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(youtube::YoutubePlatform::new(http.clone())));
        registry.register(Arc::new(twitter::TwitterPlatform::new(http.clone())));
        registry.register(Arc::new(linkedin::LinkedinPlatform::new(http.clone())));
        registry.register(Arc::new(facebook::FacebookPlatform::new(http.clone())));
        registry.register(Arc::new(instagram::InstagramPlatform::new(http)));
        registry
    }

    pub fn register(&mut self, platform: Arc<dyn Platform>) {
        self.platforms.insert(platform.id(), platform);
    }

    pub fn get(&self, id: PlatformId) -> Option<Arc<dyn Platform>> {
        self.platforms.get(&id).cloned()
    }

    pub fn contains(&self, id: PlatformId) -> bool {
        self.platforms.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<PlatformId> {
        let mut ids: Vec<_> = self.platforms.keys().copied().collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

/// Map a non-success provider response to a [`PlatformError`].
pub(crate) async fn response_error(id: PlatformId, response: reqwest::Response) -> PlatformError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_provider_message(&body)
        .unwrap_or_else(|| format!("{} returned {}", id, status));

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        PlatformError::RateLimit(message)
    } else if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || body.contains("invalid_grant")
    {
        PlatformError::Authentication(message)
    } else {
        PlatformError::Posting(message)
    }
}

/// Pull the human-readable message out of a provider error body.
///
/// Providers disagree on shape: Google and Facebook nest under `error`,
/// Twitter uses `detail` or `title`, LinkedIn uses `message`.
fn extract_provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(error) = value.get("error") {
        if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
        if let Some(text) = error.as_str() {
            return Some(text.to_string());
        }
    }
    for key in ["detail", "message", "title", "error_description"] {
        if let Some(text) = value.get(key).and_then(|m| m.as_str()) {
            return Some(text.to_string());
        }
    }
    None
}

pub(crate) fn network_error(id: PlatformId, err: reqwest::Error) -> PlatformError {
    PlatformError::Network(format!("{}: {}", id, err))
}
