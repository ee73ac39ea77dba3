//! Mock platform implementation for testing
//!
//! A configurable stand-in that can simulate successes, failures, and
//! latency, so fan-out logic can be tested without provider credentials
//! or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{MediaKind, PlatformAuth, PlatformId, PostContent, PublishReceipt};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Which platform this mock impersonates
    pub platform: PlatformId,

    /// Whether publishing should succeed
    pub publish_succeeds: bool,

    /// Error to return on publish failure
    pub publish_error: Option<String>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Character limit for validation
    pub character_limit: Option<usize>,

    /// Whether the platform refuses posts without media
    pub requires_media: bool,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Texts that have been published (for verification)
    pub published_texts: Arc<Mutex<Vec<String>>>,
}

impl MockConfig {
    fn new(platform: PlatformId) -> Self {
        Self {
            platform,
            publish_succeeds: true,
            publish_error: None,
            delay: Duration::from_millis(0),
            character_limit: None,
            requires_media: false,
            publish_call_count: Arc::new(Mutex::new(0)),
            published_texts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A mock that accepts every publish
    pub fn succeeding(platform: PlatformId) -> Self {
        Self::new(MockConfig::new(platform))
    }

    /// A mock that rejects every publish with the given error
    pub fn failing(platform: PlatformId, error: &str) -> Self {
        Self::new(MockConfig {
            publish_succeeds: false,
            publish_error: Some(error.to_string()),
            ..MockConfig::new(platform)
        })
    }

    /// A mock with simulated latency
    pub fn with_delay(platform: PlatformId, delay: Duration) -> Self {
        Self::new(MockConfig {
            delay,
            ..MockConfig::new(platform)
        })
    }

    /// A mock with a character limit
    pub fn with_limit(platform: PlatformId, limit: usize) -> Self {
        Self::new(MockConfig {
            character_limit: Some(limit),
            ..MockConfig::new(platform)
        })
    }

    /// A mock that requires a media attachment
    pub fn media_only(platform: PlatformId) -> Self {
        Self::new(MockConfig {
            requires_media: true,
            ..MockConfig::new(platform)
        })
    }

    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Shared counter handle, usable after the mock moves into a registry.
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.config.publish_call_count)
    }

    pub fn published_texts(&self) -> Vec<String> {
        self.config.published_texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn id(&self) -> PlatformId {
        self.config.platform
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }

    fn accepted_media(&self) -> &[MediaKind] {
        &[MediaKind::Image, MediaKind::Video]
    }

    fn requires_media(&self) -> bool {
        self.config.requires_media
    }

    fn validate(&self, content: &PostContent) -> Result<()> {
        if content.title.is_empty() && content.description.is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        if let Some(limit) = self.config.character_limit {
            let text = content.format_text();
            if text.chars().count() > limit {
                return Err(PlatformError::Validation(format!(
                    "Content exceeds {} character limit (got {} characters)",
                    limit,
                    text.chars().count()
                ))
                .into());
            }
        }

        if self.config.requires_media && content.media.is_none() {
            return Err(PlatformError::Validation(format!(
                "{} requires a media attachment",
                self.id()
            ))
            .into());
        }

        Ok(())
    }

    async fn publish(&self, content: &PostContent, auth: &PlatformAuth) -> Result<PublishReceipt> {
        *self.config.publish_call_count.lock().unwrap() += 1;

        if auth.access_token.is_empty() {
            return Err(PlatformError::Authentication("Empty access token".to_string()).into());
        }

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if self.config.publish_succeeds {
            self.config
                .published_texts
                .lock()
                .unwrap()
                .push(content.format_text());

            let post_id = format!("{}-mock-{}", self.config.platform, uuid::Uuid::new_v4());
            Ok(PublishReceipt {
                url: format!("https://example.com/{}", post_id),
                post_id,
            })
        } else {
            let error_msg = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| "Mock publishing failed".to_string());
            Err(PlatformError::Posting(error_msg).into())
        }
    }
}
