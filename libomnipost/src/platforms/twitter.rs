//! Twitter platform implementation
//!
//! Tweets go through the v2 API; media still uploads through the v1.1
//! endpoint, which is why this adapter carries two base URLs.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tracing::debug;

use crate::error::{PlatformError, Result};
use crate::platforms::{network_error, response_error, Platform};
use crate::types::{MediaKind, PlatformAuth, PlatformId, PostContent, PublishReceipt};

pub const TWEET_MAX_CHARS: usize = 280;

/// Shorten text to the tweet limit, ending with an ellipsis when cut.
pub fn truncate_tweet(text: &str) -> String {
    if text.chars().count() > TWEET_MAX_CHARS {
        let cut: String = text.chars().take(TWEET_MAX_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct TweetData {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

pub struct TwitterPlatform {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
}

impl TwitterPlatform {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: "https://api.twitter.com".to_string(),
            upload_base: "https://upload.twitter.com".to_string(),
        }
    }

    pub fn with_base_urls(
        http: reqwest::Client,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        }
    }

    /// Upload one media buffer, returning the media id to attach to a tweet.
    pub async fn upload_media(&self, data: &[u8], auth: &PlatformAuth) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/1.1/media/upload.json", self.upload_base))
            .bearer_auth(&auth.access_token)
            .form(&[("media_data", STANDARD.encode(data))])
            .send()
            .await
            .map_err(|e| network_error(self.id(), e))?;

        if !response.status().is_success() {
            return Err(response_error(self.id(), response).await.into());
        }

        let upload: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Posting(format!("Malformed media response: {}", e)))?;
        debug!(media_id = %upload.media_id_string, "Uploaded media to Twitter");
        Ok(upload.media_id_string)
    }

    /// Create a tweet, optionally referencing previously uploaded media.
    pub async fn tweet(
        &self,
        text: &str,
        media_ids: &[String],
        auth: &PlatformAuth,
    ) -> Result<TweetData> {
        let mut body = serde_json::json!({ "text": truncate_tweet(text) });
        if !media_ids.is_empty() {
            body["media"] = serde_json::json!({ "media_ids": media_ids });
        }

        let response = self
            .http
            .post(format!("{}/2/tweets", self.api_base))
            .bearer_auth(&auth.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(self.id(), e))?;

        if !response.status().is_success() {
            return Err(response_error(self.id(), response).await.into());
        }

        let tweet: TweetResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Posting(format!("Malformed tweet response: {}", e)))?;
        Ok(tweet.data)
    }

    pub fn tweet_url(id: &str) -> String {
        format!("https://twitter.com/i/web/status/{}", id)
    }
}

#[async_trait]
impl Platform for TwitterPlatform {
    fn id(&self) -> PlatformId {
        PlatformId::Twitter
    }

    fn character_limit(&self) -> Option<usize> {
        Some(TWEET_MAX_CHARS)
    }

    fn accepted_media(&self) -> &[MediaKind] {
        &[MediaKind::Image]
    }

    async fn publish(&self, content: &PostContent, auth: &PlatformAuth) -> Result<PublishReceipt> {
        let mut media_ids = Vec::new();
        if let Some(media) = &content.media {
            if media.kind() == Some(MediaKind::Image) {
                media_ids.push(self.upload_media(&media.data, auth).await?);
            }
        }

        let tweet = self.tweet(&content.format_text(), &media_ids, auth).await?;
        Ok(PublishReceipt {
            url: Self::tweet_url(&tweet.id),
            post_id: tweet.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_tweet("hello"), "hello");
    }

    #[test]
    fn test_truncate_exactly_at_limit() {
        let text = "a".repeat(280);
        assert_eq!(truncate_tweet(&text), text);
    }

    #[test]
    fn test_truncate_over_limit() {
        let text = "a".repeat(300);
        let truncated = truncate_tweet(&text);
        assert_eq!(truncated.chars().count(), 280);
        assert!(truncated.ends_with("..."));
        assert_eq!(&truncated[..277], &text[..277]);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "é".repeat(281);
        let truncated = truncate_tweet(&text);
        assert_eq!(truncated.chars().count(), 280);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_tweet_url() {
        assert_eq!(
            TwitterPlatform::tweet_url("123"),
            "https://twitter.com/i/web/status/123"
        );
    }

    #[test]
    fn test_platform_metadata() {
        let platform = TwitterPlatform::new(reqwest::Client::new());
        assert_eq!(platform.id(), PlatformId::Twitter);
        assert_eq!(platform.character_limit(), Some(280));
        assert_eq!(platform.accepted_media(), &[MediaKind::Image]);
        assert!(!platform.requires_media());
    }
}
