//! LinkedIn platform implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlatformError, Result};
use crate::platforms::{network_error, response_error, Platform};
use crate::types::{PlatformAuth, PlatformId, PostContent, PublishReceipt};

#[derive(Debug, Deserialize)]
struct UgcPostResponse {
    id: String,
}

pub struct LinkedinPlatform {
    http: reqwest::Client,
    api_base: String,
}

impl LinkedinPlatform {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: "https://api.linkedin.com".to_string(),
        }
    }

    pub fn with_base_url(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }

    /// Create a text share on behalf of the authenticated member.
    pub async fn share(&self, text: &str, auth: &PlatformAuth) -> Result<PublishReceipt> {
        let body = serde_json::json!({
            "author": format!("urn:li:person:{}", auth.user_id),
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": text },
                    "shareMediaCategory": "NONE",
                },
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC",
            },
        });

        let response = self
            .http
            .post(format!("{}/v2/ugcPosts", self.api_base))
            .bearer_auth(&auth.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(self.id(), e))?;

        if !response.status().is_success() {
            return Err(response_error(self.id(), response).await.into());
        }

        let post: UgcPostResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Posting(format!("Malformed share response: {}", e)))?;
        Ok(PublishReceipt {
            url: Self::post_url(&post.id),
            post_id: post.id,
        })
    }

    pub fn post_url(id: &str) -> String {
        format!("https://linkedin.com/feed/update/{}", id)
    }
}

#[async_trait]
impl Platform for LinkedinPlatform {
    fn id(&self) -> PlatformId {
        PlatformId::Linkedin
    }

    async fn publish(&self, content: &PostContent, auth: &PlatformAuth) -> Result<PublishReceipt> {
        self.share(&content.format_text(), auth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url() {
        assert_eq!(
            LinkedinPlatform::post_url("urn:li:share:42"),
            "https://linkedin.com/feed/update/urn:li:share:42"
        );
    }

    #[test]
    fn test_platform_metadata() {
        let platform = LinkedinPlatform::new(reqwest::Client::new());
        assert_eq!(platform.id(), PlatformId::Linkedin);
        assert_eq!(platform.character_limit(), None);
        assert!(!platform.requires_media());
    }
}
