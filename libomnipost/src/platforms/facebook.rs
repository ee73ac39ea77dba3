//! Facebook platform implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PlatformError, Result};
use crate::platforms::{network_error, response_error, Platform};
use crate::types::{PlatformAuth, PlatformId, PostContent, PublishReceipt};

#[derive(Debug, Deserialize)]
struct FeedPostResponse {
    id: String,
}

pub struct FacebookPlatform {
    http: reqwest::Client,
    graph_base: String,
}

impl FacebookPlatform {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            graph_base: "https://graph.facebook.com/v18.0".to_string(),
        }
    }

    pub fn with_base_url(http: reqwest::Client, graph_base: impl Into<String>) -> Self {
        Self {
            http,
            graph_base: graph_base.into(),
        }
    }

    /// Post a message to the user's feed.
    pub async fn post_to_feed(&self, message: &str, auth: &PlatformAuth) -> Result<PublishReceipt> {
        let body = serde_json::json!({
            "message": message,
            "access_token": auth.access_token,
        });

        let response = self
            .http
            .post(format!("{}/{}/feed", self.graph_base, auth.user_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(self.id(), e))?;

        if !response.status().is_success() {
            return Err(response_error(self.id(), response).await.into());
        }

        let post: FeedPostResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Posting(format!("Malformed feed response: {}", e)))?;
        Ok(PublishReceipt {
            url: Self::post_url(&post.id),
            post_id: post.id,
        })
    }

    pub fn post_url(id: &str) -> String {
        format!("https://facebook.com/{}", id)
    }
}

#[async_trait]
impl Platform for FacebookPlatform {
    fn id(&self) -> PlatformId {
        PlatformId::Facebook
    }

    async fn publish(&self, content: &PostContent, auth: &PlatformAuth) -> Result<PublishReceipt> {
        self.post_to_feed(&content.format_text(), auth).await
    }
}
