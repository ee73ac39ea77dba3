//! Instagram platform implementation
//!
//! Publishing is two-phase: create a media container, then publish it.
//! Both calls go through the Facebook graph using the page access token.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{PlatformError, Result};
use crate::platforms::{network_error, response_error, Platform};
use crate::types::{MediaAttachment, MediaKind, PlatformAuth, PlatformId, PostContent, PublishReceipt};

#[derive(Debug, Deserialize)]
struct GraphId {
    id: String,
}

pub struct InstagramPlatform {
    http: reqwest::Client,
    graph_base: String,
}

impl InstagramPlatform {
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

    /// Upload media and caption, then publish the resulting container.
    pub async fn post_media(
        &self,
        caption: &str,
        media: &MediaAttachment,
        auth: &PlatformAuth,
    ) -> Result<PublishReceipt> {
        let image_part = reqwest::multipart::Part::bytes(media.data.clone())
            .file_name(media.file_name.clone())
            .mime_str(&media.mime_type)
            .map_err(|e| PlatformError::Posting(format!("Invalid media type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("image", image_part)
            .text("caption", caption.to_string())
            .text("access_token", auth.access_token.clone());

        let response = self
            .http
            .post(format!("{}/{}/media", self.graph_base, auth.user_id))
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(self.id(), e))?;

        if !response.status().is_success() {
            return Err(response_error(self.id(), response).await.into());
        }

        let container: GraphId = response
            .json()
            .await
            .map_err(|e| PlatformError::Posting(format!("Malformed media response: {}", e)))?;
        debug!(creation_id = %container.id, "Created Instagram media container");

        let publish_response = self
            .http
            .post(format!("{}/{}/media_publish", self.graph_base, auth.user_id))
            .json(&serde_json::json!({
                "creation_id": container.id,
                "access_token": auth.access_token,
            }))
            .send()
            .await
            .map_err(|e| network_error(self.id(), e))?;

        if !publish_response.status().is_success() {
            return Err(response_error(self.id(), publish_response).await.into());
        }

        let published: GraphId = publish_response
            .json()
            .await
            .map_err(|e| PlatformError::Posting(format!("Malformed publish response: {}", e)))?;
        Ok(PublishReceipt {
            url: Self::post_url(&published.id),
            post_id: published.id,
        })
    }

    pub fn post_url(id: &str) -> String {
        format!("https://instagram.com/p/{}", id)
    }
}

#[async_trait]
impl Platform for InstagramPlatform {
    fn id(&self) -> PlatformId {
        PlatformId::Instagram
    }

    fn accepted_media(&self) -> &[MediaKind] {
        &[MediaKind::Image, MediaKind::Video]
    }

    fn requires_media(&self) -> bool {
        true
    }

    async fn publish(&self, content: &PostContent, auth: &PlatformAuth) -> Result<PublishReceipt> {
        let media = content.media.as_ref().ok_or_else(|| {
            PlatformError::Validation("Instagram requires media file".to_string())
        })?;
        self.post_media(&content.format_text(), media, auth).await
    }
}
