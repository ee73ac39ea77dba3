//! YouTube platform implementation
//!
//! Videos upload through the multipart insert endpoint: one JSON metadata
//! part plus the raw video bytes.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{PlatformError, Result};
use crate::platforms::{network_error, response_error, Platform};
use crate::types::{MediaKind, PlatformAuth, PlatformId, PostContent, PublishReceipt};

#[derive(Debug, Deserialize)]
pub struct UploadedVideo {
    pub id: String,
    pub snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
}

pub struct YoutubePlatform {
    http: reqwest::Client,
    upload_base: String,
}

impl YoutubePlatform {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            upload_base: "https://www.googleapis.com/upload/youtube/v3".to_string(),
        }
    }

    pub fn with_base_url(http: reqwest::Client, upload_base: impl Into<String>) -> Self {
        Self {
            http,
            upload_base: upload_base.into(),
        }
    }

    /// Upload a video with its metadata and return the created video.
    pub async fn upload_video(
        &self,
        content: &PostContent,
        auth: &PlatformAuth,
    ) -> Result<UploadedVideo> {
        let media = content.media.as_ref().ok_or_else(|| {
            PlatformError::Validation("No video file provided".to_string())
        })?;

        let metadata = serde_json::json!({
            "snippet": {
                "title": content.title,
                "description": content.description,
                "tags": content.tags,
                "categoryId": "22",
                "defaultLanguage": "en",
            },
            "status": {
                "privacyStatus": "public",
                "selfDeclaredMadeForKids": false,
            },
        });

        let metadata_part = reqwest::multipart::Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|e| PlatformError::Posting(format!("Invalid metadata part: {}", e)))?;
        let video_part = reqwest::multipart::Part::bytes(media.data.clone())
            .file_name(media.file_name.clone())
            .mime_str(&media.mime_type)
            .map_err(|e| PlatformError::Posting(format!("Invalid media type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata_part)
            .part("video", video_part);

        debug!(bytes = media.data.len(), "Uploading video to YouTube");
        let response = self
            .http
            .post(format!("{}/videos", self.upload_base))
            .query(&[("part", "snippet,status"), ("uploadType", "multipart")])
            .bearer_auth(&auth.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(self.id(), e))?;

        if !response.status().is_success() {
            return Err(response_error(self.id(), response).await.into());
        }

        let video: UploadedVideo = response
            .json()
            .await
            .map_err(|e| PlatformError::Posting(format!("Malformed upload response: {}", e)))?;
        info!(video_id = %video.id, "YouTube upload complete");
        Ok(video)
    }

    pub fn video_url(id: &str) -> String {
        format!("https://youtube.com/watch?v={}", id)
    }
}

#[async_trait]
impl Platform for YoutubePlatform {
    fn id(&self) -> PlatformId {
        PlatformId::Youtube
    }

    fn accepted_media(&self) -> &[MediaKind] {
        &[MediaKind::Video]
    }

    fn requires_media(&self) -> bool {
        true
    }

    async fn publish(&self, content: &PostContent, auth: &PlatformAuth) -> Result<PublishReceipt> {
        let video = self.upload_video(content, auth).await?;
        Ok(PublishReceipt {
            url: Self::video_url(&video.id),
            post_id: video.id,
        })
    }
}
