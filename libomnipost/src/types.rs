//! Core types for Omnipost

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a supported publishing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Youtube,
    Twitter,
    Linkedin,
    Facebook,
    Instagram,
}

impl PlatformId {
    pub const ALL: [PlatformId; 5] = [
        PlatformId::Youtube,
        PlatformId::Twitter,
        PlatformId::Linkedin,
        PlatformId::Facebook,
        PlatformId::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Youtube => "youtube",
            PlatformId::Twitter => "twitter",
            PlatformId::Linkedin => "linkedin",
            PlatformId::Facebook => "facebook",
            PlatformId::Instagram => "instagram",
        }
    }
}

impl FromStr for PlatformId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube" => Ok(PlatformId::Youtube),
            "twitter" => Ok(PlatformId::Twitter),
            "linkedin" => Ok(PlatformId::Linkedin),
            "facebook" => Ok(PlatformId::Facebook),
            "instagram" => Ok(PlatformId::Instagram),
            _ => Err(format!("Unknown platform: '{}'", s)),
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Broad kind of a media attachment, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_lowercase();
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Look up the MIME type for a common media file extension.
pub fn media_mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// An uploaded media file attached to a post.
///
/// Attachments are transient: they live for the duration of one publish
/// request and are never persisted.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaAttachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime(&self.mime_type)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Content to publish, constructed per request.
#[derive(Debug, Clone, Default)]
pub struct PostContent {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub media: Option<MediaAttachment>,
}

impl PostContent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags,
            media: None,
        }
    }

    pub fn with_media(mut self, media: MediaAttachment) -> Self {
        self.media = Some(media);
        self
    }

    /// Render the shared text template: title, blank line, description,
    /// and a trailing hashtag line when tags are present.
    pub fn format_text(&self) -> String {
        let mut text = format!("{}\n\n{}", self.title, self.description);
        if !self.tags.is_empty() {
            let hashtags: Vec<String> = self
                .tags
                .iter()
                .map(|tag| format!("#{}", tag.trim()))
                .collect();
            text.push_str("\n\n");
            text.push_str(&hashtags.join(" "));
        }
        text
    }
}

/// Split a comma-joined tag string into trimmed, non-empty tags.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// What a platform hands back after a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub post_id: String,
    pub url: String,
}

/// Outcome of publishing to a single platform.
///
/// Exactly one of these exists per requested platform per cross-post call,
/// whether the attempt succeeded or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResult {
    pub platform: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PostResult {
    pub fn published(platform: &str, receipt: PublishReceipt) -> Self {
        Self {
            platform: platform.to_string(),
            success: true,
            post_id: Some(receipt.post_id),
            url: Some(receipt.url),
            error: None,
        }
    }

    pub fn failed(platform: &str, error: impl Into<String>) -> Self {
        Self {
            platform: platform.to_string(),
            success: false,
            post_id: None,
            url: None,
            error: Some(error.into()),
        }
    }
}

/// OAuth credentials for one platform, produced by a successful callback.
///
/// Read on every publish attempt; once `expires_at` has passed the record is
/// treated as absent and the stale token is never sent upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAuth {
    pub platform: PlatformId,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as unix milliseconds.
    pub expires_at: i64,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
}

impl PlatformAuth {
    pub fn new(
        platform: PlatformId,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: i64,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            access_token: access_token.into(),
            refresh_token,
            expires_at,
            user_id: user_id.into(),
            username: username.into(),
        }
    }

    /// Short-lived auth for routes where the caller supplies a bearer token
    /// directly. Expiry is set one hour out.
    pub fn bearer(platform: PlatformId, access_token: impl Into<String>, user_id: &str) -> Self {
        Self::new(
            platform,
            access_token,
            None,
            chrono::Utc::now().timestamp_millis() + 3_600_000,
            user_id,
            "",
        )
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp_millis() >= self.expires_at
    }
}
