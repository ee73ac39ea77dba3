//! Publishing and analytics routes.

use std::collections::HashMap;

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use libomnipost::types::{
    media_mime_for_extension, split_tags, MediaAttachment, PlatformAuth, PlatformId, PostContent,
};

use crate::error::ApiError;
use crate::routes::bearer_token;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/youtube/upload", post(youtube_upload))
        .route("/twitter/tweet", post(twitter_tweet))
        .route("/linkedin/post", post(linkedin_post))
        .route("/facebook/post", post(facebook_post))
        .route("/instagram/post", post(instagram_post))
        .route("/cross-post", post(cross_post))
        .route("/analytics/overview", get(analytics_overview))
}

/// Collected multipart form: text fields plus at most one file field.
struct UploadForm {
    media: Option<MediaAttachment>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    fn field(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    file_field: &str,
    cap: u64,
) -> Result<UploadForm, ApiError> {
    let mut media = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let mime_type = field
                .content_type()
                .map(|m| m.to_string())
                .or_else(|| {
                    file_name
                        .rsplit('.')
                        .next()
                        .and_then(media_mime_for_extension)
                        .map(|m| m.to_string())
                })
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field.bytes().await.map_err(|e| {
                if e.to_string().to_lowercase().contains("length limit") {
                    ApiError::FileTooLarge { limit_bytes: cap }
                } else {
                    ApiError::BadRequest(format!("Failed to read upload: {}", e))
                }
            })?;
            if data.len() as u64 > cap {
                return Err(ApiError::FileTooLarge { limit_bytes: cap });
            }
            media = Some(MediaAttachment::new(file_name, mime_type, data.to_vec()));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Malformed field '{}': {}", name, e)))?;
            fields.insert(name, text);
        }
    }

    Ok(UploadForm { media, fields })
}

async fn youtube_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let form = read_multipart(multipart, "video", state.max_upload_bytes()).await?;

    let content = PostContent::new(
        form.field("title"),
        form.field("description"),
        split_tags(&form.field("tags")),
    );
    let media = form
        .media
        .ok_or_else(|| ApiError::MissingUpload("No video file provided".to_string()))?;
    let content = content.with_media(media);

    let auth = PlatformAuth::bearer(PlatformId::Youtube, token, "");
    let video = state.youtube.upload_video(&content, &auth).await?;

    Ok(Json(json!({
        "id": video.id,
        "title": video.snippet.title,
        "url": format!("https://youtube.com/watch?v={}", video.id),
    })))
}

#[derive(Deserialize)]
struct TweetRequest {
    text: String,
    #[serde(default)]
    media: Vec<TweetMedia>,
}

#[derive(Deserialize)]
struct TweetMedia {
    /// Base64-encoded file contents.
    data: String,
    #[serde(rename = "type")]
    mime_type: String,
}

async fn twitter_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TweetRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let auth = PlatformAuth::bearer(PlatformId::Twitter, token, "");

    let mut media_ids = Vec::new();
    for item in &request.media {
        let bytes = STANDARD.decode(&item.data).map_err(|e| {
            ApiError::BadRequest(format!("Invalid base64 media ({}): {}", item.mime_type, e))
        })?;
        media_ids.push(state.twitter.upload_media(&bytes, &auth).await?);
    }

    let tweet = state.twitter.tweet(&request.text, &media_ids, &auth).await?;
    Ok(Json(json!({
        "data": { "id": tweet.id, "text": tweet.text },
        "url": format!("https://twitter.com/i/web/status/{}", tweet.id),
    })))
}

#[derive(Deserialize)]
struct LinkedinRequest {
    text: String,
    #[serde(rename = "userId")]
    user_id: String,
}

async fn linkedin_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LinkedinRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let auth = PlatformAuth::bearer(PlatformId::Linkedin, token, &request.user_id);

    let receipt = state.linkedin.share(&request.text, &auth).await?;
    Ok(Json(json!({ "id": receipt.post_id, "url": receipt.url })))
}

#[derive(Deserialize)]
struct FacebookRequest {
    message: String,
    #[serde(rename = "userId")]
    user_id: String,
}

async fn facebook_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FacebookRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let auth = PlatformAuth::bearer(PlatformId::Facebook, token, &request.user_id);

    let receipt = state.facebook.post_to_feed(&request.message, &auth).await?;
    Ok(Json(json!({ "id": receipt.post_id, "url": receipt.url })))
}

async fn instagram_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)?;
    let form = read_multipart(multipart, "media", state.max_upload_bytes()).await?;

    let caption = form.field("caption");
    let auth = PlatformAuth::bearer(PlatformId::Instagram, token, &form.field("userId"));
    let media = form.media.ok_or_else(|| {
        ApiError::MissingUpload("No media file provided for Instagram".to_string())
    })?;

    let receipt = state.instagram.post_media(&caption, &media, &auth).await?;
    Ok(Json(json!({ "id": receipt.post_id, "url": receipt.url })))
}

/// Per-platform credential in the `userTokens` form field. Accepts either a
/// bare access token or the object shape the callback routes hand out.
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenEntry {
    Token(String),
    Auth {
        #[serde(rename = "accessToken")]
        access_token: String,
        #[serde(default, rename = "refreshToken")]
        refresh_token: Option<String>,
        #[serde(default, rename = "expiresAt")]
        expires_at: Option<i64>,
        #[serde(default, rename = "userId")]
        user_id: String,
    },
}

impl TokenEntry {
    fn into_auth(self, platform: PlatformId) -> PlatformAuth {
        match self {
            TokenEntry::Token(token) => PlatformAuth::bearer(platform, token, ""),
            TokenEntry::Auth {
                access_token,
                refresh_token,
                expires_at,
                user_id,
            } => {
                // A record without an expiry gets the same short lease a bare
                // token does; a record with one keeps it, so a credential the
                // client already knows is stale never reaches the provider.
                let expires_at = expires_at
                    .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() + 3_600_000);
                PlatformAuth::new(
                    platform,
                    access_token,
                    refresh_token,
                    expires_at,
                    user_id,
                    "",
                )
            }
        }
    }
}

async fn cross_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = read_multipart(multipart, "video", state.max_upload_bytes()).await?;

    let platforms: Vec<String> = serde_json::from_str(&form.field("platforms"))
        .map_err(|e| ApiError::BadRequest(format!("Invalid platforms list: {}", e)))?;
    let raw_tokens: HashMap<String, TokenEntry> = serde_json::from_str(&form.field("userTokens"))
        .map_err(|e| ApiError::BadRequest(format!("Invalid userTokens object: {}", e)))?;

    let mut tokens = HashMap::new();
    for (name, entry) in raw_tokens {
        if let Ok(id) = name.parse::<PlatformId>() {
            tokens.insert(id, entry.into_auth(id));
        }
    }

    let mut content = PostContent::new(
        form.field("title"),
        form.field("description"),
        split_tags(&form.field("tags")),
    );
    if let Some(media) = form.media {
        content = content.with_media(media);
    }

    info!(platforms = ?platforms, "Cross-posting");
    let results = state.poster.publish(&content, &platforms, &tokens).await;
    Ok(Json(json!({ "results": results })))
}

async fn analytics_overview(State(_state): State<AppState>) -> Json<Value> {
    // Placeholder aggregates until per-platform analytics fetching lands
    Json(json!({
        "totalPosts": 247,
        "totalReach": 1_200_000,
        "engagementRate": 8.4,
        "newFollowers": 2847,
        "platformStats": [
            { "platform": "youtube", "posts": 45, "reach": 850_000, "engagement": 12.3 },
            { "platform": "twitter", "posts": 89, "reach": 245_000, "engagement": 6.8 },
            { "platform": "linkedin", "posts": 67, "reach": 78_000, "engagement": 15.2 },
            { "platform": "facebook", "posts": 23, "reach": 42_000, "engagement": 4.1 },
            { "platform": "instagram", "posts": 34, "reach": 156_000, "engagement": 9.7 },
        ],
    }))
}
