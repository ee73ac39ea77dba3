//! Adapter tests against a mocked provider HTTP server.

use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use libomnipost::platforms::facebook::FacebookPlatform;
use libomnipost::platforms::instagram::InstagramPlatform;
use libomnipost::platforms::linkedin::LinkedinPlatform;
use libomnipost::platforms::twitter::TwitterPlatform;
use libomnipost::platforms::youtube::YoutubePlatform;
use libomnipost::platforms::Platform;
use libomnipost::types::{MediaAttachment, PlatformAuth, PlatformId, PostContent};

fn auth(platform: PlatformId, user_id: &str) -> PlatformAuth {
    PlatformAuth::bearer(platform, "test-token", user_id)
}

fn text_content() -> PostContent {
    PostContent::new("Launch", "We shipped", vec!["rust".to_string()])
}

#[tokio::test]
async fn twitter_tweet_returns_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": { "id": "1234567890", "text": "Launch" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform =
        TwitterPlatform::with_base_urls(reqwest::Client::new(), server.uri(), server.uri());
    let receipt = platform
        .publish(&text_content(), &auth(PlatformId::Twitter, "42"))
        .await
        .unwrap();

    assert_eq!(receipt.post_id, "1234567890");
    assert_eq!(receipt.url, "https://twitter.com/i/web/status/1234567890");
}

#[tokio::test]
async fn twitter_uploads_image_before_tweeting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "media_id_string": "media-9"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(serde_json::json!({
            "text": "Launch\n\nWe shipped\n\n#rust",
            "media": { "media_ids": ["media-9"] }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": { "id": "77", "text": "Launch" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform =
        TwitterPlatform::with_base_urls(reqwest::Client::new(), server.uri(), server.uri());
    let content = text_content().with_media(MediaAttachment::new(
        "pic.png",
        "image/png",
        vec![1, 2, 3],
    ));
    let receipt = platform
        .publish(&content, &auth(PlatformId::Twitter, "42"))
        .await
        .unwrap();
    assert_eq!(receipt.post_id, "77");
}

#[tokio::test]
async fn twitter_rate_limit_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "detail": "Too Many Requests"
        })))
        .mount(&server)
        .await;

    let platform =
        TwitterPlatform::with_base_urls(reqwest::Client::new(), server.uri(), server.uri());
    let err = platform
        .publish(&text_content(), &auth(PlatformId::Twitter, "42"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Rate limit exceeded"));
    assert!(err.to_string().contains("Too Many Requests"));
}

#[tokio::test]
async fn twitter_rejected_token_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "title": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let platform =
        TwitterPlatform::with_base_urls(reqwest::Client::new(), server.uri(), server.uri());
    let err = platform
        .publish(&text_content(), &auth(PlatformId::Twitter, "42"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Authentication failed"));
}

#[tokio::test]
async fn linkedin_share_sends_restli_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(header("x-restli-protocol-version", "2.0.0"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "urn:li:share:555"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = LinkedinPlatform::with_base_url(reqwest::Client::new(), server.uri());
    let receipt = platform
        .publish(&text_content(), &auth(PlatformId::Linkedin, "abc"))
        .await
        .unwrap();
    assert_eq!(receipt.post_id, "urn:li:share:555");
    assert_eq!(
        receipt.url,
        "https://linkedin.com/feed/update/urn:li:share:555"
    );
}

#[tokio::test]
async fn facebook_posts_to_user_feed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fb-user/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "fb-user_987"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = FacebookPlatform::with_base_url(reqwest::Client::new(), server.uri());
    let receipt = platform
        .publish(&text_content(), &auth(PlatformId::Facebook, "fb-user"))
        .await
        .unwrap();
    assert_eq!(receipt.url, "https://facebook.com/fb-user_987");
}

#[tokio::test]
async fn facebook_provider_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fb-user/feed"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "message": "Invalid parameter", "code": 100 }
        })))
        .mount(&server)
        .await;

    let platform = FacebookPlatform::with_base_url(reqwest::Client::new(), server.uri());
    let err = platform
        .publish(&text_content(), &auth(PlatformId::Facebook, "fb-user"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid parameter"));
}

#[tokio::test]
async fn instagram_publishes_in_two_phases() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/page-1/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "container-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/page-1/media_publish"))
        .and(body_json(serde_json::json!({
            "creation_id": "container-1",
            "access_token": "test-token"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "ig-post-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = InstagramPlatform::with_base_url(reqwest::Client::new(), server.uri());
    let content = text_content().with_media(MediaAttachment::new(
        "photo.jpg",
        "image/jpeg",
        vec![9, 9, 9],
    ));
    let receipt = platform
        .publish(&content, &auth(PlatformId::Instagram, "page-1"))
        .await
        .unwrap();
    assert_eq!(receipt.url, "https://instagram.com/p/ig-post-1");
}

#[tokio::test]
async fn youtube_multipart_upload_returns_video() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/videos"))
        .and(query_param("uploadType", "multipart"))
        .and(query_param("part", "snippet,status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "vid-1",
            "snippet": { "title": "Launch" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = YoutubePlatform::with_base_url(reqwest::Client::new(), server.uri());
    let content = text_content().with_media(MediaAttachment::new(
        "clip.mp4",
        "video/mp4",
        vec![0u8; 64],
    ));
    let receipt = platform
        .publish(&content, &auth(PlatformId::Youtube, "chan-1"))
        .await
        .unwrap();
    assert_eq!(receipt.post_id, "vid-1");
    assert_eq!(receipt.url, "https://youtube.com/watch?v=vid-1");
}
