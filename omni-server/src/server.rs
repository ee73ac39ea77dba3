use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use libomnipost::auth::OAuthService;
use libomnipost::platforms::facebook::FacebookPlatform;
use libomnipost::platforms::instagram::InstagramPlatform;
use libomnipost::platforms::linkedin::LinkedinPlatform;
use libomnipost::platforms::twitter::TwitterPlatform;
use libomnipost::platforms::youtube::YoutubePlatform;
use libomnipost::platforms::PlatformRegistry;
use libomnipost::poster::CrossPoster;
use libomnipost::Config;

use crate::routes;

/// Shared state behind every route.
///
/// The concrete adapter handles exist alongside the registry so the
/// single-platform routes can reach adapter-specific calls (media upload,
/// two-phase publish) without downcasting.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub poster: Arc<CrossPoster>,
    pub oauth: Arc<OAuthService>,
    pub youtube: Arc<YoutubePlatform>,
    pub twitter: Arc<TwitterPlatform>,
    pub linkedin: Arc<LinkedinPlatform>,
    pub facebook: Arc<FacebookPlatform>,
    pub instagram: Arc<InstagramPlatform>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        let oauth = OAuthService::new(config.clone());
        Self::with_adapters(
            config,
            oauth,
            Arc::new(YoutubePlatform::new(http.clone())),
            Arc::new(TwitterPlatform::new(http.clone())),
            Arc::new(LinkedinPlatform::new(http.clone())),
            Arc::new(FacebookPlatform::new(http.clone())),
            Arc::new(InstagramPlatform::new(http)),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_adapters(
        config: Config,
        oauth: OAuthService,
        youtube: Arc<YoutubePlatform>,
        twitter: Arc<TwitterPlatform>,
        linkedin: Arc<LinkedinPlatform>,
        facebook: Arc<FacebookPlatform>,
        instagram: Arc<InstagramPlatform>,
    ) -> Self {
        let mut registry = PlatformRegistry::new();
        registry.register(youtube.clone());
        registry.register(twitter.clone());
        registry.register(linkedin.clone());
        registry.register(facebook.clone());
        registry.register(instagram.clone());

        Self {
            config: Arc::new(config),
            poster: Arc::new(CrossPoster::new(registry)),
            oauth: Arc::new(oauth),
            youtube,
            twitter,
            linkedin,
            facebook,
            instagram,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.config.server.max_upload_bytes
    }
}

/// Assemble the full route tree.
pub fn build_router(state: AppState) -> Router {
    // The body limit sits above the upload cap so oversize uploads reach the
    // handler and come back as 400 instead of a bare 413.
    let body_limit = state.max_upload_bytes() as usize + 1024 * 1024;

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes::api::router())
        .nest("/auth", routes::auth::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = self.config.bind_address();
        let state = AppState::new(self.config.clone());
        let app = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        info!("Server listening on http://{}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn health(State(_state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "omni-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
