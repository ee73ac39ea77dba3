//! Authorization-code exchange and token refresh for each provider.
//!
//! Every flow is the same two steps: trade the code for tokens, then look up
//! the account identity so the caller gets a complete [`PlatformAuth`].
//! Provider endpoints are injectable so tests can point them at a local mock
//! server.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::pkce::Pkce;
use crate::auth::state::StateStore;
use crate::config::Config;
use crate::error::{AuthError, Result};
use crate::types::{PlatformAuth, PlatformId};

const HOUR_MS: i64 = 3_600_000;
const SIXTY_DAYS_MS: i64 = 60 * 24 * 60 * 60 * 1000;

/// Base URLs for the upstream OAuth and identity endpoints.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub google_token_url: String,
    pub youtube_api_base: String,
    pub twitter_token_url: String,
    pub twitter_api_base: String,
    pub linkedin_token_url: String,
    pub linkedin_api_base: String,
    pub facebook_graph_base: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            google_token_url: "https://oauth2.googleapis.com/token".to_string(),
            youtube_api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            twitter_token_url: "https://api.twitter.com/2/oauth2/token".to_string(),
            twitter_api_base: "https://api.twitter.com/2".to_string(),
            linkedin_token_url: "https://www.linkedin.com/oauth/v2/accessToken".to_string(),
            linkedin_api_base: "https://api.linkedin.com/v2".to_string(),
            facebook_graph_base: "https://graph.facebook.com/v18.0".to_string(),
        }
    }
}

/// Body of a `POST /auth/{platform}/callback` request.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    pub code: String,
    #[serde(default)]
    pub state: Option<String>,
    pub redirect_uri: String,
}

/// State issued to a client before it starts an authorization flow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedState {
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn expires_at_ms(&self, default_ms: i64) -> i64 {
        let lifetime = self.expires_in.map(|s| s * 1000).unwrap_or(default_ms);
        chrono::Utc::now().timestamp_millis() + lifetime
    }
}

pub struct OAuthService {
    http: reqwest::Client,
    config: Config,
    states: StateStore,
    endpoints: ProviderEndpoints,
}

impl OAuthService {
    pub fn new(config: Config) -> Self {
        Self::with_endpoints(config, ProviderEndpoints::default())
    }

    pub fn with_endpoints(config: Config, endpoints: ProviderEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            states: StateStore::new(),
            endpoints,
        }
    }

    pub fn state_store(&self) -> &StateStore {
        &self.states
    }

    /// Issue a state token and PKCE verifier for a client about to redirect
    /// the user to a provider's consent page.
    pub async fn generate_state(&self) -> IssuedState {
        let (state, pkce) = self.states.issue().await;
        IssuedState {
            state,
            code_verifier: pkce.verifier().to_string(),
        }
    }

    /// Complete an authorization-code flow for the given platform.
    pub async fn handle_callback(
        &self,
        platform: PlatformId,
        request: CallbackRequest,
    ) -> Result<PlatformAuth> {
        info!(platform = %platform, "Handling OAuth callback");
        let auth = match platform {
            PlatformId::Youtube => self.youtube_callback(&request).await?,
            PlatformId::Twitter => self.twitter_callback(&request).await?,
            PlatformId::Linkedin => self.linkedin_callback(&request).await?,
            PlatformId::Facebook => self.facebook_callback(&request).await?,
            PlatformId::Instagram => self.instagram_callback(&request).await?,
        };
        debug!(platform = %platform, user_id = %auth.user_id, "OAuth callback complete");
        Ok(auth)
    }

    /// Refresh an access token. Only YouTube and Twitter issue refresh
    /// tokens in these flows.
    pub async fn refresh(&self, platform: PlatformId, refresh_token: &str) -> Result<PlatformAuth> {
        match platform {
            PlatformId::Youtube => self.youtube_refresh(refresh_token).await,
            PlatformId::Twitter => self.twitter_refresh(refresh_token).await,
            _ => Err(AuthError::Exchange(format!(
                "Token refresh is not supported for {}",
                platform
            ))
            .into()),
        }
    }

    async fn youtube_callback(&self, request: &CallbackRequest) -> Result<PlatformAuth> {
        let creds = self.config.credentials_for(PlatformId::Youtube)?;

        let response = self
            .http
            .post(&self.endpoints.google_token_url)
            .form(&[
                ("code", request.code.as_str()),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", request.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(network_error)?;
        let tokens = read_token_response(response).await?;

        #[derive(Deserialize)]
        struct ChannelList {
            items: Vec<Channel>,
        }
        #[derive(Deserialize)]
        struct Channel {
            id: String,
            snippet: ChannelSnippet,
        }
        #[derive(Deserialize)]
        struct ChannelSnippet {
            title: String,
        }

        let channels: ChannelList = self
            .http
            .get(format!("{}/channels", self.endpoints.youtube_api_base))
            .query(&[("part", "snippet,statistics"), ("mine", "true")])
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(network_error)?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("Channel lookup failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("Channel lookup failed: {}", e)))?;

        let channel = channels
            .items
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Exchange("No YouTube channel for this account".to_string()))?;

        let expires_at = tokens.expires_at_ms(HOUR_MS);
        Ok(PlatformAuth::new(
            PlatformId::Youtube,
            tokens.access_token,
            tokens.refresh_token,
            expires_at,
            channel.id,
            channel.snippet.title,
        ))
    }

    async fn twitter_callback(&self, request: &CallbackRequest) -> Result<PlatformAuth> {
        let creds = self.config.credentials_for(PlatformId::Twitter)?;

        let state = request
            .state
            .as_deref()
            .ok_or(AuthError::InvalidState)?;
        // Revalidate the stored verifier before it goes upstream
        let pkce = Pkce::from_verifier(&self.states.consume(state).await?)?;

        let response = self
            .http
            .post(&self.endpoints.twitter_token_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("code", request.code.as_str()),
                ("grant_type", "authorization_code"),
                ("client_id", creds.client_id.as_str()),
                ("redirect_uri", request.redirect_uri.as_str()),
                ("code_verifier", pkce.verifier()),
            ])
            .send()
            .await
            .map_err(network_error)?;
        let tokens = read_token_response(response).await?;

        #[derive(Deserialize)]
        struct UserResponse {
            data: UserData,
        }
        #[derive(Deserialize)]
        struct UserData {
            id: String,
            username: String,
        }

        let user: UserResponse = self
            .http
            .get(format!("{}/users/me", self.endpoints.twitter_api_base))
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(network_error)?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("User lookup failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("User lookup failed: {}", e)))?;

        let expires_at = tokens.expires_at_ms(2 * HOUR_MS);
        Ok(PlatformAuth::new(
            PlatformId::Twitter,
            tokens.access_token,
            tokens.refresh_token,
            expires_at,
            user.data.id,
            user.data.username,
        ))
    }

    async fn linkedin_callback(&self, request: &CallbackRequest) -> Result<PlatformAuth> {
        let creds = self.config.credentials_for(PlatformId::Linkedin)?;

        let response = self
            .http
            .post(&self.endpoints.linkedin_token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", request.code.as_str()),
                ("redirect_uri", request.redirect_uri.as_str()),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(network_error)?;
        let tokens = read_token_response(response).await?;

        #[derive(Deserialize)]
        struct Profile {
            id: String,
            #[serde(rename = "localizedFirstName")]
            first_name: String,
            #[serde(rename = "localizedLastName")]
            last_name: String,
        }

        let profile: Profile = self
            .http
            .get(format!("{}/people/~", self.endpoints.linkedin_api_base))
            .bearer_auth(&tokens.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(network_error)?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("Profile lookup failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("Profile lookup failed: {}", e)))?;

        let expires_at = tokens.expires_at_ms(SIXTY_DAYS_MS);
        Ok(PlatformAuth::new(
            PlatformId::Linkedin,
            tokens.access_token,
            None,
            expires_at,
            profile.id,
            format!("{} {}", profile.first_name, profile.last_name),
        ))
    }

    async fn facebook_callback(&self, request: &CallbackRequest) -> Result<PlatformAuth> {
        let tokens = self.facebook_exchange(request).await?;

        #[derive(Deserialize)]
        struct User {
            id: String,
            name: String,
        }

        let user: User = self
            .http
            .get(format!("{}/me", self.endpoints.facebook_graph_base))
            .query(&[
                ("fields", "id,name,picture"),
                ("access_token", tokens.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(network_error)?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("User lookup failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("User lookup failed: {}", e)))?;

        Ok(PlatformAuth::new(
            PlatformId::Facebook,
            tokens.access_token,
            None,
            chrono::Utc::now().timestamp_millis() + SIXTY_DAYS_MS,
            user.id,
            user.name,
        ))
    }

    async fn instagram_callback(&self, request: &CallbackRequest) -> Result<PlatformAuth> {
        let tokens = self.facebook_exchange(request).await?;

        #[derive(Deserialize)]
        struct PageList {
            data: Vec<Page>,
        }
        #[derive(Deserialize)]
        struct Page {
            id: String,
            name: String,
            access_token: String,
        }

        let pages: PageList = self
            .http
            .get(format!("{}/me/accounts", self.endpoints.facebook_graph_base))
            .query(&[("access_token", tokens.access_token.as_str())])
            .send()
            .await
            .map_err(network_error)?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("Page lookup failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("Page lookup failed: {}", e)))?;

        // Publishing goes through the first linked page's token.
        let page = pages
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Exchange("No Facebook page with Instagram access".to_string()))?;

        Ok(PlatformAuth::new(
            PlatformId::Instagram,
            page.access_token,
            None,
            chrono::Utc::now().timestamp_millis() + SIXTY_DAYS_MS,
            page.id,
            page.name,
        ))
    }

    /// Instagram business accounts authenticate through the Facebook app.
    async fn facebook_exchange(&self, request: &CallbackRequest) -> Result<TokenResponse> {
        let creds = self.config.credentials_for(PlatformId::Facebook)?;

        let response = self
            .http
            .get(format!(
                "{}/oauth/access_token",
                self.endpoints.facebook_graph_base
            ))
            .query(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", request.redirect_uri.as_str()),
                ("code", request.code.as_str()),
            ])
            .send()
            .await
            .map_err(network_error)?;
        read_token_response(response).await
    }

    async fn youtube_refresh(&self, refresh_token: &str) -> Result<PlatformAuth> {
        let creds = self.config.credentials_for(PlatformId::Youtube)?;

        let response = self
            .http
            .post(&self.endpoints.google_token_url)
            .form(&[
                ("refresh_token", refresh_token),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(network_error)?;
        let tokens = read_token_response(response).await?;

        let expires_at = tokens.expires_at_ms(HOUR_MS);
        // Google only returns a new refresh token sometimes; keep the old one.
        let refresh = tokens
            .refresh_token
            .clone()
            .or_else(|| Some(refresh_token.to_string()));
        Ok(PlatformAuth::new(
            PlatformId::Youtube,
            tokens.access_token,
            refresh,
            expires_at,
            "",
            "",
        ))
    }

    async fn twitter_refresh(&self, refresh_token: &str) -> Result<PlatformAuth> {
        let creds = self.config.credentials_for(PlatformId::Twitter)?;

        let response = self
            .http
            .post(&self.endpoints.twitter_token_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
                ("client_id", creds.client_id.as_str()),
            ])
            .send()
            .await
            .map_err(network_error)?;
        let tokens = read_token_response(response).await?;

        let expires_at = tokens.expires_at_ms(2 * HOUR_MS);
        Ok(PlatformAuth::new(
            PlatformId::Twitter,
            tokens.access_token,
            tokens.refresh_token.clone(),
            expires_at,
            "",
            "",
        ))
    }
}

fn network_error(err: reqwest::Error) -> AuthError {
    AuthError::Network(err.to_string())
}

async fn read_token_response(response: reqwest::Response) -> Result<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if body.contains("invalid_grant") {
            return Err(AuthError::Expired("invalid_grant".to_string()).into());
        }
        return Err(AuthError::Exchange(format!(
            "Token endpoint returned {}: {}",
            status, body
        ))
        .into());
    }
    let tokens = response
        .json()
        .await
        .map_err(|e| AuthError::Exchange(format!("Malformed token response: {}", e)))?;
    Ok(tokens)
}
