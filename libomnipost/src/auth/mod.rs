//! OAuth code exchange, token refresh, and PKCE state handling.

pub mod oauth;
pub mod pkce;
pub mod state;

pub use oauth::{CallbackRequest, IssuedState, OAuthService, ProviderEndpoints};
pub use pkce::Pkce;
pub use state::StateStore;
