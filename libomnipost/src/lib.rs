//! Omnipost - publish one piece of content to several social platforms
//!
//! This library provides the core functionality behind the Omnipost backend:
//! platform adapters, the cross-post orchestrator, and OAuth token handling.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod poster;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{OmnipostError, Result};
pub use poster::{CrossPoster, UNSUPPORTED_PLATFORM};
pub use types::{MediaAttachment, PlatformAuth, PlatformId, PostContent, PostResult};
