//! Configuration management for Omnipost

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::types::PlatformId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed to call the API.
    pub frontend_url: String,
    /// Maximum accepted media upload, in bytes.
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            frontend_url: "http://localhost:3000".to_string(),
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub youtube: Option<ProviderCredentials>,
    pub twitter: Option<ProviderCredentials>,
    pub linkedin: Option<ProviderCredentials>,
    pub facebook: Option<ProviderCredentials>,
    pub instagram: Option<ProviderCredentials>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub platforms: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platforms: vec!["twitter".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            oauth: OAuthConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }

    /// Credentials for one provider, with `{PLATFORM}_CLIENT_ID` /
    /// `{PLATFORM}_CLIENT_SECRET` environment variables taking precedence
    /// over the config file.
    pub fn credentials_for(&self, platform: PlatformId) -> Result<ProviderCredentials> {
        let from_file = match platform {
            PlatformId::Youtube => self.oauth.youtube.clone(),
            PlatformId::Twitter => self.oauth.twitter.clone(),
            PlatformId::Linkedin => self.oauth.linkedin.clone(),
            PlatformId::Facebook => self.oauth.facebook.clone(),
            PlatformId::Instagram => self.oauth.instagram.clone(),
        };

        let prefix = platform.as_str().to_uppercase();
        let env_id = std::env::var(format!("{}_CLIENT_ID", prefix)).ok();
        let env_secret = std::env::var(format!("{}_CLIENT_SECRET", prefix)).ok();
        let env_redirect = std::env::var(format!("{}_REDIRECT_URI", prefix)).ok();

        let mut creds = from_file.unwrap_or_default();
        if let Some(id) = env_id {
            creds.client_id = id;
        }
        if let Some(secret) = env_secret {
            creds.client_secret = secret;
        }
        if env_redirect.is_some() {
            creds.redirect_uri = env_redirect;
        }

        if creds.client_id.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "oauth.{}.client_id",
                platform.as_str()
            ))
            .into());
        }
        if creds.client_secret.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "oauth.{}.client_secret",
                platform.as_str()
            ))
            .into());
        }

        Ok(creds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("OMNIPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("omnipost").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            frontend_url = "https://dash.example.com"
            max_upload_bytes = 1048576

            [oauth.twitter]
            client_id = "tw-id"
            client_secret = "tw-secret"
            redirect_uri = "https://dash.example.com/callback"

            [defaults]
            platforms = ["twitter", "linkedin"]
            "#,
        );

        let config = Config::load_from_path(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_upload_bytes, 1_048_576);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.defaults.platforms, vec!["twitter", "linkedin"]);

        let twitter = config.oauth.twitter.unwrap();
        assert_eq!(twitter.client_id, "tw-id");
        assert_eq!(
            twitter.redirect_uri.as_deref(),
            Some("https://dash.example.com/callback")
        );
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let file = write_config("");
        let config = Config::load_from_path(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_upload_bytes, 100 * 1024 * 1024);
        assert!(config.oauth.twitter.is_none());
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = write_config("server = not toml");
        let result = Config::load_from_path(&file.path().to_path_buf());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load_from_path(&PathBuf::from("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_credentials_env_override() {
        std::env::set_var("LINKEDIN_CLIENT_ID", "env-id");
        std::env::set_var("LINKEDIN_CLIENT_SECRET", "env-secret");

        let config = Config::default_config();
        let creds = config.credentials_for(PlatformId::Linkedin).unwrap();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.client_secret, "env-secret");

        std::env::remove_var("LINKEDIN_CLIENT_ID");
        std::env::remove_var("LINKEDIN_CLIENT_SECRET");
    }

    #[test]
    #[serial]
    fn test_credentials_missing() {
        std::env::remove_var("FACEBOOK_CLIENT_ID");
        std::env::remove_var("FACEBOOK_CLIENT_SECRET");

        let config = Config::default_config();
        let result = config.credentials_for(PlatformId::Facebook);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_env_override() {
        std::env::set_var("OMNIPOST_CONFIG", "/tmp/omnipost-test.toml");
        let path = resolve_config_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/omnipost-test.toml"));
        std::env::remove_var("OMNIPOST_CONFIG");
    }
}
