//! omni-post - Publish a post to multiple social platforms
//!
//! Unix-style tool that takes a title, body text, and a token file, and
//! publishes the post to every requested platform in one shot.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing::warn;

use libomnipost::error::PlatformError;
use libomnipost::platforms::PlatformRegistry;
use libomnipost::types::{media_mime_for_extension, split_tags};
use libomnipost::{
    Config, CrossPoster, MediaAttachment, OmnipostError, PlatformAuth, PlatformId, PostContent,
    PostResult, Result,
};

#[derive(Parser, Debug)]
#[command(name = "omni-post")]
#[command(version)]
#[command(about = "Publish a post to multiple social platforms")]
#[command(long_about = "\
omni-post - Publish a post to multiple social platforms

DESCRIPTION:
    omni-post publishes a single post to every platform you name, in one
    command. Pass the body text as an argument or pipe it on stdin.

USAGE EXAMPLES:
    # Post to every platform in the token file
    omni-post \"Launch day\" \"We shipped v1.0\" --tokens tokens.json

    # Pipe the body from stdin
    cat announcement.txt | omni-post \"Launch day\" --tokens tokens.json

    # Pick platforms and attach media
    omni-post \"Demo\" \"Watch this\" --platforms twitter,youtube \\
        --media demo.mp4 --tokens tokens.json

    # Machine-readable output
    omni-post \"Launch day\" \"We shipped\" --tokens tokens.json --format json

TOKEN FILE:
    JSON object keyed by platform name. Values are either a bare access
    token string or an object:

        {
          \"twitter\": \"ACCESS_TOKEN\",
          \"linkedin\": { \"accessToken\": \"...\", \"userId\": \"abc123\" }
        }

CONFIGURATION:
    Configuration file: ~/.config/omnipost/config.toml
    Override with OMNIPOST_CONFIG.

EXIT CODES:
    0 - All platforms posted successfully
    1 - One or more platforms failed
    2 - Authentication error
    3 - Invalid input

For more information, visit: https://github.com/omnipost/omnipost
")]
struct Cli {
    /// Post title
    title: String,

    /// Post body text (read from stdin when omitted)
    description: Option<String>,

    /// Comma-separated list of tags
    #[arg(short, long)]
    tags: Option<String>,

    /// Comma-separated platforms (default: platforms in the token file)
    #[arg(short, long)]
    platforms: Option<String>,

    /// Path to a JSON token file
    #[arg(long, value_name = "FILE")]
    tokens: PathBuf,

    /// Media file to attach (image or video)
    #[arg(short, long, value_name = "FILE")]
    media: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Token file values: a bare access token or a credential object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenEntry {
    Token(String),
    Auth {
        #[serde(rename = "accessToken")]
        access_token: String,
        #[serde(rename = "refreshToken", default)]
        refresh_token: Option<String>,
        #[serde(rename = "expiresAt", default)]
        expires_at: Option<i64>,
        #[serde(rename = "userId", default)]
        user_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("error")
            .with_writer(std::io::stderr)
            .init();
    }

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    if cli.format != "text" && cli.format != "json" {
        return Err(OmnipostError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            cli.format
        )));
    }

    let description = match cli.description {
        Some(text) => text,
        None => read_stdin()?,
    };
    if cli.title.trim().is_empty() && description.trim().is_empty() {
        return Err(OmnipostError::InvalidInput(
            "No post content provided".to_string(),
        ));
    }

    let tags = cli.tags.as_deref().map(split_tags).unwrap_or_default();
    let content = PostContent::new(cli.title, description, tags);
    let content = match &cli.media {
        Some(path) => content.with_media(read_media(path)?),
        None => content,
    };

    let tokens = read_tokens(&cli.tokens)?;

    let platforms: Vec<String> = match &cli.platforms {
        Some(list) => list
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        None => {
            let config = Config::load()?;
            if config.defaults.platforms.is_empty() {
                let mut names: Vec<String> =
                    tokens.keys().map(|id| id.as_str().to_string()).collect();
                names.sort();
                names
            } else {
                config.defaults.platforms
            }
        }
    };
    if platforms.is_empty() {
        return Err(OmnipostError::InvalidInput(
            "No platforms selected".to_string(),
        ));
    }

    let registry = PlatformRegistry::with_defaults(reqwest::Client::new());
    let poster = CrossPoster::new(registry);
    let results = poster.publish(&content, &platforms, &tokens).await;

    if cli.format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&results)
                .map_err(|e| OmnipostError::InvalidInput(e.to_string()))?
        );
    } else {
        print_results(&results);
    }

    Ok(results.iter().all(|r| r.success))
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| OmnipostError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
    Ok(buffer.trim_end().to_string())
}

fn read_media(path: &Path) -> Result<MediaAttachment> {
    let data = std::fs::read(path).map_err(|e| {
        OmnipostError::InvalidInput(format!("Failed to read media file {}: {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    let mime = path
        .extension()
        .and_then(|ext| media_mime_for_extension(&ext.to_string_lossy()))
        .ok_or_else(|| {
            OmnipostError::Platform(PlatformError::Validation(format!(
                "Unsupported media type: {}",
                path.display()
            )))
        })?;
    Ok(MediaAttachment::new(file_name, mime, data))
}

fn read_tokens(path: &Path) -> Result<HashMap<PlatformId, PlatformAuth>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        OmnipostError::InvalidInput(format!("Failed to read token file {}: {}", path.display(), e))
    })?;
    let entries: HashMap<String, TokenEntry> = serde_json::from_str(&raw).map_err(|e| {
        OmnipostError::InvalidInput(format!("Invalid token file {}: {}", path.display(), e))
    })?;

    let mut tokens = HashMap::new();
    for (name, entry) in entries {
        let Ok(platform) = name.parse::<PlatformId>() else {
            warn!("Ignoring token for unknown platform '{}'", name);
            continue;
        };
        let auth = match entry {
            TokenEntry::Token(access_token) => PlatformAuth::bearer(platform, access_token, ""),
            TokenEntry::Auth {
                access_token,
                refresh_token,
                expires_at,
                user_id,
            } => {
                let expires_at = expires_at
                    .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() + 3_600_000);
                PlatformAuth::new(platform, access_token, refresh_token, expires_at, user_id, "")
            }
        };
        tokens.insert(platform, auth);
    }
    Ok(tokens)
}

fn print_results(results: &[PostResult]) {
    for result in results {
        if result.success {
            let url = result.url.as_deref().unwrap_or("(no url)");
            println!("✓ {}: {}", result.platform, url);
        } else {
            let error = result.error.as_deref().unwrap_or("unknown error");
            println!("✗ {}: {}", result.platform, error);
        }
    }
}
