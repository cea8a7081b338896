use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::embedding::DEFAULT_DIMENSION;
use crate::matching::extractor::MatchMode;

/// Longest accepted per-request analysis deadline (one day).
pub const MAX_ANALYSIS_TIMEOUT_SECS: u64 = 86_400;

/// Which embedding backend the service talks to.
#[derive(Debug, Clone)]
pub enum EmbeddingBackend {
    Hash,
    Remote { url: String, api_key: Option<String> },
}

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_dimension: usize,
    pub embedding_serialize: bool,
    pub skill_match_mode: MatchMode,
    pub skill_vocabulary_path: Option<PathBuf>,
    /// `None` disables the per-request deadline.
    pub analysis_timeout_secs: Option<u64>,
    pub session_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let embedding_backend = match optional_env("EMBEDDING_BACKEND").as_deref() {
            None | Some("hash") => EmbeddingBackend::Hash,
            Some("remote") => EmbeddingBackend::Remote {
                url: require_env("EMBEDDING_URL")?,
                api_key: optional_env("EMBEDDING_API_KEY"),
            },
            Some(other) => anyhow::bail!(
                "EMBEDDING_BACKEND must be 'hash' or 'remote', got '{other}'"
            ),
        };

        let skill_match_mode = match optional_env("SKILL_MATCH_MODE") {
            Some(raw) => raw.parse::<MatchMode>().map_err(anyhow::Error::msg)?,
            None => MatchMode::default(),
        };

        let analysis_timeout_secs =
            analysis_timeout(parse_env("ANALYSIS_TIMEOUT_SECS", 30_u64)?)?;

        Ok(Config {
            port: parse_env("PORT", 8080_u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            embedding_backend,
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", DEFAULT_DIMENSION)?,
            embedding_serialize: parse_env("EMBEDDING_SERIALIZE", false)?,
            skill_match_mode,
            skill_vocabulary_path: optional_env("SKILL_VOCABULARY_PATH").map(PathBuf::from),
            analysis_timeout_secs,
            session_idle_ttl_secs: parse_env("SESSION_IDLE_TTL_SECS", 86_400_u64)?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            embedding_backend: EmbeddingBackend::Hash,
            embedding_dimension: DEFAULT_DIMENSION,
            embedding_serialize: false,
            skill_match_mode: MatchMode::Substring,
            skill_vocabulary_path: None,
            analysis_timeout_secs: Some(30),
            session_idle_ttl_secs: 86_400,
        }
    }
}

/// `0` disables the deadline; anything above a day is rejected.
fn analysis_timeout(secs: u64) -> Result<Option<u64>> {
    if secs > MAX_ANALYSIS_TIMEOUT_SECS {
        anyhow::bail!(
            "ANALYSIS_TIMEOUT_SECS must be at most {MAX_ANALYSIS_TIMEOUT_SECS}, got {secs}"
        );
    }
    Ok((secs > 0).then_some(secs))
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Environment variable '{key}' is invalid ({raw}): {e}")),
        None => Ok(default),
    }
}
