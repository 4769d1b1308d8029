use anyhow::{Context, Result};

/// Gemini's inline-data ceiling.
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
/// Provider keys are optional here; a missing key fails at call time instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub cohere_api_key: Option<String>,
    pub cohere_model: String,
    pub cohere_api_base: String,
    pub llm_max_attempts: u32,
    pub llm_timeout_secs: u64,
    pub question_count: u32,
    /// Upper bound for a recorded-answer upload, in bytes.
    pub max_audio_bytes: usize,
    /// Answer sessions untouched for this long are evicted.
    pub session_idle_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_api_base: env_or(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com",
            ),
            cohere_api_key: optional_env("COHERE_API_KEY"),
            cohere_model: env_or("COHERE_MODEL", "command"),
            cohere_api_base: env_or("COHERE_API_BASE", "https://api.cohere.ai"),
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 3)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            question_count: parse_env("QUESTION_COUNT", 5)?,
            max_audio_bytes: parse_env("MAX_AUDIO_BYTES", DEFAULT_MAX_AUDIO_BYTES)?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", 3600)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset so an empty `GEMINI_API_KEY=` line behaves like a missing key.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
