use std::str::FromStr;

use anyhow::{Context, Result};

/// Hosted Mixtral instruct endpoint used when `INFERENCE_URL` is not set.
pub const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mixtral-8x7B-Instruct-v0.1";

/// Upper bound on jobs rendered into a single prompt.
pub const MAX_JOB_SAMPLE_SIZE: usize = 20;

/// Upper bound on retries of a failed inference call.
pub const MAX_INFERENCE_RETRIES: u32 = 5;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub huggingface_api_key: String,
    pub inference: InferenceConfig,
    /// Jobs sampled from the store for each prompt, clamped to `1..=MAX_JOB_SAMPLE_SIZE`.
    pub job_sample_size: usize,
    /// Allowed browser origins. Empty means permissive CORS.
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

/// Settings for the outbound text-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub url: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_INFERENCE_URL.to_string(),
            max_new_tokens: 1000,
            temperature: 0.3,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl InferenceConfig {
    /// Clamps the timeout to at least one second and retries to `MAX_INFERENCE_RETRIES`.
    pub fn bounded(self) -> Self {
        Self {
            timeout_secs: self.timeout_secs.max(1),
            max_retries: self.max_retries.min(MAX_INFERENCE_RETRIES),
            ..self
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = InferenceConfig::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            huggingface_api_key: require_env("HUGGINGFACE_API_KEY")?,
            inference: InferenceConfig {
                url: std::env::var("INFERENCE_URL").unwrap_or(defaults.url),
                max_new_tokens: parse_env("INFERENCE_MAX_NEW_TOKENS", defaults.max_new_tokens)?,
                temperature: parse_env("INFERENCE_TEMPERATURE", defaults.temperature)?,
                timeout_secs: parse_env("INFERENCE_TIMEOUT_SECS", defaults.timeout_secs)?,
                max_retries: parse_env("INFERENCE_MAX_RETRIES", defaults.max_retries)?,
            }
            .bounded(),
            job_sample_size: parse_env("JOB_SAMPLE_SIZE", MAX_JOB_SAMPLE_SIZE)?
                .clamp(1, MAX_JOB_SAMPLE_SIZE),
            cors_origins: parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_default()),
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins(" http://localhost:5173 , https://jobs.example.com,,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://jobs.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: u32 = parse_env("JOBMATCH_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_inference_defaults() {
        let defaults = InferenceConfig::default();
        assert_eq!(defaults.url, DEFAULT_INFERENCE_URL);
        assert_eq!(defaults.max_new_tokens, 1000);
        assert!((defaults.temperature - 0.3).abs() < f32::EPSILON);
        assert!(defaults.timeout_secs > 0);
        assert_eq!(defaults.clone().bounded(), defaults);
    }

    #[test]
    fn test_inference_bounds_are_enforced() {
        let config = InferenceConfig {
            timeout_secs: 0,
            max_retries: 40,
            ..InferenceConfig::default()
        }
        .bounded();

        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.max_retries, MAX_INFERENCE_RETRIES);
    }
}
