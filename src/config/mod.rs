// src/config/mod.rs
// All tunables load from the environment (after .env), once, at startup.
// The two credentials (GROQ_API_KEY, DATABASE_URL) have no defaults on
// purpose: a missing key must surface as an explicit error, never as a
// silently-defaulted value.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct PrismConfig {
    // ── Completion provider
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    // Connect timeout only: completion streams stay open far longer than
    // any sane whole-request timeout
    pub groq_connect_timeout_secs: u64,

    // ── Database
    pub database_url: Option<String>,

    // ── Models
    pub persona_model: String,
    pub debate_model: String,
    pub perspective_model: String,
    pub model_families: String,

    // ── Server
    pub host: String,
    pub port: u16,

    // ── CORS
    pub cors_origin: String,

    // ── Logging
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            // Tolerate trailing comments and whitespace in .env values
            let clean = val.split('#').next().unwrap_or("").trim();
            clean.parse::<T>().unwrap_or(default)
        }
        Err(_) => default,
    }
}

fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PrismConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            groq_api_key: env_var_opt("GROQ_API_KEY"),
            groq_base_url: env_var_or(
                "GROQ_BASE_URL",
                "https://api.groq.com/openai/v1".to_string(),
            ),
            groq_connect_timeout_secs: env_var_or("PRISM_CONNECT_TIMEOUT_SECS", 10),
            database_url: env_var_opt("DATABASE_URL"),
            persona_model: env_var_or("PRISM_PERSONA_MODEL", "llama-3.3-70b-versatile".to_string()),
            debate_model: env_var_or(
                "PRISM_DEBATE_MODEL",
                "meta-llama/llama-4-maverick-17b-128e-instruct".to_string(),
            ),
            perspective_model: env_var_or(
                "PRISM_PERSPECTIVE_MODEL",
                "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            ),
            model_families: env_var_or("PRISM_MODEL_FAMILIES", "llama,gemma".to_string()),
            host: env_var_or("PRISM_HOST", "0.0.0.0".to_string()),
            port: env_var_or("PRISM_PORT", 3001),
            cors_origin: env_var_or("PRISM_CORS_ORIGIN", "*".to_string()),
            log_level: env_var_or("PRISM_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Substrings a model id must contain to show up in the catalog endpoint
    pub fn family_markers(&self) -> Vec<String> {
        self.model_families
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Database URL, or an error if the environment never provided one.
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not configured"))
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<PrismConfig> = Lazy::new(PrismConfig::from_env);
