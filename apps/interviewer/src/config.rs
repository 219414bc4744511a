use anyhow::{Context, Result};
use rand::seq::SliceRandom;

/// Recruiter first names the persona is drawn from when `RECRUITER_NAME` is unset.
pub const RECRUITER_ROSTER: &[&str] = &[
    "Emma",
    "Zoe",
    "Ava",
    "Sophia",
    "Mia",
    "Luna",
    "Olivia",
    "Isabella",
    "Charlotte",
    "Amelia",
];

const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_LLM_MODEL: &str = "deepseek-chat";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    /// Persona name used in every prompt for the lifetime of the process.
    pub recruiter_name: String,
    pub chunk_size: usize,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_base_url: env_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            recruiter_name: std::env::var("RECRUITER_NAME")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(pick_recruiter_name),
            chunk_size: env_or("CHUNK_SIZE", "512")
                .parse::<usize>()
                .context("CHUNK_SIZE must be a positive integer")?,
            allowed_origins: parse_origins(&env_or("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn pick_recruiter_name() -> String {
    RECRUITER_ROSTER
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Emma")
        .to_string()
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
