use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::entities::anthropic::AnthropicConfig;
use crate::pdf::PageFailurePolicy;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend/build";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_MAX_RETAINED_BATCHES: usize = 32;

#[derive(Clone, Debug)]
pub struct ExtractorConfig {
    pub anthropic_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub upload_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub page_policy: PageFailurePolicy,
    pub max_retained_batches: usize,
}

impl ExtractorConfig {
    /// Config with every optional setting at its default.
    pub fn new(anthropic_key: impl Into<String>) -> Self {
        Self {
            anthropic_key: anthropic_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            frontend_dir: PathBuf::from(DEFAULT_FRONTEND_DIR),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            page_policy: PageFailurePolicy::default(),
            max_retained_batches: DEFAULT_MAX_RETAINED_BATCHES,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let anthropic_key = lookup("ANTHROPIC_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("ANTHROPIC_API_KEY is not set in the environment variables"))?;

        let model = lookup("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = lookup("ANTHROPIC_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .with_context(|| format!("ANTHROPIC_BASE_URL is not a valid URL: {}", base_url))?;

        let upload_dir =
            PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()));
        let frontend_dir = PathBuf::from(
            lookup("FRONTEND_DIR").unwrap_or_else(|| DEFAULT_FRONTEND_DIR.to_string()),
        );

        Ok(Self {
            anthropic_key,
            model,
            base_url,
            max_tokens: parse_or(&lookup, "ANTHROPIC_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            upload_dir,
            frontend_dir,
            bind_addr: parse_or(
                &lookup,
                "BIND_ADDR",
                SocketAddr::from_str(DEFAULT_BIND_ADDR)?,
            )?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            page_policy: parse_or(&lookup, "PAGE_FAILURE_POLICY", PageFailurePolicy::default())?,
            max_retained_batches: parse_or(
                &lookup,
                "MAX_RETAINED_BATCHES",
                DEFAULT_MAX_RETAINED_BATCHES,
            )?,
        })
    }

    pub fn anthropic(&self) -> AnthropicConfig {
        AnthropicConfig {
            api_key: self.anthropic_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for {}: {:?} ({})", key, raw, e)),
        None => Ok(default),
    }
}
