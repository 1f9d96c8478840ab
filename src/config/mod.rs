//! Configuration module
//!
//! Everything the poll needs is read once here and handed to the pipeline
//! as a [`Settings`] value.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::RouterCredentials;

/// Prefix of every environment variable (`THE_KEY`, `THE_URL`, ...)
const ENV_PREFIX: &str = "THE";

/// Raw values as found in `config/default` and the environment
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    pub key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub thumbprint: Option<String>,
    pub postgres_cs: Option<String>,
}

/// Validated configuration for one poll run
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: RouterCredentials,
    pub database_url: String,
    pub verbose: bool,
}

impl Settings {
    pub fn load(verbose: bool) -> Result<Self, AppError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let raw: RawSettings = settings.try_deserialize()?;
        Self::from_raw(raw, verbose)
    }

    /// Validate raw values. Every missing or blank value is reported at once.
    pub fn from_raw(raw: RawSettings, verbose: bool) -> Result<Self, AppError> {
        let fields = [
            ("KEY", &raw.key),
            ("USERNAME", &raw.username),
            ("PASSWORD", &raw.password),
            ("URL", &raw.url),
            ("THUMBPRINT", &raw.thumbprint),
            ("POSTGRES_CS", &raw.postgres_cs),
        ];
        let missing: Vec<String> = fields
            .iter()
            .filter(|(_, v)| is_blank(v))
            .map(|(name, _)| format!("{}_{}", ENV_PREFIX, name))
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )));
        }

        let take = |v: Option<String>| v.unwrap_or_default().trim().to_string();

        Ok(Self {
            credentials: RouterCredentials {
                encrypted_username: take(raw.username),
                encrypted_password: take(raw.password),
                key: take(raw.key),
                router_address: take(raw.url),
                thumbprint: normalize_thumbprint(&take(raw.thumbprint)),
            },
            database_url: take(raw.postgres_cs),
            verbose,
        })
    }
}

fn is_blank(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Strip `:` separators and whitespace ("AB:CD:..." → "ABCD...")
pub fn normalize_thumbprint(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .collect()
}
