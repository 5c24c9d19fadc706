//! Configuration management for Lambda functions.

use std::env;

use crate::secrets;
use crate::{Error, Result};

pub const DEFAULT_TABLE_NAME: &str = "Shows";
pub const DEFAULT_FROM_EMAIL: &str = "noreply@comedyshows.com";
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";
pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3";

/// Airtable connection settings for the show gateway.
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    /// Personal access token / API key
    pub api_key: String,
    /// Base identifier (`app...`)
    pub base_id: String,
    /// Table holding the show records
    pub table_name: String,
    /// REST endpoint, overridable for tests
    pub api_url: String,
}

impl AirtableConfig {
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            api_url: AIRTABLE_API_URL.to_string(),
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build from a variable lookup, with `api_key` already resolved.
    pub fn from_lookup<F>(api_key: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("AIRTABLE_API_KEY not set".to_string()))?;
        let base_id = non_empty(&lookup, "AIRTABLE_BASE_ID")
            .ok_or_else(|| Error::Config("AIRTABLE_BASE_ID not set".to_string()))?;

        let mut config = Self::new(api_key, base_id);
        if let Some(table_name) = non_empty(&lookup, "AIRTABLE_TABLE_NAME") {
            config = config.with_table_name(table_name);
        }
        if let Some(api_url) = non_empty(&lookup, "AIRTABLE_API_URL") {
            config = config.with_api_url(api_url);
        }
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to
    /// Secrets Manager for the API key.
    pub async fn load() -> Result<Self> {
        let api_key = secrets::resolve_api_key("AIRTABLE_API_KEY", "airtable_api_key").await?;
        Self::from_lookup(api_key, |name| env::var(name).ok())
    }
}

/// SendGrid settings for the invite mailer.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// API key; when absent every send fails with a configuration error
    pub api_key: Option<String>,
    /// Sender address
    pub from_email: String,
    /// REST endpoint, overridable for tests
    pub api_url: String,
    /// Ticket link used when the show has none
    pub fallback_ticket_url: Option<String>,
}

impl SendGridConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            api_url: SENDGRID_API_URL.to_string(),
            fallback_ticket_url: None,
        }
    }

    pub fn with_from_email(mut self, from_email: impl Into<String>) -> Self {
        self.from_email = from_email.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_fallback_ticket_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_ticket_url = Some(url.into());
        self
    }

    /// Build from a variable lookup, with `api_key` already resolved.
    pub fn from_lookup<F>(api_key: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(api_key);
        if let Some(from_email) = non_empty(&lookup, "FROM_EMAIL") {
            config = config.with_from_email(from_email);
        }
        if let Some(api_url) = non_empty(&lookup, "SENDGRID_API_URL") {
            config = config.with_api_url(api_url);
        }
        if let Some(url) = non_empty(&lookup, "DEFAULT_TICKET_URL") {
            config = config.with_fallback_ticket_url(url);
        }
        config
    }

    /// Load configuration from environment variables, falling back to
    /// Secrets Manager for the API key.
    pub async fn load() -> Result<Self> {
        let api_key = secrets::resolve_api_key("SENDGRID_API_KEY", "sendgrid_api_key").await?;
        Ok(Self::from_lookup(api_key, |name| env::var(name).ok()))
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}
