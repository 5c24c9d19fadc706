//! AWS Secrets Manager integration.
//!
//! API keys normally come from the environment. When a key is missing and
//! `CREDENTIALS_SECRET_ARN` is set, the key is read from that JSON secret.

use aws_sdk_secretsmanager::Client as SecretsClient;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::info;

use crate::{Error, Result};

/// Environment variable naming the credentials secret.
pub const CREDENTIALS_SECRET_ARN: &str = "CREDENTIALS_SECRET_ARN";

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Extract a string field from a JSON secret.
pub fn secret_field(secret_string: &str, field: &str) -> Result<Option<String>> {
    let value: serde_json::Value = serde_json::from_str(secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse credentials secret: {}", e)))?;

    Ok(value
        .get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from))
}

/// Resolve an API key from `env_var`, or from `field` of the credentials secret.
pub async fn resolve_api_key(env_var: &str, field: &str) -> Result<Option<String>> {
    if let Some(key) = std::env::var(env_var).ok().filter(|k| !k.is_empty()) {
        return Ok(Some(key));
    }

    let Some(secret_arn) = std::env::var(CREDENTIALS_SECRET_ARN)
        .ok()
        .filter(|arn| !arn.is_empty())
    else {
        return Ok(None);
    };

    info!("{} not set, reading {} from Secrets Manager", env_var, field);

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = SecretsClient::new(&config);
    let secret_string = get_secret(&client, &secret_arn).await?;

    secret_field(&secret_string, field)
}
