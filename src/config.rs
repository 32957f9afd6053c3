use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;

use crate::upload::DEFAULT_MAX_IMAGE_BYTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Fallback key when the request does not carry its own.
    pub mistral_api_key: Option<String>,
    pub mistral_base_url: String,
    pub mistral_model: String,
    pub max_image_bytes: usize,
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_image_bytes: usize = try_load(
            &lookup,
            "PIC2COOK_MAX_IMAGE_BYTES",
            &DEFAULT_MAX_IMAGE_BYTES.to_string(),
        )?;
        if max_image_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "PIC2COOK_MAX_IMAGE_BYTES",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let api_key = lookup("MISTRAL_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            info!("MISTRAL_API_KEY not set, requests must supply their own key");
        }

        Ok(Self {
            bind: try_load(&lookup, "PIC2COOK_BIND", "0.0.0.0")?,
            port: try_load(&lookup, "PIC2COOK_PORT", "3000")?,
            mistral_api_key: api_key,
            mistral_base_url: try_load(&lookup, "MISTRAL_BASE_URL", "https://api.mistral.ai")?,
            mistral_model: try_load(&lookup, "MISTRAL_MODEL", "pixtral-12b")?,
            max_image_bytes,
            request_timeout: Duration::from_secs(try_load(&lookup, "MISTRAL_TIMEOUT_SECS", "60")?),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        value,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.address(), "0.0.0.0:3000");
        assert_eq!(config.mistral_api_key, None);
        assert_eq!(config.mistral_base_url, "https://api.mistral.ai");
        assert_eq!(config.mistral_model, "pixtral-12b");
        assert_eq!(config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("PIC2COOK_BIND", "127.0.0.1"),
            ("PIC2COOK_PORT", " 8080 "),
            ("MISTRAL_API_KEY", "  secret  "),
            ("MISTRAL_MODEL", "pixtral-large-latest"),
            ("PIC2COOK_MAX_IMAGE_BYTES", "1024"),
            ("MISTRAL_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.mistral_api_key.as_deref(), Some("secret"));
        assert_eq!(config.mistral_model, "pixtral-large-latest");
        assert_eq!(config.max_image_bytes, 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let config = config_from(&[("MISTRAL_API_KEY", "   ")]).unwrap();
        assert_eq!(config.mistral_api_key, None);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = config_from(&[("PIC2COOK_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PIC2COOK_PORT"));

        assert!(config_from(&[("PIC2COOK_MAX_IMAGE_BYTES", "0")]).is_err());
    }
}
