//! Runtime configuration for the detail core.
//!
//! # Responsibility
//! - Describe remote catalog addressing, image resolution and storage paths.
//! - Resolve values from `CATALOG_*` environment variables with defaults.
//!
//! # Invariants
//! - `api_base_url` is always an absolute `http`/`https` URL.
//! - `favorites_namespace` is never blank.
//! - Secrets (`api_key`) are never written to logs.

use crate::repo::favorite_repo::FavoritesNamespace;
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3/";
pub const DEFAULT_RESOURCE: &str = "movie";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/original";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DB_FILE_NAME: &str = "catalog_favorites.sqlite3";

pub const ENV_API_BASE_URL: &str = "CATALOG_API_BASE_URL";
pub const ENV_API_KEY: &str = "CATALOG_API_KEY";
pub const ENV_LANGUAGE: &str = "CATALOG_LANGUAGE";
pub const ENV_RESOURCE: &str = "CATALOG_RESOURCE";
pub const ENV_IMAGE_BASE_URL: &str = "CATALOG_IMAGE_BASE_URL";
pub const ENV_DB_PATH: &str = "CATALOG_DB_PATH";
pub const ENV_FAVORITES_NAMESPACE: &str = "CATALOG_FAVORITES_NAMESPACE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CATALOG_REQUEST_TIMEOUT_SECS";

/// Configuration resolution error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidUrl {
        key: &'static str,
        value: String,
        message: String,
    },
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl {
                key,
                value,
                message,
            } => write!(f, "{key} is not a valid http(s) URL `{value}`: {message}"),
            Self::InvalidValue { key, value } => write!(f, "{key} has invalid value `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by the catalog client, favorites store and controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Catalog API root; item URLs are `{api_base_url}/{resource}/{id}`.
    pub api_base_url: Url,
    pub api_key: Option<String>,
    /// Optional `language` query parameter forwarded to the catalog.
    pub language: Option<String>,
    /// Path segment naming the item collection.
    pub resource: String,
    /// Prefix prepended to `poster_path` references.
    pub image_base_url: String,
    /// Favorites database file.
    pub db_path: PathBuf,
    /// Key prefix under which favorites are saved.
    pub favorites_namespace: FavoritesNamespace,
    pub request_timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("valid default API URL"),
            api_key: None,
            language: None,
            resource: DEFAULT_RESOURCE.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            favorites_namespace: FavoritesNamespace::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl CatalogConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, falling back to defaults.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    /// - `InvalidUrl` for unparsable or non-http(s) base URLs.
    /// - `InvalidValue` for a blank-after-trim namespace that was explicitly
    ///   provided, a resource containing `/`, or a non-positive timeout.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = read(ENV_API_BASE_URL) {
            config.api_base_url = parse_http_url(ENV_API_BASE_URL, raw.as_str())?;
        }
        if let Some(raw) = read(ENV_IMAGE_BASE_URL) {
            parse_http_url(ENV_IMAGE_BASE_URL, raw.as_str())?;
            config.image_base_url = raw;
        }
        config.api_key = read(ENV_API_KEY);
        config.language = read(ENV_LANGUAGE);

        if let Some(raw) = read(ENV_RESOURCE) {
            if raw.contains('/') {
                return Err(ConfigError::InvalidValue {
                    key: ENV_RESOURCE,
                    value: raw,
                });
            }
            config.resource = raw;
        }
        if let Some(raw) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup(ENV_FAVORITES_NAMESPACE) {
            config.favorites_namespace =
                FavoritesNamespace::new(raw.as_str()).ok_or(ConfigError::InvalidValue {
                    key: ENV_FAVORITES_NAMESPACE,
                    value: raw,
                })?;
        }
        if let Some(raw) = read(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT_SECS,
                    value: raw,
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_http_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidUrl {
        key,
        value: raw.to_string(),
        message: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            key,
            value: raw.to_string(),
            message: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{
        CatalogConfig, ConfigError, DEFAULT_RESOURCE, ENV_API_BASE_URL, ENV_API_KEY,
        ENV_FAVORITES_NAMESPACE, ENV_REQUEST_TIMEOUT_SECS, ENV_RESOURCE,
    };
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CatalogConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.resource, DEFAULT_RESOURCE);
        assert_eq!(config.favorites_namespace.as_str(), "@catalog");
    }

    #[test]
    fn values_are_trimmed_and_blank_values_ignored() {
        let config = CatalogConfig::from_lookup(lookup_from(&[
            (ENV_API_BASE_URL, " http://127.0.0.1:8080/v3/ "),
            (ENV_API_KEY, "   "),
            (ENV_REQUEST_TIMEOUT_SECS, "3"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:8080/v3/");
        assert_eq!(config.api_key, None);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err =
            CatalogConfig::from_lookup(lookup_from(&[(ENV_API_BASE_URL, "ftp://catalog")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { key, .. } if key == ENV_API_BASE_URL));
    }

    #[test]
    fn rejects_explicit_blank_namespace_and_bad_values() {
        let err =
            CatalogConfig::from_lookup(lookup_from(&[(ENV_FAVORITES_NAMESPACE, "  ")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_FAVORITES_NAMESPACE));

        let err = CatalogConfig::from_lookup(lookup_from(&[(ENV_RESOURCE, "movie/top")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_RESOURCE));

        let err = CatalogConfig::from_lookup(lookup_from(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
