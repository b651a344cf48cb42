use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_yaml_ng::Value;

/// Transport timeout used when the config does not set `timeout_secs`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading configuration or binding a storage strategy.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing required setting `{0}`")]
    MissingKey(ConfigKey),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: ConfigKey, reason: String },

    #[error("unsupported storage strategy {0:?}: only AttachmentFu and Paperclip are supported")]
    UnsupportedStrategy(String),
}

/// Settings understood by the remote connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiKey,
    ApiSecret,
    Endpoint,
    UploadEndpoint,
    TimeoutSecs,
}

impl ConfigKey {
    /// Normalize a raw key. Case, `_` and `-` are ignored, so `api_key`,
    /// `apiKey` and `api-key` all map to [`ConfigKey::ApiKey`].
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match folded.as_str() {
            "apikey" | "key" => Some(Self::ApiKey),
            "apisecret" | "secret" => Some(Self::ApiSecret),
            "endpoint" | "baseurl" | "url" => Some(Self::Endpoint),
            "uploadendpoint" | "uploadurl" => Some(Self::UploadEndpoint),
            "timeout" | "timeoutsecs" => Some(Self::TimeoutSecs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::ApiSecret => "api_secret",
            Self::Endpoint => "endpoint",
            Self::UploadEndpoint => "upload_endpoint",
            Self::TimeoutSecs => "timeout_secs",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials and endpoints for the document-hosting API.
///
/// Immutable once loaded; pass it by reference into every remote call.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    api_key: String,
    api_secret: String,
    endpoint: String,
    upload_endpoint: String,
    timeout: Duration,
}

impl RemoteConfig {
    /// Build a config from raw key/value pairs.
    ///
    /// Keys go through [`ConfigKey::parse`]; unknown keys are ignored.
    /// Values are trimmed, and a blank value counts as missing. Later pairs
    /// override earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut api_key = None;
        let mut api_secret = None;
        let mut endpoint = None;
        let mut upload_endpoint = None;
        let mut timeout = None;

        for (raw_key, raw_value) in pairs {
            let Some(key) = ConfigKey::parse(raw_key.as_ref()) else {
                tracing::debug!(key = raw_key.as_ref(), "ignoring unknown config key");
                continue;
            };

            let value = raw_value.as_ref().trim();
            let value = (!value.is_empty()).then(|| value.to_owned());

            match key {
                ConfigKey::ApiKey => api_key = value,
                ConfigKey::ApiSecret => api_secret = value,
                ConfigKey::Endpoint => endpoint = value,
                ConfigKey::UploadEndpoint => upload_endpoint = value,
                ConfigKey::TimeoutSecs => timeout = value,
            }
        }

        let api_key = api_key.ok_or(ConfigError::MissingKey(ConfigKey::ApiKey))?;
        let api_secret = api_secret.ok_or(ConfigError::MissingKey(ConfigKey::ApiSecret))?;
        let endpoint = check_url(
            ConfigKey::Endpoint,
            endpoint.ok_or(ConfigError::MissingKey(ConfigKey::Endpoint))?,
        )?;
        let upload_endpoint = match upload_endpoint {
            Some(url) => check_url(ConfigKey::UploadEndpoint, url)?,
            None => endpoint.clone(),
        };
        let timeout = match timeout {
            Some(secs) => parse_timeout(&secs)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key,
            api_secret,
            endpoint,
            upload_endpoint,
            timeout,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Base URL for list and delete calls.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Base URL for multipart uploads. Falls back to [`Self::endpoint`].
    pub fn upload_endpoint(&self) -> &str {
        &self.upload_endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("upload_endpoint", &self.upload_endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Load the remote configuration from a YAML file.
///
/// The file must hold a flat mapping. Scalar values of any type are
/// coerced to trimmed strings before validation.
pub fn load_config(path: &Path) -> Result<RemoteConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document: Value =
        serde_yaml_ng::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let Value::Mapping(mapping) = document else {
        return Err(ConfigError::Parse(format!(
            "{} must contain a mapping of settings",
            path.display()
        )));
    };

    let mut pairs = Vec::with_capacity(mapping.len());
    for (key, value) in &mapping {
        let Some(key) = scalar_to_string(key) else {
            return Err(ConfigError::Parse("setting names must be scalars".into()));
        };
        match scalar_to_string(value) {
            Some(value) => pairs.push((key, value)),
            None => {
                if let Some(known) = ConfigKey::parse(&key) {
                    return Err(ConfigError::InvalidValue {
                        key: known,
                        reason: "expected a scalar value".into(),
                    });
                }
            }
        }
    }

    let config = RemoteConfig::from_pairs(pairs)?;
    tracing::debug!(path = %path.display(), endpoint = config.endpoint(), "loaded remote config");
    Ok(config)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn check_url(key: ConfigKey, url: String) -> Result<String, ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            reason: format!("{url:?} is not an http(s) URL"),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: ConfigKey::TimeoutSecs,
            reason: format!("{raw:?} is not a positive number of seconds"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn key_spellings_normalize() {
        assert_eq!(ConfigKey::parse("api_key"), Some(ConfigKey::ApiKey));
        assert_eq!(ConfigKey::parse("apiKey"), Some(ConfigKey::ApiKey));
        assert_eq!(ConfigKey::parse("API-KEY"), Some(ConfigKey::ApiKey));
        assert_eq!(ConfigKey::parse("secret"), Some(ConfigKey::ApiSecret));
        assert_eq!(ConfigKey::parse("upload_url"), Some(ConfigKey::UploadEndpoint));
        assert_eq!(ConfigKey::parse("colour"), None);
    }

    #[test]
    fn loads_yaml_with_trimmed_values() {
        let file = write_config(
            "api_key: '  abc123  '\napi_secret: s3cret\nendpoint: https://api.issuu.com/1_0\n",
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api_key(), "abc123");
        assert_eq!(config.api_secret(), "s3cret");
        assert_eq!(config.endpoint(), "https://api.issuu.com/1_0");
        assert_eq!(config.upload_endpoint(), "https://api.issuu.com/1_0");
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn numeric_values_are_coerced_to_strings() {
        let file = write_config(
            "apiKey: 12345\napiSecret: 678\nendpoint: http://localhost\nuploadEndpoint: http://upload.local\ntimeout_secs: 5\n",
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api_key(), "12345");
        assert_eq!(config.api_secret(), "678");
        assert_eq!(config.upload_endpoint(), "http://upload.local");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(&dir.path().join("issuu.yml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn directory_is_not_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(dir.path()),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn missing_secret_is_reported_by_key() {
        let file = write_config("api_key: abc\nendpoint: https://api.issuu.com/1_0\n");
        let result = load_config(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::MissingKey(ConfigKey::ApiSecret))
        ));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let result = RemoteConfig::from_pairs([
            ("api_key", "   "),
            ("api_secret", "s"),
            ("endpoint", "https://example.com"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::MissingKey(ConfigKey::ApiKey))
        ));
    }

    #[test]
    fn non_mapping_document_is_a_parse_error() {
        let file = write_config("- api_key\n- api_secret\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let file = write_config("api_key: [unclosed\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn nested_value_for_known_key_is_rejected() {
        let file = write_config("api_key:\n  nested: true\napi_secret: s\nendpoint: https://x\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::InvalidValue {
                key: ConfigKey::ApiKey,
                ..
            })
        ));
    }

    #[test]
    fn endpoint_must_be_http() {
        let result = RemoteConfig::from_pairs([
            ("api_key", "k"),
            ("api_secret", "s"),
            ("endpoint", "ftp://example.com"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: ConfigKey::Endpoint,
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = RemoteConfig::from_pairs([
            ("api_key", "k"),
            ("api_secret", "s"),
            ("endpoint", "https://example.com"),
            ("timeout", "0"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: ConfigKey::TimeoutSecs,
                ..
            })
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = RemoteConfig::from_pairs([
            ("api_key", "k"),
            ("api_secret", "hunter2"),
            ("endpoint", "https://example.com"),
        ])
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
