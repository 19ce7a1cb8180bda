use super::models::Config;
use crate::humanize::DurationSpec;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Endpoint '{field}' is not a valid URL: {value}")]
    InvalidEndpoint { field: String, value: String },

    #[error("Endpoint '{field}' has unsupported scheme '{scheme}', expected 'http://' or 'https://'")]
    InvalidEndpointScheme { field: String, scheme: String },

    #[error("Media format must not be empty")]
    EmptyMediaFormat,

    #[error("Duration must be positive: {field} = {value}")]
    ZeroDuration { field: String, value: DurationSpec },

    #[error("Store path must not be empty")]
    EmptyStorePath,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_endpoints(config)?;
    validate_durations(config)?;
    validate_store(config)?;
    Ok(())
}

fn validate_endpoint(field: &str, value: &str) -> Result<(), ValidationError> {
    let url = Url::parse(value).map_err(|_| ValidationError::InvalidEndpoint {
        field: field.to_string(),
        value: value.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ValidationError::InvalidEndpointScheme {
            field: field.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

fn validate_endpoints(config: &Config) -> Result<(), ValidationError> {
    validate_endpoint("endpoints.metadata_url", &config.endpoints.metadata_url)?;
    validate_endpoint("endpoints.parsing_url", &config.endpoints.parsing_url)?;

    if config.endpoints.media_format.trim().is_empty() {
        return Err(ValidationError::EmptyMediaFormat);
    }

    Ok(())
}

fn validate_durations(config: &Config) -> Result<(), ValidationError> {
    let mut durations = vec![
        ("parsing.cooldown", config.parsing.cooldown),
        ("parsing.reuse_window", config.parsing.reuse_window),
        ("parsing.lease", config.parsing.lease),
        ("http.connect_timeout", config.http.connect_timeout),
    ];
    if let Some(timeout) = config.http.request_timeout {
        durations.push(("http.request_timeout", timeout));
    }

    for (field, value) in durations {
        if value.is_zero() {
            return Err(ValidationError::ZeroDuration {
                field: field.to_string(),
                value,
            });
        }
    }

    Ok(())
}

fn validate_store(config: &Config) -> Result<(), ValidationError> {
    if config.store.fjall_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyStorePath);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.endpoints.parsing_url = "ftp://example.com/bparse/".to_string();

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidEndpointScheme { ref scheme, .. }) if scheme == "ftp"
        ));
    }

    #[test]
    fn test_rejects_malformed_endpoint() {
        let mut config = Config::default();
        config.endpoints.metadata_url = "not a url".to_string();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_media_format() {
        let mut config = Config::default();
        config.endpoints.media_format = "  ".to_string();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyMediaFormat)
        ));
    }

    #[test]
    fn test_rejects_zero_durations() {
        let mut config = Config::default();
        config.parsing.cooldown = DurationSpec(0);
        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroDuration { ref field, .. }) if field == "parsing.cooldown"
        ));

        let mut config = Config::default();
        config.http.request_timeout = Some(DurationSpec(0));
        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroDuration { ref field, .. }) if field == "http.request_timeout"
        ));
    }

    #[test]
    fn test_rejects_empty_store_path() {
        let mut config = Config::default();
        config.store.fjall_path = PathBuf::new();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyStorePath)
        ));
    }
}
