use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;

use super::{
    types::{Config, StorageMode},
    ConfigError,
};

/// Largest run-date shift accepted, in either direction.
pub const MAX_DATE_OFFSET_DAYS: i64 = 3650;

/// Validate configuration
/// Currently validates:
/// - Trigger base URL is an http(s) URL
/// - Clients query is not empty
/// - Timeouts are not 0
/// - Object store section is complete when selected
/// - Date format is a valid strftime pattern without path separators
/// - Run-date offset is within [`MAX_DATE_OFFSET_DAYS`]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.trigger.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(
            "trigger.base_url must start with http:// or https://".to_string(),
        ));
    }

    if config.database.clients_query.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.clients_query cannot be empty".to_string(),
        ));
    }

    if config.trigger.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "trigger.timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.token.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "token.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.storage.mode == StorageMode::ObjectStore {
        let os = config.storage.object_store.as_ref().ok_or_else(|| {
            ConfigError::ValidationError(
                "storage.object_store must be set when storage.mode = \"object_store\""
                    .to_string(),
            )
        })?;
        if os.bucket.trim().is_empty() || os.region.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.object_store.bucket and region cannot be empty".to_string(),
            ));
        }
        if os.access_key_id.is_some() != os.secret_access_key.is_some() {
            return Err(ConfigError::ValidationError(
                "storage.object_store.access_key_id and secret_access_key must be set together"
                    .to_string(),
            ));
        }
    }

    if !(-MAX_DATE_OFFSET_DAYS..=MAX_DATE_OFFSET_DAYS).contains(&config.archive.date_offset_days) {
        return Err(ConfigError::ValidationError(format!(
            "archive.date_offset_days must be between -{MAX_DATE_OFFSET_DAYS} and {MAX_DATE_OFFSET_DAYS}"
        )));
    }

    validate_date_format(&config.archive.date_format)
}

/// Check that a strftime pattern parses and renders a single path segment.
pub fn validate_date_format(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::ValidationError(
            "archive.date_format cannot be empty".to_string(),
        ));
    }

    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::ValidationError(format!(
            "archive.date_format is not a valid strftime pattern: {pattern}"
        )));
    }

    // Time-of-day and zone specifiers cannot be rendered from a date alone.
    let sample = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default();
    let mut rendered = String::new();
    if std::fmt::write(&mut rendered, format_args!("{}", sample.format(pattern))).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "archive.date_format uses fields a date cannot provide: {pattern}"
        )));
    }

    if rendered.contains('/') || rendered.contains('\\') {
        return Err(ConfigError::ValidationError(
            "archive.date_format must not render path separators".to_string(),
        ));
    }

    Ok(())
}
