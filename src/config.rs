use crate::error::{Result, TrackerError};
use crate::sync::JsonBlobStore;
use crate::utils::MonthCalendar;
use std::time::Duration;

#[cfg(feature = "gemini")]
use crate::llm::{CategoryAdvisor, GeminiClassifier, GeminiClient};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CLASSIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Descriptions shorter than this (in characters, after trimming) are not
/// worth a model call.
pub const DEFAULT_MIN_DESCRIPTION_LEN: usize = 4;

pub const ENV_DOCUMENT_URL: &str = "TRACKER_DOCUMENT_URL";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_CLASSIFY_TIMEOUT_SECS: &str = "TRACKER_CLASSIFY_TIMEOUT_SECS";
/// `local`, `UTC` or a `±HH:MM` offset.
pub const ENV_MONTH_CALENDAR: &str = "TRACKER_MONTH_CALENDAR";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub document_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub classification_timeout: Duration,
    pub min_description_len: usize,
    pub month_calendar: MonthCalendar,
}

impl TrackerConfig {
    pub fn new(document_url: impl Into<String>) -> Self {
        Self {
            document_url: document_url.into(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            classification_timeout: DEFAULT_CLASSIFICATION_TIMEOUT,
            min_description_len: DEFAULT_MIN_DESCRIPTION_LEN,
            month_calendar: MonthCalendar::Local,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let document_url = lookup(ENV_DOCUMENT_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TrackerError::Config(format!("{} must be set", ENV_DOCUMENT_URL)))?;

        let mut config = Self::new(document_url.trim());
        config.gemini_api_key = lookup(ENV_GEMINI_API_KEY).filter(|v| !v.trim().is_empty());

        if let Some(model) = lookup(ENV_GEMINI_MODEL).filter(|v| !v.trim().is_empty()) {
            config.gemini_model = model;
        }

        if let Some(raw) = lookup(ENV_CLASSIFY_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                TrackerError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_CLASSIFY_TIMEOUT_SECS, raw
                ))
            })?;
            config.classification_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_MONTH_CALENDAR).filter(|v| !v.trim().is_empty()) {
            config.month_calendar = MonthCalendar::parse(&raw)?;
        }

        Ok(config)
    }

    pub fn document_store(&self) -> JsonBlobStore {
        JsonBlobStore::new(self.document_url.clone())
    }

    /// `None` when no API key is configured.
    #[cfg(feature = "gemini")]
    pub fn category_advisor(&self) -> Option<CategoryAdvisor<GeminiClassifier>> {
        let api_key = self.gemini_api_key.clone()?;
        let classifier = GeminiClassifier::new(GeminiClient::new(api_key), &self.gemini_model);
        Some(
            CategoryAdvisor::new(classifier)
                .with_timeout(self.classification_timeout)
                .with_min_description_len(self.min_description_len),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_document_url_is_required() {
        let result = TrackerConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let config =
            TrackerConfig::from_lookup(lookup_from(&[(ENV_DOCUMENT_URL, "http://blob/1")]))
                .unwrap();
        assert_eq!(config.document_url, "http://blob/1");
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.classification_timeout, Duration::from_secs(10));
        assert_eq!(config.min_description_len, 4);
        assert_eq!(config.month_calendar, MonthCalendar::Local);
        assert_eq!(config.document_store().url(), "http://blob/1");
    }

    #[test]
    fn test_overrides() {
        let config = TrackerConfig::from_lookup(lookup_from(&[
            (ENV_DOCUMENT_URL, " http://blob/2 "),
            (ENV_GEMINI_API_KEY, "secret"),
            (ENV_GEMINI_MODEL, "gemini-2.5-pro"),
            (ENV_CLASSIFY_TIMEOUT_SECS, "3"),
            (ENV_MONTH_CALENDAR, "+10:00"),
        ]))
        .unwrap();
        assert_eq!(config.document_url, "http://blob/2");
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert_eq!(config.classification_timeout, Duration::from_secs(3));
        assert_eq!(config.month_calendar, MonthCalendar::east(36_000).unwrap());
    }

    #[test]
    fn test_bad_month_calendar() {
        let result = TrackerConfig::from_lookup(lookup_from(&[
            (ENV_DOCUMENT_URL, "http://blob/5"),
            (ENV_MONTH_CALENDAR, "Mars/Olympus"),
        ]));
        assert!(matches!(result, Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_bad_timeout() {
        let result = TrackerConfig::from_lookup(lookup_from(&[
            (ENV_DOCUMENT_URL, "http://blob/3"),
            (ENV_CLASSIFY_TIMEOUT_SECS, "soon"),
        ]));
        assert!(matches!(result, Err(TrackerError::Config(_))));
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_advisor_requires_api_key() {
        let config = TrackerConfig::new("http://blob/4");
        assert!(config.category_advisor().is_none());

        let mut config = config;
        config.gemini_api_key = Some("key".to_string());
        assert!(config.category_advisor().is_some());
    }
}
