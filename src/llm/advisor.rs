use crate::config::{DEFAULT_CLASSIFICATION_TIMEOUT, DEFAULT_MIN_DESCRIPTION_LEN};
use crate::error::{Result, TrackerError};
use crate::llm::client::GeminiClient;
use crate::llm::types::{CategorySuggestion, Content};
use crate::llm::utils::{clean_json_output, gemini_response_schema};
use crate::schema::Category;
use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

/// Maps a free-text description to a category label.
///
/// Implementations may return any string; the advisor validates it.
#[async_trait]
pub trait CategoryClassifier: Send + Sync {
    async fn classify(&self, description: &str) -> Result<String>;
}

pub struct GeminiClassifier {
    client: GeminiClient,
    model: String,
}

impl GeminiClassifier {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn prompt(description: &str) -> String {
        format!(
            "Categorize the following expense description into one of the provided categories.\n\
             Description: \"{}\"",
            description
        )
    }
}

#[async_trait]
impl CategoryClassifier for GeminiClassifier {
    async fn classify(&self, description: &str) -> Result<String> {
        let schema = gemini_response_schema::<CategorySuggestion>()?;
        let raw = self
            .client
            .generate_content(
                &self.model,
                None,
                vec![Content::user(Self::prompt(description))],
                Some(schema),
            )
            .await?;

        let suggestion: CategorySuggestion = serde_json::from_str(clean_json_output(&raw))
            .map_err(|e| TrackerError::Classification(format!("Unparseable reply: {}", e)))?;
        Ok(suggestion.category)
    }
}

/// Best-effort category pre-fill.
///
/// Never fails: trivial input, errors, timeouts and out-of-set answers all
/// yield [`Category::Other`].
pub struct CategoryAdvisor<C> {
    classifier: C,
    timeout: Duration,
    min_description_len: usize,
}

impl<C: CategoryClassifier> CategoryAdvisor<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            timeout: DEFAULT_CLASSIFICATION_TIMEOUT,
            min_description_len: DEFAULT_MIN_DESCRIPTION_LEN,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_description_len(mut self, len: usize) -> Self {
        self.min_description_len = len;
        self
    }

    pub async fn suggest(&self, description: &str) -> Category {
        let description = description.trim();
        if description.chars().count() < self.min_description_len {
            debug!("Description too short to classify: '{}'", description);
            return Category::default();
        }

        let label = match tokio::time::timeout(self.timeout, self.classifier.classify(description))
            .await
        {
            Ok(Ok(label)) => label,
            Ok(Err(e)) => {
                warn!("Error categorizing '{}': {}", description, e);
                return Category::default();
            }
            Err(_) => {
                warn!(
                    "Categorizing '{}' timed out after {:?}",
                    description, self.timeout
                );
                return Category::default();
            }
        };

        match Category::from_label(label.trim()) {
            Some(category) => {
                debug!("Suggested {} for '{}'", category, description);
                category
            }
            None => {
                warn!("Classifier returned an unknown category: {}", label);
                Category::default()
            }
        }
    }
}
