use thiserror::Error;
use url::Url;

/// Configuration for the text-generation backend behind attendance tips.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvisorSettings {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    system_prompt: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AdvisorSettingsDraft {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AdvisorSettingsError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl AdvisorSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `AdvisorSettingsError` if the base URL is present but invalid.
    pub fn validate(self) -> Result<AdvisorSettings, AdvisorSettingsError> {
        let api_key = normalize_optional(self.api_key);
        let model = normalize_optional(self.model);
        let base_url = normalize_optional(self.base_url);
        let system_prompt = normalize_optional(self.system_prompt);

        if let Some(url) = base_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(AdvisorSettingsError::InvalidBaseUrl(url.clone()));
            }
        }

        Ok(AdvisorSettings {
            api_key,
            model,
            base_url,
            system_prompt,
        })
    }
}

impl AdvisorSettings {
    /// Tips can only be requested once an API key is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
