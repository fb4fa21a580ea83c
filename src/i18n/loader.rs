//! Translation loader
//!
//! Texts are stored as nested JSON objects and looked up with dotted keys
//! such as `registration.first_name_prompt`.

use std::path::Path;
use std::sync::OnceLock;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info, warn};
use crate::utils::errors::{SignupError, Result};
use crate::config::I18nConfig;

/// Message catalogue for one language
#[derive(Debug, Clone)]
pub struct I18n {
    translations: Map<String, Value>,
}

impl I18n {
    /// Load `{translations_dir}/{default_language}.json`; a missing file is fatal
    pub async fn load(config: &I18nConfig) -> Result<Self> {
        let file_path = Path::new(&config.translations_dir)
            .join(format!("{}.json", config.default_language));

        if !file_path.exists() {
            return Err(SignupError::Config(format!(
                "Default language translation file not found: {}",
                file_path.display()
            )));
        }

        let content = fs::read_to_string(&file_path).await?;
        let i18n = Self::from_json(&config.default_language, &content)?;
        info!("Loaded translations for language: {}", config.default_language);
        Ok(i18n)
    }

    /// Build a catalogue from JSON text
    pub fn from_json(language: &str, content: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(translations) => {
                debug!("Loaded {} top-level translation sections for {}", translations.len(), language);
                Ok(Self { translations })
            }
            _ => Err(SignupError::Config(format!(
                "Invalid translation file format for {}",
                language
            ))),
        }
    }

    /// Get a translated message, falling back to the key itself
    pub fn t(&self, key: &str) -> String {
        match self.lookup(key) {
            Some(text) => text.to_string(),
            None => {
                warn!("Translation key '{}' not found", key);
                key.to_string()
            }
        }
    }

    /// Get a translated message with `{name}` placeholders substituted.
    ///
    /// Substitution is a single pass over the template, so braces inside a
    /// value are never expanded. Unknown placeholders are left as they are.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.t(key);
        placeholder_pattern()
            .replace_all(&template, |caps: &Captures| {
                params
                    .iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        let mut parts = key.split('.');
        let mut current = self.translations.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        current.as_str()
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"))
}
