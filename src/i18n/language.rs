//! Language type: validated language representation.
//!
//! A `Language` can only be constructed from a code present in the registry,
//! so every value carries a known URL prefix and string table column.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated site language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "nl")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const DUTCH: Language = Language { code: "nl" };
    pub const GERMAN: Language = Language { code: "de" };
    pub const FRENCH: Language = Language { code: "fr" };

    /// Create a Language from a language code string (case-insensitive).
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code.trim()) {
            Some(config) => Ok(Language::from_config(config)),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    pub(crate) fn from_config(config: &LanguageConfig) -> Language {
        Language { code: config.code }
    }

    /// Get the default language (English).
    pub fn canonical() -> Language {
        Language::from_config(LanguageRegistry::get().canonical())
    }

    /// Every supported language, in registry order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list_all()
            .into_iter()
            .map(Language::from_config)
            .collect()
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for values built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// The URL prefix owned by this language ("" for English).
    pub fn url_prefix(&self) -> &'static str {
        self.config().url_prefix
    }

    /// Get the native name of the language (e.g., "Deutsch").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Short switcher label (e.g., "DE").
    pub fn label(&self) -> &'static str {
        self.config().label
    }

    /// Check if this is the default language.
    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::canonical()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}
