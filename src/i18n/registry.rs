//! Language registry: Single source of truth for all supported site languages.
//!
//! This module provides a centralized registry of the languages the site is
//! published in, together with the URL prefix each one owns. It uses a
//! singleton pattern with `OnceLock` to ensure thread-safe initialization and
//! access.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "nl")
    pub code: &'static str,

    /// English name of the language (e.g., "Dutch")
    pub name: &'static str,

    /// Native name of the language (e.g., "Nederlands")
    pub native_name: &'static str,

    /// Path prefix the language owns (e.g., "/nl"); empty for the default language
    pub url_prefix: &'static str,

    /// Short label shown in the language switcher (e.g., "NL")
    pub label: &'static str,

    /// Whether this is the default language (exactly one must be true)
    pub is_canonical: bool,
}

/// Global language registry singleton.
///
/// Initialized once on first access and immutable thereafter. Prefixes of the
/// non-default languages are mutually exclusive, so lookup order only matters
/// for the default language which owns the empty prefix.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code (case-insensitive).
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// Get all languages in display order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Languages that own a non-empty URL prefix.
    pub fn list_prefixed(&self) -> impl Iterator<Item = &LanguageConfig> {
        self.languages
            .iter()
            .filter(|lang| !lang.url_prefix.is_empty())
    }

    /// Get the canonical (default) language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one canonical language.
    /// The registry is static, so this indicates a programming error.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// The four languages the site is published in. English is the default and
/// lives at the root of the URL space.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            url_prefix: "",
            label: "EN",
            is_canonical: true,
        },
        LanguageConfig {
            code: "nl",
            name: "Dutch",
            native_name: "Nederlands",
            url_prefix: "/nl",
            label: "NL",
            is_canonical: false,
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            url_prefix: "/de",
            label: "DE",
            is_canonical: false,
        },
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            url_prefix: "/fr",
            label: "FR",
            is_canonical: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_dutch() {
        let config = LanguageRegistry::get()
            .get_by_code("nl")
            .expect("nl should be registered");

        assert_eq!(config.name, "Dutch");
        assert_eq!(config.native_name, "Nederlands");
        assert_eq!(config.url_prefix, "/nl");
        assert!(!config.is_canonical);
    }

    #[test]
    fn test_get_by_code_is_case_insensitive() {
        let config = LanguageRegistry::get().get_by_code("DE");
        assert_eq!(config.map(|c| c.code), Some("de"));
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("es").is_none());
    }

    #[test]
    fn test_list_all_has_four_languages_in_order() {
        let codes: Vec<_> = LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|lang| lang.code)
            .collect();
        assert_eq!(codes, vec!["en", "nl", "de", "fr"]);
    }

    #[test]
    fn test_only_canonical_language_has_empty_prefix() {
        let registry = LanguageRegistry::get();
        for lang in registry.list_all() {
            assert_eq!(lang.url_prefix.is_empty(), lang.is_canonical, "{}", lang.code);
        }
        assert_eq!(registry.list_prefixed().count(), 3);
    }

    #[test]
    fn test_prefixes_are_mutually_exclusive() {
        let prefixes: Vec<_> = LanguageRegistry::get()
            .list_prefixed()
            .map(|lang| format!("{}/", lang.url_prefix))
            .collect();
        for (i, a) in prefixes.iter().enumerate() {
            for (j, b) in prefixes.iter().enumerate() {
                if i != j {
                    assert!(!a.starts_with(b.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_canonical_returns_english() {
        let canonical = LanguageRegistry::get().canonical();
        assert_eq!(canonical.code, "en");
        assert!(canonical.is_canonical);
    }
}
