//! Internationalization (i18n) and language-aware routing.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported languages and their URL prefixes
//! - `language`: Validated `Language` type
//! - `paths`: Path <-> language mapping (`language_from_path`, `localize_url`, ...)
//! - `context`: Injected current-language state with persisted preference
//! - `strings`: Keyed message table (message -> language -> text)
//!
//! # Example
//!
//! ```rust,ignore
//! use sdeal_site::i18n::{language_from_path, localize_url, Language};
//!
//! assert_eq!(language_from_path("/nl/pricing"), Language::DUTCH);
//! assert_eq!(localize_url("/pricing", Language::GERMAN), "/de/pricing");
//! ```

mod context;
mod language;
mod paths;
mod registry;
mod strings;

pub use context::{LanguageContext, MemoryPreferenceStore, Navigator, PreferenceStore};
pub use language::Language;
pub use paths::{
    all_localized_urls, language_from_path, localize_url, prefixed_language,
    strip_language_prefix,
};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::{Message, Translations};
