//! Mapping between URL paths and languages.
//!
//! The URL scheme is `[/<lang-prefix>]/<page>[/<slug>]`. English owns the
//! empty prefix, every other language owns `/<code>`. A prefix matches when it
//! is the whole path or is followed by `/`, compared case-insensitively.
//! Anything that does not match a prefix is an English path.

use crate::i18n::{Language, LanguageRegistry};

/// Split a path into the language whose prefix it carries and the remainder.
///
/// Returns `None` when the path has no language prefix.
fn split_prefix(path: &str) -> Option<(Language, &str)> {
    LanguageRegistry::get().list_prefixed().find_map(|config| {
        let prefix = config.url_prefix;
        let head = path.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        let rest = &path[prefix.len()..];
        if rest.is_empty() || rest.starts_with('/') {
            Some((Language::from_config(config), rest))
        } else {
            None
        }
    })
}

/// The language named by the path prefix, if the path carries one.
pub fn prefixed_language(path: &str) -> Option<Language> {
    split_prefix(path).map(|(language, _)| language)
}

/// Resolve the language of a path. Unrecognized prefixes fall back to the
/// default language.
pub fn language_from_path(path: &str) -> Language {
    prefixed_language(path).unwrap_or_else(Language::canonical)
}

/// Remove the language prefix from a path; `/` if nothing remains.
pub fn strip_language_prefix(path: &str) -> String {
    let rest = match split_prefix(path) {
        Some((_, rest)) => rest,
        None => path,
    };
    if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    }
}

/// Prepend the language prefix to a language-neutral path.
pub fn localize_url(path: &str, language: Language) -> String {
    let clean = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let prefix = language.url_prefix();
    if prefix.is_empty() {
        clean
    } else if clean == "/" {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, clean)
    }
}

/// Every supported language paired with its URL for the same logical page.
pub fn all_localized_urls(path: &str) -> Vec<(Language, String)> {
    let neutral = strip_language_prefix(if path.is_empty() { "/" } else { path });
    Language::all()
        .into_iter()
        .map(|language| (language, localize_url(&neutral, language)))
        .collect()
}
