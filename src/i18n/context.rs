//! Shared "current language" state.
//!
//! `LanguageContext` is the one piece of state shared between the router and
//! the wizard. It is passed explicitly to whoever needs it. Changes are
//! persisted through a [`PreferenceStore`] and broadcast on a `watch` channel,
//! so the last write wins.

use crate::i18n::paths::{localize_url, prefixed_language, strip_language_prefix};
use crate::i18n::Language;
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::debug;

/// Persisted language preference (a browser cookie on the server side).
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Option<Language>;
    fn save(&self, language: Language);
}

/// Performs navigation on behalf of the language switcher.
pub trait Navigator {
    /// Navigate to `url` replacing the current history entry.
    fn replace(&self, url: &str);
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    saved: Mutex<Option<Language>>,
}

impl MemoryPreferenceStore {
    pub fn new(initial: Option<Language>) -> Self {
        Self {
            saved: Mutex::new(initial),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Option<Language> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(&self, language: Language) {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(language);
    }
}

pub struct LanguageContext<S: PreferenceStore> {
    store: S,
    current: watch::Sender<Language>,
}

impl<S: PreferenceStore> LanguageContext<S> {
    /// Create a context starting from the persisted preference, or English.
    pub fn new(store: S) -> Self {
        let initial = store.load().unwrap_or_else(Language::canonical);
        let (current, _) = watch::channel(initial);
        Self { store, current }
    }

    pub fn current(&self) -> Language {
        *self.current.borrow()
    }

    /// Receive every future language change.
    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.current.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the active language for a navigation to `path`.
    ///
    /// Priority: URL prefix, then the persisted preference, then English. A
    /// change of the active language is persisted and broadcast.
    pub fn resolve_navigation(&self, path: &str) -> Language {
        let resolved = prefixed_language(path)
            .or_else(|| self.store.load())
            .unwrap_or_else(Language::canonical);

        if resolved != self.current() {
            debug!("Active language {} -> {} for {}", self.current(), resolved, path);
            self.store.save(resolved);
            self.current.send_replace(resolved);
        }
        resolved
    }

    /// Explicit language change by the user while viewing `current_path`.
    ///
    /// Returns `false` (and does nothing) when `language` is already active.
    pub fn change_language(
        &self,
        language: Language,
        current_path: &str,
        navigator: &dyn Navigator,
    ) -> bool {
        if language == self.current() {
            return false;
        }

        self.store.save(language);
        self.current.send_replace(language);

        let target = localize_url(&strip_language_prefix(current_path), language);
        debug!("Language changed to {}, replacing location with {}", language, target);
        navigator.replace(&target);
        true
    }
}
