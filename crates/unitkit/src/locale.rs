use std::sync::{OnceLock, PoisonError, RwLock};

/// Textual conventions used when parsing and formatting values.
///
/// Only the decimal separator and the locale-specific unit abbreviations are
/// locale dependent; every lookup falls back to the canonical English forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    decimal_separator: char,
}

impl Locale {
    pub const ENGLISH_TAG: &'static str = "en";

    pub fn new(tag: impl Into<String>, decimal_separator: char) -> Self {
        Self {
            tag: tag.into(),
            decimal_separator,
        }
    }

    pub fn english() -> Self {
        Self::new(Self::ENGLISH_TAG, '.')
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn is_english(&self) -> bool {
        self.tag == Self::ENGLISH_TAG
    }

    /// The process-wide active locale (English until [`Locale::set_current`] is called).
    pub fn current() -> Locale {
        active()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active locale and return the previous one.
    pub fn set_current(locale: Locale) -> Locale {
        log::debug!("Switching active locale to {}", locale.tag);
        let mut guard = active().write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, locale)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

fn active() -> &'static RwLock<Locale> {
    static ACTIVE: OnceLock<RwLock<Locale>> = OnceLock::new();
    ACTIVE.get_or_init(|| RwLock::new(Locale::english()))
}
