//! # User Preferences
//!
//! Language and remember-me preferences, passed explicitly to whatever
//! needs them. Persistence goes through [`SettingsStore`].

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Interface languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    /// Parse a language tag such as `fr` or `fr-SN`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Language::En),
            "fr" => Some(Language::Fr),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }
}

/// Preferences carried by a user session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub remember_me: bool,
}

/// Persistence boundary for [`Preferences`]
pub trait SettingsStore: Send + Sync {
    /// Stored preferences, or the defaults when nothing was saved
    fn load(&self) -> PaymentResult<Preferences>;

    fn save(&self, preferences: &Preferences) -> PaymentResult<()>;
}

/// Store that keeps preferences for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    inner: RwLock<Option<Preferences>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> PaymentResult<Preferences> {
        let guard = self
            .inner
            .read()
            .map_err(|_| PaymentError::Internal("settings lock poisoned".to_string()))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, preferences: &Preferences) -> PaymentResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| PaymentError::Internal("settings lock poisoned".to_string()))?;
        *guard = Some(preferences.clone());
        Ok(())
    }
}

/// Serialize preferences for a string-valued store (cookie, web storage)
pub fn encode_preferences(preferences: &Preferences) -> PaymentResult<String> {
    serde_json::to_string(preferences).map_err(|e| PaymentError::Serialization(e.to_string()))
}

/// Decode stored preferences, falling back to defaults for unreadable data
pub fn decode_preferences(raw: Option<&str>) -> Preferences {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}
