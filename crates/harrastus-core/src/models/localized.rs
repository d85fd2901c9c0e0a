//! Display text with per-language variants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Fi,
    En,
    Sv,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Fi, Language::En, Language::Sv];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Fi => "fi",
            Self::En => "en",
            Self::Sv => "sv",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

/// A name or label with a default value and optional translations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub default: String,
    #[serde(default)]
    pub translations: BTreeMap<Language, String>,
}

impl LocalizedText {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            translations: BTreeMap::new(),
        }
    }

    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.translations.insert(language, text.into());
        self
    }

    /// Text in the requested language, falling back to the default.
    pub fn get(&self, language: Option<Language>) -> &str {
        language
            .and_then(|lang| self.translations.get(&lang))
            .map(String::as_str)
            .unwrap_or(&self.default)
    }

    /// The default text followed by every translation.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default.as_str()).chain(self.translations.values().map(String::as_str))
    }

    /// Case-insensitive substring match against any variant.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.variants()
            .any(|variant| variant.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballgames() -> LocalizedText {
        LocalizedText::new("Pallopelit")
            .with(Language::En, "Ballgames")
            .with(Language::Sv, "Bollspel")
    }

    #[test]
    fn falls_back_to_default() {
        let text = LocalizedText::new("Jalkapallo");
        assert_eq!(text.get(Some(Language::En)), "Jalkapallo");
        assert_eq!(ballgames().get(Some(Language::Sv)), "Bollspel");
        assert_eq!(ballgames().get(None), "Pallopelit");
    }

    #[test]
    fn matches_any_language() {
        let text = ballgames();
        assert!(text.matches("ball"));
        assert!(text.matches("BOLL"));
        assert!(text.matches("pallo"));
        assert!(!text.matches("tennis"));
    }
}
