use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language used for human-readable text in analysis responses.
///
/// The locale never changes structural fields (validity flags, line numbers,
/// severities), only messages and explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
    De,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::En, Locale::Ru, Locale::De, Locale::Es];

    /// Short language code as used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
            Locale::De => "de",
            Locale::Es => "es",
        }
    }

    /// English name of the language, used when instructing the backend
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ru => "Russian",
            Locale::De => "German",
            Locale::Es => "Spanish",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Locale::ALL
            .into_iter()
            .find(|locale| locale.code() == code)
            .ok_or_else(|| ConfigError::InvalidLocale(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_codes() {
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(" RU ".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!("de".parse::<Locale>().unwrap(), Locale::De);
        assert_eq!("es".parse::<Locale>().unwrap(), Locale::Es);
    }

    #[test]
    fn test_unknown_locale_is_rejected() {
        assert_eq!(
            "fr".parse::<Locale>(),
            Err(ConfigError::InvalidLocale("fr".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Locale::Ru).unwrap(), "\"ru\"");
        let parsed: Locale = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(parsed, Locale::Es);
    }
}
