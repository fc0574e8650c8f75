//! See [`Language`].

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// The response language requested by the user.
///
/// Unknown tags never fail to parse, they fall back to [`Language::English`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "bn")]
    Bengali,
}

impl Language {
    pub const ALL: [Self; 4] = [Self::English, Self::Hindi, Self::Tamil, Self::Bengali];

    /// Resolve a language tag, falling back to the default for unknown tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "hi" => Self::Hindi,
            "ta" => Self::Tamil,
            "bn" => Self::Bengali,
            _ => Self::English,
        }
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Tamil => "ta",
            Self::Bengali => "bn",
        }
    }

    /// The name used when instructing the model which language to answer in.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi (हिन्दी)",
            Self::Tamil => "Tamil (தமிழ்)",
            Self::Bengali => "Bengali (বাংলা)",
        }
    }
}

impl FromStr for Language {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map_or_else(Self::default, Self::from_tag))
    }
}
