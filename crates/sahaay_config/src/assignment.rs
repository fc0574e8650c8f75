use std::str::FromStr;

use crate::Error;

/// Prefix of environment variables that override configuration.
pub const ENV_PREFIX: &str = "SAHAAY_";

pub trait AssignKeyValue {
    /// Every key this section accepts, relative to the section.
    const KEYS: &'static [&'static str];

    /// Assign `kv` to the field named by its key.
    fn assign(&mut self, kv: &KvAssignment) -> Result<(), Error>;
}

/// A single `section.field=value` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvAssignment {
    /// The full, dotted key.
    pub key: String,

    pub value: String,
}

impl KvAssignment {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse an assignment from an environment variable.
    ///
    /// `SAHAAY_RELAY_API_KEY` sets `relay.api_key`. Returns `None` for
    /// variables without the [`ENV_PREFIX`].
    #[must_use]
    pub fn from_env(name: &str, value: &str) -> Option<Self> {
        let key = name.strip_prefix(ENV_PREFIX)?.to_ascii_lowercase();
        let key = match key.split_once('_') {
            Some((section, field)) => format!("{section}.{field}"),
            None => key,
        };

        Some(Self::new(key, value))
    }

    /// The key below `section`, if the key belongs to it.
    #[must_use]
    pub fn field_of(&self, section: &str) -> Option<&str> {
        self.key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('.'))
    }

    pub(crate) fn invalid(&self, need: &'static str) -> Error {
        Error::InvalidConfigValue {
            key: self.key.clone(),
            value: self.value.clone(),
            need,
        }
    }

    pub(crate) fn parse_usize(&self) -> Result<usize, Error> {
        self.value
            .trim()
            .parse()
            .map_err(|_| self.invalid("a non-negative integer"))
    }

    /// An empty value unsets an optional field.
    pub(crate) fn optional(&self) -> Option<String> {
        let value = self.value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    }
}

impl FromStr for KvAssignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidAssignment(s.to_owned()))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidAssignment(s.to_owned()));
        }

        Ok(Self::new(key, value))
    }
}
