//! Layered configuration.
//!
//! Layers, lowest to highest priority: built-in defaults, a TOML file,
//! `SAHAAY_*` environment variables, and explicit `KEY=VALUE` assignments.

pub mod assignment;
pub mod client;
pub mod error;
pub mod relay;
pub mod storage;

use camino::Utf8Path;
use serde::Deserialize;
use tracing::{debug, trace, warn};

pub use crate::{
    assignment::{AssignKeyValue, ENV_PREFIX, KvAssignment},
    client::ClientConfig,
    error::Error,
    relay::RelayConfig,
    storage::StorageConfig,
};
use crate::error::Result;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sahaay.toml";

const SECTIONS: &[&str] = &["relay", "client", "storage"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub relay: RelayConfig,
    pub client: ClientConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Every assignable key.
    #[must_use]
    pub fn available_keys() -> Vec<String> {
        let section = |name: &str, keys: &[&str]| {
            keys.iter()
                .map(|key| format!("{name}.{key}"))
                .collect::<Vec<_>>()
        };

        [
            section("relay", RelayConfig::KEYS),
            section("client", ClientConfig::KEYS),
            section("storage", StorageConfig::KEYS),
        ]
        .concat()
    }

    pub fn from_toml(contents: &str, path: &Utf8Path) -> Result<Self> {
        toml::from_str(contents).map_err(|error| Error::Toml {
            path: path.to_owned(),
            error,
        })
    }

    /// Read a configuration file.
    ///
    /// A missing file yields the defaults when `required` is false.
    pub fn from_file(path: &Utf8Path, required: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                debug!(%path, "Loaded config file.");
                Self::from_toml(&contents, path)
            }
            Err(error) if !required && error.kind() == std::io::ErrorKind::NotFound => {
                trace!(%path, "No config file, using defaults.");
                Ok(Self::default())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Load all layers.
    ///
    /// Without an explicit `path`, [`DEFAULT_CONFIG_FILE`] is used if it
    /// exists.
    pub fn load(path: Option<&Utf8Path>, overrides: &[KvAssignment]) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path, true)?,
            None => Self::from_file(Utf8Path::new(DEFAULT_CONFIG_FILE), false)?,
        };

        config.set_from_envs(
            std::env::vars_os()
                .filter_map(|(k, v)| k.into_string().ok().map(|k| (k, v)))
                .filter_map(|(k, v)| v.into_string().ok().map(|v| (k, v))),
        )?;

        for kv in overrides {
            config.assign(kv)?;
        }

        Ok(config)
    }

    /// Apply every `SAHAAY_*` variable in `envs`.
    ///
    /// Variables that name no config section are skipped, variables that
    /// name an unknown field of a section are an error.
    pub fn set_from_envs(&mut self, envs: impl IntoIterator<Item = (String, String)>) -> Result<()> {
        for (name, value) in envs {
            let Some(kv) = KvAssignment::from_env(&name, &value) else {
                continue;
            };

            let section = kv.key.split('.').next().unwrap_or_default();
            if !SECTIONS.contains(&section) {
                warn!(env = %name, "Ignoring environment variable outside any config section.");
                continue;
            }

            trace!(env = %name, key = %kv.key, "Applying environment override.");
            self.assign(&kv)?;
        }

        Ok(())
    }

    pub fn assign(&mut self, kv: &KvAssignment) -> Result<()> {
        let section = kv.key.split('.').next().unwrap_or_default();
        match section {
            "relay" => self.relay.assign(kv),
            "client" => self.client.assign(kv),
            "storage" => self.storage.assign(kv),
            _ => Err(unknown_key(&kv.key)),
        }
    }
}

pub(crate) fn unknown_key(key: &str) -> Error {
    Error::UnknownConfigKey {
        key: key.to_owned(),
        available_keys: Config::available_keys(),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
