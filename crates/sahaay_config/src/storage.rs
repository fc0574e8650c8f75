use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::{
    Error,
    assignment::{AssignKeyValue, KvAssignment},
};

pub const DEFAULT_ROOT: &str = ".sahaay";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding persisted sessions.
    pub root: Utf8PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.into(),
        }
    }
}

impl AssignKeyValue for StorageConfig {
    const KEYS: &'static [&'static str] = &["root"];

    fn assign(&mut self, kv: &KvAssignment) -> Result<(), Error> {
        match kv.field_of("storage") {
            Some("root") if !kv.value.trim().is_empty() => self.root = kv.value.trim().into(),
            Some("root") => return Err(kv.invalid("a path")),
            _ => return Err(crate::unknown_key(&kv.key)),
        }

        Ok(())
    }
}
