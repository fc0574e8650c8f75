use serde::Deserialize;

use crate::{
    Error,
    assignment::{AssignKeyValue, KvAssignment},
};

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_UPSTREAM_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

/// Settings of the relay server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Address to listen on.
    pub bind: String,

    /// The upstream chat-completion endpoint.
    pub upstream_url: String,

    pub model: String,

    /// Upstream credential. Without it every chat request fails.
    pub api_key: Option<String>,

    /// When set, callers must present this as a bearer token.
    pub client_key: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_owned(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            client_key: None,
        }
    }
}

impl AssignKeyValue for RelayConfig {
    const KEYS: &'static [&'static str] = &["bind", "upstream_url", "model", "api_key", "client_key"];

    fn assign(&mut self, kv: &KvAssignment) -> Result<(), Error> {
        match kv.field_of("relay") {
            Some("bind") => self.bind = kv.value.trim().to_owned(),
            Some("upstream_url") => self.upstream_url = kv.value.trim().to_owned(),
            Some("model") => self.model = kv.value.trim().to_owned(),
            Some("api_key") => self.api_key = kv.optional(),
            Some("client_key") => self.client_key = kv.optional(),
            _ => return Err(crate::unknown_key(&kv.key)),
        }

        Ok(())
    }
}
