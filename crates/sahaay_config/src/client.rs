use sahaay_wire::Language;
use serde::Deserialize;

use crate::{
    Error,
    assignment::{AssignKeyValue, KvAssignment},
};

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8787/chat";
pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_MAX_FRAME_CONTINUATIONS: usize = 32;

/// Settings of the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Full URL of the relay's chat endpoint.
    pub relay_url: String,

    /// Bearer token presented to the relay.
    pub api_key: Option<String>,

    /// How many recent turns are sent with every request.
    pub window: usize,

    /// Continuation lines a cut data frame may absorb before it is dropped.
    pub max_frame_continuations: usize,

    pub language: Language,

    /// Session to resume. A new one is started when unset.
    pub session: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_owned(),
            api_key: None,
            window: DEFAULT_WINDOW,
            max_frame_continuations: DEFAULT_MAX_FRAME_CONTINUATIONS,
            language: Language::default(),
            session: None,
        }
    }
}

impl AssignKeyValue for ClientConfig {
    const KEYS: &'static [&'static str] = &[
        "relay_url",
        "api_key",
        "window",
        "max_frame_continuations",
        "language",
        "session",
    ];

    fn assign(&mut self, kv: &KvAssignment) -> Result<(), Error> {
        match kv.field_of("client") {
            Some("relay_url") => self.relay_url = kv.value.trim().to_owned(),
            Some("api_key") => self.api_key = kv.optional(),
            Some("window") => match kv.parse_usize()? {
                0 => return Err(kv.invalid("a positive integer")),
                window => self.window = window,
            },
            Some("max_frame_continuations") => self.max_frame_continuations = kv.parse_usize()?,
            Some("language") => self.language = Language::from_tag(&kv.value),
            Some("session") => self.session = kv.optional(),
            _ => return Err(crate::unknown_key(&kv.key)),
        }

        Ok(())
    }
}
