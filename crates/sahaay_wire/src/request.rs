use serde::{Deserialize, Serialize};

use crate::{Language, Turn};

/// The body a client posts to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelayRequest {
    /// The conversation window, oldest turn first.
    ///
    /// `messages` is accepted for clients that predate the rename.
    #[serde(alias = "messages")]
    pub turns: Vec<Turn>,

    #[serde(default)]
    pub language: Language,
}

impl RelayRequest {
    #[must_use]
    pub fn new(turns: Vec<Turn>, language: Language) -> Self {
        Self { turns, language }
    }

    /// The most recent user turn, if any.
    #[must_use]
    pub fn last_user_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.is_user())
    }
}

/// The JSON body of every relay failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn accepts_messages_alias_and_missing_language() {
        let request: RelayRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}"#,
        )
        .unwrap();

        assert_eq!(request.language, Language::English);
        assert_eq!(request.turns, vec![Turn::user("hi"), Turn::assistant("hello")]);
        assert_eq!(request.last_user_turn(), Some(&Turn::user("hi")));
    }

    #[test]
    fn serializes_turns_and_language_tag() {
        let request = RelayRequest::new(vec![Turn::user("bukhar")], Language::Hindi);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "turns": [{"role": "user", "content": "bukhar"}],
                "language": "hi",
            })
        );
    }
}
