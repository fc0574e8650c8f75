use super::{Error, FLAGGED, Success};
use crate::Result;

#[derive(Debug, clap::Args)]
pub(crate) struct Check {
    /// The text to check.
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,
}

impl Check {
    /// Exits with [`FLAGGED`] when the text matches an emergency phrase.
    pub(crate) fn run(self) -> Result<Success> {
        let text = self.text.join(" ");
        let keywords = sahaay_emergency::matches(&text);
        if keywords.is_empty() {
            return Ok("No emergency phrases found.".to_owned().into());
        }

        Err(Error::new(FLAGGED, format!("Possible emergency: {}", keywords.join(", "))).into())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error;

    fn check(text: &[&str]) -> Result<Success> {
        Check {
            text: text.iter().map(ToString::to_string).collect(),
        }
        .run()
    }

    #[test]
    fn benign_text_passes() {
        assert_matches!(check(&["I", "have", "a", "mild", "cold"]), Ok(Success::Message(_)));
    }

    #[test]
    fn emergency_text_is_flagged() {
        assert_matches!(
            check(&["Chest", "PAIN", "since", "morning"]),
            Err(error::Error::Command(Error { code: FLAGGED, message })) if message.contains("chest pain")
        );
    }
}
