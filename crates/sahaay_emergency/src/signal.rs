/// The latched "possible emergency" state behind the safety banner.
///
/// Once raised it stays raised until explicitly dismissed, no matter how many
/// later messages are benign.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SafetySignal {
    raised: bool,
}

impl SafetySignal {
    /// Latch the signal. Returns `true` if it was not raised before.
    pub fn raise(&mut self) -> bool {
        !std::mem::replace(&mut self.raised, true)
    }

    pub fn dismiss(&mut self) {
        self.raised = false;
    }

    #[must_use]
    pub const fn is_raised(&self) -> bool {
        self.raised
    }

    /// Run [`crate::detect`] on `text` and latch on a match.
    ///
    /// Returns whether `text` matched, regardless of the previous state.
    pub fn observe(&mut self, text: &str) -> bool {
        let hit = crate::detect(text);
        if hit {
            self.raise();
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_latched_until_dismissed() {
        let mut signal = SafetySignal::default();
        assert!(!signal.observe("hello"));
        assert!(!signal.is_raised());

        assert!(signal.observe("chest pain"));
        assert!(!signal.observe("thanks, feeling better"));
        assert!(signal.is_raised());

        signal.dismiss();
        assert!(!signal.is_raised());
    }

    #[test]
    fn raise_reports_transitions() {
        let mut signal = SafetySignal::default();
        assert!(signal.raise());
        assert!(!signal.raise());
    }
}
