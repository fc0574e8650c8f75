//! See [`Transcript`].

use sahaay_wire::Turn;
use tracing::trace;

use crate::{Error, GenerationId, Result};

/// The ordered turns of one conversation.
///
/// At most one assistant turn is open at a time. It belongs to the generation
/// passed to [`Transcript::begin`], directly follows the user turn it answers,
/// and only grows through [`Transcript::apply_delta`] calls for that same
/// generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
    open: Option<OpenTurn>,

    /// The most recently closed generation, so that finalizing twice is a
    /// no-op.
    closed: Option<GenerationId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenTurn {
    generation: GenerationId,

    /// Index of the assistant turn, once the first delta created it.
    index: Option<usize>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript seeded with already finalized turns.
    #[must_use]
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The generation whose assistant turn is open, if any.
    #[must_use]
    pub fn open_generation(&self) -> Option<GenerationId> {
        self.open.map(|open| open.generation)
    }

    /// The most recent `size` turns, oldest first.
    #[must_use]
    pub fn window(&self, size: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(size);
        &self.turns[start..]
    }

    /// Append a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<&Turn> {
        if let Some(open) = self.open {
            return Err(Error::TurnOpen(open.generation));
        }

        self.turns.push(Turn::user(content));
        Ok(&self.turns[self.turns.len() - 1])
    }

    /// Open the assistant turn of `generation`, answering the last user turn.
    ///
    /// The turn itself is created by the first delta.
    pub fn begin(&mut self, generation: GenerationId) -> Result<()> {
        if let Some(open) = self.open {
            return Err(Error::TurnOpen(open.generation));
        }

        if !self.turns.last().is_some_and(Turn::is_user) {
            return Err(Error::NoUserTurn);
        }

        trace!(%generation, "Opening assistant turn.");
        self.open = Some(OpenTurn {
            generation,
            index: None,
        });

        Ok(())
    }

    /// Append `text` to the assistant turn of `generation`.
    ///
    /// Deltas of any other generation are rejected.
    pub fn apply_delta(&mut self, generation: GenerationId, text: &str) -> Result<&Turn> {
        let open = self
            .open
            .as_mut()
            .filter(|open| open.generation == generation)
            .ok_or(Error::StaleGeneration { got: generation })?;

        let index = match open.index {
            Some(index) => index,
            None => {
                self.turns.push(Turn::assistant(String::new()));
                let index = self.turns.len() - 1;
                open.index = Some(index);
                index
            }
        };

        let turn = &mut self.turns[index];
        turn.content.push_str(text);
        Ok(turn)
    }

    /// Close the assistant turn of `generation`.
    ///
    /// Returns the finalized turn, or `None` if it received no text, in which
    /// case it is removed. Finalizing an already closed generation returns
    /// `None` again.
    pub fn finalize(&mut self, generation: GenerationId) -> Result<Option<Turn>> {
        if self.closed == Some(generation) {
            return Ok(None);
        }

        let open = self.take_open(generation)?;
        let Some(index) = open.index else {
            return Ok(None);
        };

        if self.turns[index].content.is_empty() {
            self.turns.remove(index);
            return Ok(None);
        }

        Ok(Some(self.turns[index].clone()))
    }

    /// Close the assistant turn of `generation`, discarding any partial text.
    pub fn abandon(&mut self, generation: GenerationId) -> Result<Option<Turn>> {
        if self.closed == Some(generation) {
            return Ok(None);
        }

        let open = self.take_open(generation)?;
        Ok(open.index.map(|index| self.turns.remove(index)))
    }

    fn take_open(&mut self, generation: GenerationId) -> Result<OpenTurn> {
        let open = self
            .open
            .take_if(|open| open.generation == generation)
            .ok_or(Error::StaleGeneration { got: generation })?;

        trace!(%generation, "Closing assistant turn.");
        self.closed = Some(generation);
        Ok(open)
    }
}

#[cfg(test)]
#[path = "transcript_tests.rs"]
mod tests;
