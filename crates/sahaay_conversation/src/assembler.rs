//! See [`Assembler`].

use std::sync::Arc;

use futures::StreamExt as _;
use sahaay_emergency::SafetySignal;
use sahaay_stream::FrameEvent;
use sahaay_wire::{Failure, Turn};
use tokio::{sync::mpsc::UnboundedSender, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{GenerationId, Relay, Result, Session, Transcript, TurnRecord, TurnStore};

/// Number of most recent turns sent with every request.
pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Sending,
    Streaming,
    Errored,
}

/// Why a send did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The text was empty or whitespace.
    Empty,

    /// The transcript refused the turn, an assistant turn is still open.
    Busy,

    /// There is no session to send in.
    Unauthenticated,
}

/// How a call to [`Assembler::send`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent. The transcript is unchanged.
    Rejected(Rejection),

    /// The response stream ended.
    ///
    /// `turn` is the finalized assistant turn, or `None` if the response
    /// carried no text.
    Completed {
        generation: GenerationId,
        turn: Option<Turn>,
    },

    /// The relay failed. The user turn stays, any partial answer is gone.
    Failed(Failure),
}

/// Progress notifications, in the order things happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    UserTurn(Turn),

    /// The user's text matched the emergency phrase list.
    SafetySignal { keywords: Vec<&'static str> },

    Delta { generation: GenerationId, text: String },

    Finalized { generation: GenerationId, turn: Turn },

    /// A non-fatal notice to show the user.
    Notice(Failure),
}

/// Folds a relay's event stream into the conversation transcript.
#[derive(Debug)]
pub struct Assembler {
    relay: Arc<dyn Relay>,
    store: Arc<dyn TurnStore>,
    session: Option<Session>,
    transcript: Transcript,
    state: State,
    window: usize,
    safety: SafetySignal,
    updates: Option<UnboundedSender<Update>>,

    /// Outstanding fire-and-forget persistence.
    persisting: JoinSet<()>,
}

impl Assembler {
    #[must_use]
    pub fn new(relay: Arc<dyn Relay>, store: Arc<dyn TurnStore>) -> Self {
        Self {
            relay,
            store,
            session: None,
            transcript: Transcript::new(),
            state: State::Idle,
            window: DEFAULT_WINDOW,
            safety: SafetySignal::default(),
            updates: None,
            persisting: JoinSet::new(),
        }
    }

    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_updates(mut self, updates: UnboundedSender<Update>) -> Self {
        self.updates = Some(updates);
        self
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn sign_out(&mut self) {
        self.session = None;
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn safety_signal(&self) -> &SafetySignal {
        &self.safety
    }

    pub fn safety_signal_mut(&mut self) -> &mut SafetySignal {
        &mut self.safety
    }

    /// Replace the transcript with previously persisted turns.
    ///
    /// Only possible while idle. Returns the number of restored turns.
    pub fn restore(&mut self, records: Vec<TurnRecord>) -> usize {
        if self.state != State::Idle {
            warn!(state = ?self.state, "Not restoring history while a send is in flight.");
            return 0;
        }

        let turns: Vec<_> = records.into_iter().map(|record| record.turn).collect();
        let count = turns.len();
        self.transcript = Transcript::from_turns(turns);
        count
    }

    /// Load the current session's history from the store.
    pub async fn restore_history(&mut self) -> Result<usize> {
        let Some(session) = &self.session else {
            return Ok(0);
        };

        let records = self.store.list(session.id).await?;
        let count = self.restore(records);
        debug!(count, "Restored conversation history.");
        Ok(count)
    }

    /// Send `text` as a user turn and stream the answer into the transcript.
    ///
    /// Cancelling `cancel` stops the stream early; the text received so far
    /// is finalized as usual.
    pub async fn send(&mut self, text: &str, cancel: CancellationToken) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Rejected(Rejection::Empty);
        }

        self.reap_persisted();
        self.recover_interrupted();

        let Some(session) = self.session.clone() else {
            return SendOutcome::Rejected(Rejection::Unauthenticated);
        };

        let generation = GenerationId::new();
        let turn = match self.transcript.push_user(text) {
            Ok(turn) => turn.clone(),
            Err(error) => {
                error!(%error, "Transcript refused the user turn.");
                return SendOutcome::Rejected(Rejection::Busy);
            }
        };

        self.state = State::Sending;
        self.persist_in_background(&session, turn.clone());
        self.notify(Update::UserTurn(turn));

        let keywords = sahaay_emergency::matches(text);
        if !keywords.is_empty() {
            if self.safety.raise() {
                info!("Safety signal raised.");
            }
            self.notify(Update::SafetySignal { keywords });
        }

        let window = self.transcript.window(self.window).to_vec();
        if let Err(error) = self.transcript.begin(generation) {
            error!(%error, "Transcript refused to open an assistant turn.");
            self.state = State::Idle;
            return SendOutcome::Rejected(Rejection::Busy);
        }

        debug!(%generation, turns = window.len(), "Opening relay stream.");
        let mut events = match self.relay.open(&session, &window, cancel).await {
            Ok(events) => events,
            Err(failure) => return self.fail(generation, failure),
        };

        self.state = State::Streaming;
        while let Some(event) = events.next().await {
            match event {
                Ok(FrameEvent::Delta(text)) => {
                    if let Err(error) = self.transcript.apply_delta(generation, &text) {
                        warn!(%error, "Dropping delta.");
                        continue;
                    }

                    trace!(%generation, bytes = text.len(), "Applied delta.");
                    self.notify(Update::Delta { generation, text });
                }
                Ok(FrameEvent::Terminal) => break,
                Err(error) => return self.fail(generation, error.into()),
            }
        }
        drop(events);

        let turn = match self.transcript.finalize(generation) {
            Ok(turn) => turn,
            Err(error) => {
                error!(%error, "Could not finalize assistant turn.");
                None
            }
        };

        if let Some(turn) = &turn {
            // Keep the user turn ahead of its answer in the store.
            self.sync().await;

            let record = TurnRecord::new(&session, turn.clone());
            if let Err(error) = self.store.insert(record).await {
                error!(%error, "Failed to persist assistant turn.");
            }

            self.notify(Update::Finalized {
                generation,
                turn: turn.clone(),
            });
        } else {
            debug!(%generation, "Response carried no text, nothing to persist.");
        }

        self.state = State::Idle;
        SendOutcome::Completed { generation, turn }
    }

    /// Wait for outstanding background persistence to finish.
    pub async fn sync(&mut self) {
        while let Some(result) = self.persisting.join_next().await {
            if let Err(error) = result {
                error!(%error, "Error waiting for persistence task to complete.");
            }
        }
    }

    /// Undo the leftovers of a send whose future was dropped before it
    /// finished.
    ///
    /// `send` borrows the assembler mutably, so a state other than `Idle` at
    /// the start of a send can only come from an interrupted call.
    fn recover_interrupted(&mut self) {
        if self.state == State::Idle {
            return;
        }

        warn!(state = ?self.state, "Previous send was interrupted, resetting.");
        if let Some(generation) = self.transcript.open_generation() {
            match self.transcript.abandon(generation) {
                Ok(Some(partial)) => {
                    debug!(bytes = partial.content.len(), "Discarded partial assistant turn.");
                }
                Ok(None) => {}
                Err(error) => error!(%error, "Could not close assistant turn."),
            }
        }

        self.state = State::Idle;
    }

    /// Collect persistence tasks that already finished.
    fn reap_persisted(&mut self) {
        while let Some(result) = self.persisting.try_join_next() {
            if let Err(error) = result {
                error!(%error, "Error waiting for persistence task to complete.");
            }
        }
    }

    fn fail(&mut self, generation: GenerationId, failure: Failure) -> SendOutcome {
        self.state = State::Errored;
        warn!(%generation, %failure, "Relay failed.");

        match self.transcript.abandon(generation) {
            Ok(Some(partial)) => {
                debug!(bytes = partial.content.len(), "Discarded partial assistant turn.");
            }
            Ok(None) => {}
            Err(error) => error!(%error, "Could not close assistant turn."),
        }

        self.notify(Update::Notice(failure.clone()));
        self.state = State::Idle;
        SendOutcome::Failed(failure)
    }

    fn persist_in_background(&mut self, session: &Session, turn: Turn) {
        let store = Arc::clone(&self.store);
        let record = TurnRecord::new(session, turn);

        self.persisting.spawn(async move {
            if let Err(error) = store.insert(record).await {
                error!(%error, "Failed to persist user turn.");
            }
        });
    }

    fn notify(&self, update: Update) {
        let Some(updates) = &self.updates else {
            return;
        };

        if updates.send(update).is_err() {
            trace!("Update receiver dropped.");
        }
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
