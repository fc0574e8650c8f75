//! Conversation state: the transcript, its persistence, and the assembler that
//! folds a streamed response into it.

pub mod assembler;
pub mod error;
pub mod id;
pub mod mock;
pub mod relay;
pub mod session;
pub mod store;
pub mod transcript;

pub use assembler::{Assembler, DEFAULT_WINDOW, Rejection, SendOutcome, State, Update};
pub use error::{Error, Result};
pub use id::{GenerationId, SessionId};
pub use relay::Relay;
pub use session::{Session, TurnRecord};
pub use store::{MemoryStore, TurnStore};
pub use transcript::Transcript;
