//! Types shared by the relay server and its clients.

pub mod failure;
pub mod language;
pub mod request;
pub mod turn;

pub use failure::{Failure, FailureKind};
pub use language::Language;
pub use request::{ErrorBody, RelayRequest};
pub use turn::{Role, Turn};
