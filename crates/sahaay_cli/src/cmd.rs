mod chat;
mod check;
mod history;
mod serve;

use sahaay_config::Config;

use crate::{Result, ctx::Ctx};

/// Exit code of a command that flagged a possible emergency.
pub(crate) const FLAGGED: u8 = 3;

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Run the relay server.
    Serve(serve::Serve),

    /// Chat with the assistant.
    Chat(chat::Chat),

    /// Show persisted conversations.
    #[command(visible_alias = "h")]
    History(history::History),

    /// Check text against the emergency phrase list.
    Check(check::Check),
}

impl Commands {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        match self {
            Commands::Serve(args) => args.run(ctx).await,
            Commands::Chat(args) => args.run(ctx).await,
            Commands::History(args) => args.run(ctx).await,
            Commands::Check(args) => args.run(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Serve(_) => "serve",
            Commands::Chat(_) => "chat",
            Commands::History(_) => "history",
            Commands::Check(_) => "check",
        }
    }

    /// Fold the command's own flags into `config`.
    pub(crate) fn apply_cli_config(&self, config: &mut Config) -> Result<()> {
        match self {
            Commands::Serve(args) => args.apply_cli_config(config),
            Commands::Chat(args) => args.apply_cli_config(config),
            Commands::History(args) => args.apply_cli_config(config),
            Commands::Check(_) => Ok(()),
        }
    }
}

/// The type of output that should be printed to the screen.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Success {
    /// The command was successful.
    Ok,

    /// Single message to be printed to the screen.
    Message(String),
}

impl From<String> for Success {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

/// A command that ended with a specific exit code.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct Error {
    /// Used to exit the CLI with a specific exit code. This is usually `1`.
    pub(crate) code: u8,

    /// The message to be displayed to the user.
    pub(crate) message: String,
}

impl Error {
    pub(crate) fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::new(1, message)
    }
}
