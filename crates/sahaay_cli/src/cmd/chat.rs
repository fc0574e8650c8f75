use std::{
    io::{self, Write as _},
    sync::Arc,
};

use crossterm::style::Stylize as _;
use sahaay_client::RelayClient;
use sahaay_config::{Config, KvAssignment};
use sahaay_conversation::{Assembler, Rejection, SendOutcome, Session, SessionId, Update};
use sahaay_storage::FileStore;
use sahaay_wire::{Failure, Turn};
use tokio::{
    io::{AsyncBufReadExt as _, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::Success;
use crate::{Result, ctx::Ctx, signals};

const BANNER: &str = "Possible emergency. Call 112 (India Emergency) or your local emergency \
                      number, or go to the nearest hospital now.";

#[derive(Debug, clap::Args)]
pub(crate) struct Chat {
    /// Resume this session instead of starting a new one.
    #[arg(long)]
    session: Option<String>,

    /// Language to answer in (en, hi, ta, bn).
    #[arg(short, long, value_name = "TAG")]
    language: Option<String>,
}

impl Chat {
    pub(crate) fn apply_cli_config(&self, config: &mut Config) -> Result<()> {
        if let Some(session) = &self.session {
            config.assign(&KvAssignment::new("client.session", session))?;
        }

        if let Some(language) = &self.language {
            config.assign(&KvAssignment::new("client.language", language))?;
        }

        Ok(())
    }

    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        let config = &ctx.config;
        let printer = Printer { styled: ctx.is_tty };

        let store = Arc::new(FileStore::new(config.storage.root.clone()).await?);
        let relay = Arc::new(
            RelayClient::new(&config.client.relay_url)
                .with_api_key(config.client.api_key.clone())
                .with_max_continuations(config.client.max_frame_continuations),
        );

        let id = match config.client.session.as_deref() {
            Some(id) => id.parse()?,
            None => SessionId::new(),
        };
        let session = Session::new(id, config.client.language);

        let (updates_tx, mut updates) = mpsc::unbounded_channel();
        let mut assembler = Assembler::new(relay, store)
            .with_session(session)
            .with_window(config.client.window)
            .with_updates(updates_tx);

        let restored = assembler.restore_history().await?;
        info!(session = %id, restored, "Chat started.");

        printer.header(id, config.client.language.display_name())?;
        for turn in assembler.transcript().turns() {
            printer.turn(turn)?;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            printer.prompt()?;

            let input = tokio::select! {
                input = lines.next_line() => input?,
                () = signals::ctrl_c() => None,
            };

            let Some(input) = input else {
                break;
            };

            match input.trim() {
                "/quit" | "/exit" => break,
                "/dismiss" => {
                    assembler.safety_signal_mut().dismiss();
                    write_line("Banner dismissed.")?;
                    continue;
                }
                _ => {}
            }

            let cancel = CancellationToken::new();
            let outcome = {
                let send = assembler.send(&input, cancel.clone());
                tokio::pin!(send);

                loop {
                    tokio::select! {
                        outcome = &mut send => break outcome,
                        Some(update) = updates.recv() => printer.update(update)?,
                        () = signals::ctrl_c(), if !cancel.is_cancelled() => {
                            debug!("Cancelling response.");
                            cancel.cancel();
                        }
                    }
                }
            };

            while let Ok(update) = updates.try_recv() {
                printer.update(update)?;
            }

            match outcome {
                SendOutcome::Rejected(Rejection::Empty) => {}
                SendOutcome::Rejected(rejection) => {
                    write_line(&format!("Not sent: {rejection:?}."))?;
                }
                SendOutcome::Completed { turn: None, .. } => write_line("(no response)")?,
                SendOutcome::Completed { .. } | SendOutcome::Failed(_) => {}
            }
        }

        assembler.sync().await;
        Ok(format!("Session {id} saved.").into())
    }
}

/// Writes the conversation to stdout as it happens.
struct Printer {
    styled: bool,
}

impl Printer {
    fn header(&self, session: SessionId, language: &str) -> io::Result<()> {
        let text = format!(
            "Session {session} ({language}). Type /dismiss to hide the banner, /quit to leave."
        );
        if self.styled {
            return write_line(&text.dim().to_string());
        }

        write_line(&text)
    }

    fn prompt(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        if self.styled {
            write!(stdout, "{} ", ">".bold())?;
        } else {
            write!(stdout, "> ")?;
        }
        stdout.flush()
    }

    fn turn(&self, turn: &Turn) -> io::Result<()> {
        if turn.is_user() && self.styled {
            return write_line(&format!("{} {}", ">".bold(), turn.content.as_str().bold()));
        } else if turn.is_user() {
            return write_line(&format!("> {}", turn.content));
        }

        write_line(&turn.content)?;
        write_line("")
    }

    fn update(&self, update: Update) -> io::Result<()> {
        match update {
            Update::UserTurn(_) => Ok(()),
            Update::SafetySignal { keywords } => self.banner(&keywords),
            Update::Delta { text, .. } => {
                let mut stdout = io::stdout().lock();
                write!(stdout, "{text}")?;
                stdout.flush()
            }
            Update::Finalized { .. } => write_line("\n"),
            Update::Notice(failure) => self.notice(&failure),
        }
    }

    fn banner(&self, keywords: &[&str]) -> io::Result<()> {
        let text = format!("🚨 {BANNER} [{}]", keywords.join(", "));
        if self.styled {
            return write_line(&text.white().on_red().bold().to_string());
        }

        write_line(&text)
    }

    fn notice(&self, failure: &Failure) -> io::Result<()> {
        let text = failure.notice();
        if self.styled {
            return write_line(&text.yellow().to_string());
        }

        write_line(text)
    }
}

fn write_line(text: &str) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{text}")
}
