use crossterm::style::Stylize as _;
use sahaay_config::{Config, KvAssignment};
use sahaay_conversation::{SessionId, TurnRecord, TurnStore as _};
use sahaay_storage::FileStore;

use super::Success;
use crate::{Result, ctx::Ctx};

#[derive(Debug, clap::Args)]
pub(crate) struct History {
    /// Session to print. Lists all sessions when omitted.
    #[arg(long)]
    session: Option<String>,
}

impl History {
    pub(crate) fn apply_cli_config(&self, config: &mut Config) -> Result<()> {
        if let Some(session) = &self.session {
            config.assign(&KvAssignment::new("client.session", session))?;
        }

        Ok(())
    }

    pub(crate) async fn run(self, ctx: &mut Ctx) -> Result<Success> {
        let store = FileStore::new(ctx.config.storage.root.clone()).await?;

        let Some(session) = ctx.config.client.session.as_deref() else {
            return list_sessions(&store).await;
        };

        let session: SessionId = session.parse()?;
        let records = store.list(session).await?;
        if records.is_empty() {
            return Err(super::Error::from(format!("No turns stored for session {session}.")).into());
        }

        let lines: Vec<_> = records
            .iter()
            .map(|record| render_record(record, ctx.is_tty))
            .collect();

        Ok(lines.join("\n").into())
    }
}

async fn list_sessions(store: &FileStore) -> Result<Success> {
    let sessions = store.sessions().await?;
    if sessions.is_empty() {
        return Ok("No stored sessions.".to_owned().into());
    }

    let mut lines = vec![];
    for session in sessions {
        let records = store.list(session).await?;
        let last = records
            .last()
            .map(|record| record.created_at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        lines.push(format!("{session}  {:>4} turns  {last}", records.len()));
    }

    Ok(lines.join("\n").into())
}

fn render_record(record: &TurnRecord, is_tty: bool) -> String {
    let time = record.created_at.format("%H:%M:%S");
    let role = record.turn.role.as_str();

    if is_tty {
        let role = if record.turn.is_user() {
            role.blue().bold()
        } else {
            role.green().bold()
        };

        return format!("{} {role}: {}", time.to_string().dim(), record.turn.content);
    }

    format!("{time} {role}: {}", record.turn.content)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sahaay_conversation::Session;
    use sahaay_wire::{Language, Turn};

    use super::*;

    #[test]
    fn renders_plain_records() {
        let session = Session::new(SessionId::new(), Language::Hindi);
        let mut record = TurnRecord::new(&session, Turn::assistant("नमस्ते"));
        record.created_at = "2026-03-01T09:15:00Z".parse().unwrap();

        assert_eq!(render_record(&record, false), "09:15:00 assistant: नमस्ते");
    }
}
