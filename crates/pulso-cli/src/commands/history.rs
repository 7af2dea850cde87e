//! History command implementation.

use anyhow::{Context, Result, bail};
use clap::Subcommand;

use pulso_service::Config;

use crate::commands::{format_time, open_store};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions
    List,

    /// Show one session's readings
    Show {
        /// Session id (see `history list`)
        id: i64,
    },

    /// Delete sessions by id
    Delete {
        /// Session ids to delete
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

pub fn cmd_history(config: &Config, action: HistoryAction) -> Result<()> {
    let store = open_store(config)?;

    match action {
        HistoryAction::List => {
            let sessions = store.list_sessions().context("Failed to list sessions")?;
            if sessions.is_empty() {
                println!("No recorded sessions.");
                return Ok(());
            }

            println!(
                "{:<6} {:<20} {:<25} {:<25} {:>8}",
                "ID", "DEVICE", "START", "END", "READINGS"
            );
            for session in &sessions {
                println!(
                    "{:<6} {:<20} {:<25} {:<25} {:>8}",
                    session.id,
                    session.device,
                    format_time(session.started_at),
                    format_time(session.ended_at),
                    session.samples.len()
                );
            }
        }

        HistoryAction::Show { id } => {
            let Some(session) = store.get_session(id).context("Failed to load session")? else {
                bail!("No session with id {}", id);
            };

            println!(
                "Session #{} on {} ({} - {})",
                session.id,
                session.device,
                format_time(session.started_at),
                format_time(session.ended_at)
            );
            for sample in &session.samples {
                println!("  {}  {} bpm", format_time(sample.at), sample.bpm);
            }
        }

        HistoryAction::Delete { ids } => {
            let deleted = store
                .delete_sessions(&ids)
                .context("Failed to delete sessions")?;
            println!("Deleted {} session(s)", deleted);
        }
    }

    Ok(())
}
