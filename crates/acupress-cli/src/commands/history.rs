use acupress_core::{Backend, Config, LocalStore};
use clap::Subcommand;

use super::{clock, open_recorder, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Maximum number of entries
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Ask the backend instead of the local store
        #[arg(long)]
        remote: bool,
    },
    /// Upload sessions and favorite changes the backend has not received yet
    Sync,
}

pub async fn run(action: HistoryAction) -> CliResult {
    match action {
        HistoryAction::List {
            limit,
            json,
            remote: true,
        } => {
            let config = Config::load()?;
            let recorder = open_recorder(&config)?;
            let sessions: Vec<_> = recorder
                .backend()
                .sessions()
                .await?
                .into_iter()
                .take(limit)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }
            for s in &sessions {
                let rating = s.rating.map_or("-".to_string(), |r| format!("{r}/5"));
                println!(
                    "{}  {:<28} {}  {rating}",
                    s.date.format("%Y-%m-%d %H:%M"),
                    s.technique_name,
                    clock(s.duration),
                );
            }
        }
        HistoryAction::List { limit, json, .. } => {
            let store = LocalStore::open()?;
            let history: Vec<_> = store.history()?.into_iter().take(limit).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
                return Ok(());
            }
            if history.is_empty() {
                println!("no sessions recorded");
            }
            for entry in &history {
                let pending = if entry.synced { "" } else { "  (not synced)" };
                println!(
                    "{}  {:<28} {}  {}/5{pending}",
                    entry.completed_at.format("%Y-%m-%d %H:%M"),
                    entry.technique_name,
                    clock(entry.duration_secs),
                    entry.rating.stars(),
                );
            }
        }
        HistoryAction::Sync => {
            let config = Config::load()?;
            let recorder = open_recorder(&config)?;
            let report = recorder.sync_pending().await?;
            println!("synced {} session(s), {} pending", report.sent, report.remaining);
            if report.favorites_sent + report.favorites_remaining > 0 {
                println!(
                    "synced {} favorite change(s), {} pending",
                    report.favorites_sent, report.favorites_remaining
                );
            }
            if let Some(at) = recorder.last_sync()? {
                println!("last complete sync: {}", at.format("%Y-%m-%d %H:%M UTC"));
            }
        }
    }
    Ok(())
}
