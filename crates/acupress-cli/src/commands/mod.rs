pub mod config;
pub mod favorite;
pub mod history;
pub mod session;
pub mod stats;
pub mod technique;

use acupress_core::{ApiClient, Config, HistoryRecorder, LocalStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Backend client plus local store, as configured on disk.
pub fn open_recorder(config: &Config) -> Result<HistoryRecorder<ApiClient>, Box<dyn std::error::Error>> {
    let client = ApiClient::new(&config.api)?;
    let store = LocalStore::open()?;
    Ok(HistoryRecorder::new(client, store))
}

/// `mm:ss`
pub fn clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
