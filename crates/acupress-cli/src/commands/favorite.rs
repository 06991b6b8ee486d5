use acupress_core::Config;
use clap::Subcommand;

use super::technique::summary_line;
use super::{open_recorder, CliResult};

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// Mark a technique as favorite
    Add { id: String },
    /// Remove a technique from favorites
    Remove { id: String },
    /// Add the technique if it is not a favorite, remove it otherwise
    Toggle { id: String },
    /// List favorite techniques
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: FavoriteAction) -> CliResult {
    let config = Config::load()?;
    let recorder = open_recorder(&config)?;

    match action {
        FavoriteAction::Add { id } => {
            let technique = recorder.technique(&id).await?;
            if recorder.add_favorite(&technique.id).await? {
                println!("added {} to favorites", technique.name);
            } else {
                println!("{} is already a favorite", technique.name);
            }
        }
        FavoriteAction::Remove { id } => {
            if recorder.remove_favorite(&id).await? {
                println!("removed {id} from favorites");
            } else {
                println!("{id} is not a favorite");
            }
        }
        FavoriteAction::Toggle { id } => {
            let technique = recorder.technique(&id).await?;
            if recorder.toggle_favorite(&technique.id).await? {
                println!("added {} to favorites", technique.name);
            } else {
                println!("removed {} from favorites", technique.name);
            }
        }
        FavoriteAction::List { json } => {
            let favorites = recorder.favorites().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&favorites)?);
            } else if favorites.is_empty() {
                println!("no favorites yet");
            } else {
                for t in &favorites {
                    println!("{}", summary_line(t));
                }
            }
        }
    }
    Ok(())
}
