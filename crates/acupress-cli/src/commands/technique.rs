use acupress_core::{Category, Config, Technique};
use clap::Subcommand;

use super::{clock, open_recorder, CliResult};

#[derive(Subcommand)]
pub enum TechniqueAction {
    /// List techniques
    List {
        /// Only this category (craniopuntura, mtc)
        #[arg(long)]
        category: Option<Category>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one technique with its instructions
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: TechniqueAction) -> CliResult {
    let config = Config::load()?;
    let recorder = open_recorder(&config)?;

    match action {
        TechniqueAction::List { category, json } => {
            let techniques = recorder.techniques(category).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&techniques)?);
            } else {
                for t in &techniques {
                    println!("{}", summary_line(t));
                }
            }
        }
        TechniqueAction::Show { id, json } => {
            let technique = recorder.technique(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&technique)?);
            } else {
                print_details(&technique, recorder.store().is_favorite(&technique.id)?);
            }
        }
    }
    Ok(())
}

pub fn summary_line(t: &Technique) -> String {
    let premium = if t.is_premium { " [premium]" } else { "" };
    format!(
        "{:>4}  {:<14} {}  ({}){premium}",
        t.id,
        t.category.to_string(),
        t.name,
        clock(t.duration)
    )
}

pub fn print_details(t: &Technique, favorite: bool) {
    let star = if favorite { " *" } else { "" };
    println!("{}{star}", t.name);
    println!("  Category:  {}", t.category);
    println!("  Condition: {}", t.condition);
    println!("  Duration:  {}", clock(t.duration));
    if !t.pressure.is_empty() {
        println!("  Pressure:  {}", t.pressure);
    }
    println!();
    println!("{}", t.description);
    if !t.instructions.is_empty() {
        println!();
        for (i, step) in t.instructions.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
    if !t.warnings.is_empty() {
        println!();
        for warning in &t.warnings {
            println!("  ! {warning}");
        }
    }
}
