use acupress_core::{LocalStore, UserStats};
use chrono::Utc;

use super::{clock, CliResult};

pub fn run(json: bool) -> CliResult {
    let store = LocalStore::open()?;
    let history = store.history()?;
    let favorites = store.favorites()?;
    let stats = UserStats::compute(&history, &favorites, Utc::now().date_naive());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Sessions:        {}", stats.total_sessions);
    println!("Average rating:  {:.1}", stats.avg_rating);
    println!(
        "Time practiced:  {}",
        clock(u32::try_from(stats.total_time_practiced).unwrap_or(u32::MAX))
    );
    println!("Streak:          {} day(s)", stats.streak_days);
    if let Some(complaint) = &stats.most_used_complaint {
        println!("Most treated:    {complaint}");
    }
    if !stats.favorite_techniques.is_empty() {
        println!("Favorites:       {}", stats.favorite_techniques.join(", "));
    }
    Ok(())
}
