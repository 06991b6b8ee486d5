//! Practice statistics derived from local session history.

use std::collections::{BTreeSet, HashMap};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::storage::HistoryEntry;

/// Summary shown by `acupress stats`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_sessions: u32,
    /// Mean star rating rounded to one decimal; 0.0 without sessions.
    pub avg_rating: f64,
    pub most_used_complaint: Option<String>,
    /// Seconds.
    pub total_time_practiced: u64,
    /// Consecutive days with practice, ending today or yesterday.
    pub streak_days: u32,
    pub favorite_techniques: Vec<String>,
}

impl UserStats {
    /// Build stats from `history` as seen on calendar day `today` (UTC).
    pub fn compute(history: &[HistoryEntry], favorites: &[String], today: NaiveDate) -> Self {
        let total_sessions = history.len() as u32;
        let total_time_practiced = history.iter().map(|e| u64::from(e.duration_secs)).sum();

        let avg_rating = if history.is_empty() {
            0.0
        } else {
            let sum: u32 = history.iter().map(|e| u32::from(e.rating.stars())).sum();
            round1(f64::from(sum) / f64::from(total_sessions))
        };

        Self {
            total_sessions,
            avg_rating,
            most_used_complaint: most_used_complaint(history),
            total_time_practiced,
            streak_days: streak_days(history, today),
            favorite_techniques: favorites.to_vec(),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Ties go to the alphabetically first complaint.
fn most_used_complaint(history: &[HistoryEntry]) -> Option<String> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for entry in history.iter().filter(|e| !e.complaint.trim().is_empty()) {
        *counts.entry(entry.complaint.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_name, a), (b_name, b)| a.cmp(b).then_with(|| b_name.cmp(a_name)))
        .map(|(name, _)| name.to_string())
}

fn streak_days(history: &[HistoryEntry], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = history.iter().map(|e| e.completed_at.date_naive()).collect();

    let yesterday = today.checked_sub_days(Days::new(1));
    let mut cursor = if days.contains(&today) {
        Some(today)
    } else if yesterday.is_some_and(|d| days.contains(&d)) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.checked_sub_days(Days::new(1));
    }
    streak
}
