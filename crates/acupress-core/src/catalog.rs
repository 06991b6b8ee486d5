//! Technique catalog.
//!
//! The backend owns the real catalog; [`builtin_catalog`] is the offline copy
//! served when it cannot be reached.

use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Scalp acupuncture points.
    Craniopuntura,
    /// Traditional Chinese medicine points.
    Mtc,
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "craniopuntura" => Ok(Category::Craniopuntura),
            "mtc" => Ok(Category::Mtc),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Craniopuntura => f.write_str("craniopuntura"),
            Category::Mtc => f.write_str("mtc"),
        }
    }
}

/// One acupressure point and how to apply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technique {
    /// Backend ids are strings; the offline table historically used numbers.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub category: Category,
    pub condition: String,
    pub description: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Session length in seconds.
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub pressure: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub is_premium: bool,
}

fn default_duration() -> u32 {
    60
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn technique(
    id: u32,
    name: &str,
    category: Category,
    condition: &str,
    description: &str,
    instructions: &[&str],
    pressure: &str,
    warnings: &[&str],
    is_premium: bool,
) -> Technique {
    Technique {
        id: id.to_string(),
        name: name.into(),
        category,
        condition: condition.into(),
        description: description.into(),
        instructions: instructions.iter().map(|s| s.to_string()).collect(),
        duration: default_duration(),
        pressure: pressure.into(),
        warnings: warnings.iter().map(|s| s.to_string()).collect(),
        is_premium,
    }
}

/// Offline catalog.
pub fn builtin_catalog() -> &'static [Technique] {
    static CATALOG: OnceLock<Vec<Technique>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            technique(
                1,
                "Headache - Scalp Point A",
                Category::Craniopuntura,
                "Headache, tension headache",
                "Scalp point A for relieving headaches",
                &[
                    "Find the point at the centre of the forehead, between the eyebrows",
                    "Apply gentle, steady pressure with the middle finger",
                    "Hold for 1 minute while breathing deeply",
                    "Make light clockwise circles",
                ],
                "Light to moderate",
                &["Do not press too hard", "Stop if you feel dizzy"],
                false,
            ),
            technique(
                2,
                "Back Pain - Scalp Extra Point",
                Category::Craniopuntura,
                "Back pain, muscle tension",
                "Scalp extra point for back pain and tension",
                &[
                    "Find the point on top of the head where a line between the ears meets",
                    "Apply gentle pressure with the fingertips",
                    "Hold for 1 minute with deep breathing",
                    "Make small circles",
                ],
                "Light",
                &["Do not press too hard", "Best done seated"],
                false,
            ),
            technique(
                3,
                "Hand Pain - Scalp Point C",
                Category::Craniopuntura,
                "Hand and joint pain",
                "Scalp point C for pain and tension in the hands",
                &[
                    "Find the hollows at the temples, beside the eyes",
                    "Use the index and middle fingers of both hands",
                    "Apply gentle, symmetric pressure on both sides",
                    "Hold for 1 minute with slow circles",
                ],
                "Light to moderate",
                &["Keep pressure symmetric", "Stop if pain increases"],
                false,
            ),
            technique(
                4,
                "Hegu (LI4)",
                Category::Mtc,
                "General pain, immunity, headache",
                "On the hand, between thumb and index finger",
                &[
                    "Find the point in the web between thumb and index finger",
                    "Press with the thumb of the other hand",
                    "Press firmly for 1 minute",
                    "Alternate hands",
                ],
                "Moderate to strong",
                &["Contraindicated during pregnancy", "May feel tender at first"],
                false,
            ),
            technique(
                5,
                "Zusanli (ST36)",
                Category::Mtc,
                "Digestion, energy, immunity",
                "On the leg, below the knee",
                &[
                    "Find the point four fingers below the kneecap, outside the shin",
                    "Apply firm pressure with the thumb",
                    "Hold for 1 minute on each leg",
                    "Make small circles",
                ],
                "Moderate",
                &["Precise location matters", "A tingling sensation is normal"],
                false,
            ),
            technique(
                6,
                "Shenmen (HE7)",
                Category::Mtc,
                "Anxiety, insomnia, stress",
                "Calms the mind; on the wrist crease by the little finger",
                &[
                    "Find the wrist crease on the little-finger side",
                    "Apply gentle pressure with the thumb",
                    "Hold for 1 minute, breathing calmly",
                    "Can be repeated several times a day",
                ],
                "Light to moderate",
                &["Good for relaxation", "Do not press too hard"],
                false,
            ),
            technique(
                7,
                "Point F: Sciatic Nerve",
                Category::Craniopuntura,
                "Low back pain, sciatica",
                "Scalp point used mainly for low back pain and sciatica",
                &[
                    "Find the point at the back of the head, near the occipital bone",
                    "Apply firm, directed pressure with the index finger",
                    "Hold steady pressure for 1 minute",
                    "Make slow clockwise circles",
                ],
                "Moderate",
                &["Subscriber technique", "See a professional for chronic pain"],
                true,
            ),
        ]
    })
}

pub fn find(id: &str) -> Option<&'static Technique> {
    builtin_catalog().iter().find(|t| t.id == id)
}

pub fn by_category(category: Option<Category>) -> Vec<&'static Technique> {
    builtin_catalog()
        .iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .collect()
}
