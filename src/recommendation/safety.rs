//! Activity-level safety recommendations
//!
//! The heat index (°C) is scaled by how strenuous the activity is, then mapped
//! to a warning level with its own tips and an activity-restriction sentence.
//! Level tips replace base tips that share a category (e.g. hydration).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Resting,
    Light,
    #[default]
    Moderate,
    Vigorous,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Resting => 1.0,
            ActivityLevel::Light => 1.2,
            ActivityLevel::Moderate => 1.5,
            ActivityLevel::Vigorous => 2.0,
        }
    }
}

/// Ordered by increasing severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningLevel {
    Low,
    LowModerate,
    Moderate,
    High,
    Extreme,
}

impl WarningLevel {
    /// Strict `>` thresholds on the activity-adjusted heat index (°C)
    pub fn from_adjusted(adjusted_c: f64) -> Self {
        if adjusted_c > 54.0 {
            WarningLevel::Extreme
        } else if adjusted_c > 41.0 {
            WarningLevel::High
        } else if adjusted_c > 32.0 {
            WarningLevel::Moderate
        } else if adjusted_c > 27.0 {
            WarningLevel::LowModerate
        } else {
            WarningLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRecommendationSet {
    pub warning_level: WarningLevel,
    pub tips: Vec<String>,
    pub activity_restriction: String,
}

type Entry = (&'static str, &'static str);

const BASE: [Entry; 4] = [
    ("hydration", "Stay hydrated by drinking water regularly, even if not thirsty."),
    ("clothing", "Wear lightweight, light-colored, loose-fitting clothing."),
    ("sun_protection", "Apply sunscreen with at least SPF 30 and wear a wide-brimmed hat."),
    ("awareness", "Be aware of the signs of heat-related illness."),
];

fn level_entries(level: WarningLevel) -> (&'static [Entry], &'static str) {
    match level {
        WarningLevel::Extreme => (
            &[
                ("outdoor", "Avoid outdoor activities completely."),
                ("cooling", "Stay in air-conditioned environments. Visit cooling centers if needed."),
                ("monitoring", "Check on vulnerable individuals frequently."),
                ("emergency", "Know the emergency symptoms of heat stroke and be ready to call for help."),
            ],
            "All outdoor physical activities should be canceled or moved indoors with air conditioning.",
        ),
        WarningLevel::High => (
            &[
                ("outdoor", "Limit outdoor activities to early morning or after sunset."),
                ("cooling", "Take frequent breaks in shaded or air-conditioned areas."),
                ("monitoring", "Check on vulnerable individuals regularly."),
                ("hydration", "Drink water every 15-20 minutes during activity."),
            ],
            "Avoid moderate to vigorous physical activity outdoors. Limit outdoor exposure to less than 30 minutes.",
        ),
        WarningLevel::Moderate => (
            &[
                ("outdoor", "Reduce intensity and duration of outdoor activities."),
                ("cooling", "Take breaks in the shade every 30 minutes."),
                ("hydration", "Increase water intake before, during, and after outdoor activity."),
                ("planning", "Plan activities for cooler parts of the day."),
            ],
            "Take more frequent breaks during moderate or vigorous activity. Consider reducing intensity.",
        ),
        WarningLevel::LowModerate => (
            &[
                ("outdoor", "Use caution when engaging in outdoor activities."),
                ("cooling", "Take breaks in the shade as needed."),
                ("hydration", "Drink water before, during, and after outdoor activity."),
                ("monitoring", "Monitor how you feel and stop activity if experiencing discomfort."),
            ],
            "For vigorous activity, take regular breaks and monitor for signs of heat stress.",
        ),
        WarningLevel::Low => (
            &[
                ("outdoor", "Normal outdoor activities are generally safe."),
                ("hydration", "Maintain regular hydration."),
                ("monitoring", "Be mindful of personal comfort and limits."),
            ],
            "No specific restrictions, but always stay hydrated during activity.",
        ),
    }
}

/// Build the safety set for a heat index in Celsius and an activity level
pub fn safety_recommendations(
    heat_index_c: f64,
    activity: ActivityLevel,
) -> SafetyRecommendationSet {
    let adjusted = heat_index_c * activity.multiplier();
    let warning_level = WarningLevel::from_adjusted(adjusted);
    let (entries, restriction) = level_entries(warning_level);

    // Base order first; a level entry with the same category overrides in place
    let mut merged: Vec<Entry> = BASE.to_vec();
    for &(category, text) in entries {
        match merged.iter_mut().find(|(c, _)| *c == category) {
            Some(slot) => slot.1 = text,
            None => merged.push((category, text)),
        }
    }

    SafetyRecommendationSet {
        warning_level,
        tips: merged.into_iter().map(|(_, text)| text.to_string()).collect(),
        activity_restriction: restriction.to_string(),
    }
}
