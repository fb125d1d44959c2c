//! Shade Coverage Estimation
//!
//! Estimates what share of a walking route is shielded from direct sun.
//!
//! ## Key Concept
//! This is a **heuristic proxy**, not a measurement. The default estimator
//! reads the provider's turn-by-turn instruction text for hints about the
//! surroundings (parks, residential streets, arterial roads) and adjusts for
//! the sun's height at the current hour. It makes no claim of GIS accuracy.
//!
//! Ranking and recommendations only see the [`ShadeEstimator`] trait, so a
//! canopy/building-shadow dataset can replace the keyword rules later.

use chrono::Timelike;

/// Starting point for an average urban mix
pub const BASE_SHADE_PERCENT: f64 = 35.0;

/// Never claim zero or total shade
pub const MIN_SHADE_PERCENT: f64 = 5.0;
pub const MAX_SHADE_PERCENT: f64 = 90.0;

/// Strategy seam for shade estimation
pub trait ShadeEstimator: Send + Sync {
    /// Estimated shade coverage (percent) for the ordered step instructions
    /// at the given local hour (0-23)
    fn estimate(&self, steps: &[String], hour: u32) -> f64;
}

/// One group of instruction keywords and the adjustment it carries
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub adjustment: f64,
}

/// Default rule table
pub const DEFAULT_RULES: &[KeywordRule] = &[
    // Parks and green corridors
    KeywordRule { keywords: &["park", "garden", "trail"], adjustment: 15.0 },
    // Arterial roads tend to be wide and treeless
    KeywordRule { keywords: &["highway", "major", "avenue", "boulevard"], adjustment: -10.0 },
    // Residential streets are usually tree-lined
    KeywordRule { keywords: &["residential", "neighborhood"], adjustment: 8.0 },
    // Tall buildings cast shadow even with few trees
    KeywordRule { keywords: &["downtown", "center"], adjustment: 5.0 },
];

/// Keyword + time-of-day heuristic
#[derive(Debug, Clone)]
pub struct KeywordShadeEstimator {
    rules: &'static [KeywordRule],
    base: f64,
}

impl Default for KeywordShadeEstimator {
    fn default() -> Self {
        Self { rules: DEFAULT_RULES, base: BASE_SHADE_PERCENT }
    }
}

impl KeywordShadeEstimator {
    pub fn new(rules: &'static [KeywordRule], base: f64) -> Self {
        Self { rules, base }
    }

    /// Sum of rule adjustments for a single step.
    ///
    /// Case-insensitive substring match; each rule counts at most once per
    /// step, and every matching rule contributes.
    pub fn step_adjustment(&self, instruction: &str) -> f64 {
        let text = instruction.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.keywords.iter().any(|kw| text.contains(kw)))
            .map(|rule| rule.adjustment)
            .sum()
    }
}

/// Sun-angle adjustment for the local hour
pub fn time_of_day_adjustment(hour: u32) -> f64 {
    match hour {
        10..=14 => -15.0, // peak sun, shade less effective
        h if h < 8 || h > 18 => 20.0,
        _ => 0.0,
    }
}

impl ShadeEstimator for KeywordShadeEstimator {
    fn estimate(&self, steps: &[String], hour: u32) -> f64 {
        let steps_total: f64 = steps.iter().map(|s| self.step_adjustment(s)).sum();
        let raw = self.base + steps_total + time_of_day_adjustment(hour);

        raw.clamp(MIN_SHADE_PERCENT, MAX_SHADE_PERCENT).round()
    }
}

/// Local wall-clock hour, used when the caller does not pin one
pub fn current_local_hour() -> u32 {
    chrono::Local::now().hour()
}
