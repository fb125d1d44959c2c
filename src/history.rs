//! Heat-index history
//!
//! Summaries over a series of daily weather samples (e.g. a week or month of
//! observations): per-day heat index, peak, mean and the number of days at or
//! above the caution level.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::heat_index::{self, HeatIndexResult, RiskTier, TemperatureUnit, WeatherSample};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySample {
    /// Caller's label for the day (ISO date, "Mon", ...)
    pub date: String,
    pub weather: WeatherSample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHeatIndex {
    pub date: String,
    pub heat_index: HeatIndexResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatHistorySummary {
    pub unit: TemperatureUnit,
    pub days: Vec<DailyHeatIndex>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Days whose heat index reached the caution tier or worse
    pub caution_days: usize,
    pub worst_tier: Option<RiskTier>,
}

/// Summarise a series, reporting every value in `unit`.
///
/// Fails if any sample has invalid readings; the error names the offending day.
pub fn summarize(
    samples: &[DailySample],
    unit: TemperatureUnit,
) -> Result<HeatHistorySummary, HistoryError> {
    let days: Vec<DailyHeatIndex> = samples
        .par_iter()
        .map(|s| {
            heat_index::compute(s.weather.temperature, s.weather.relative_humidity, s.weather.unit)
                .map(|hi| DailyHeatIndex { date: s.date.clone(), heat_index: hi.to_unit(unit) })
                .map_err(|source| HistoryError::InvalidSample { date: s.date.clone(), source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let values: Vec<f64> = days.iter().map(|d| d.heat_index.value).collect();
    let max = values.iter().copied().reduce(f64::max);
    let mean = if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };

    let caution_days = days
        .iter()
        .filter(|d| d.heat_index.risk_tier >= RiskTier::Caution)
        .count();
    let worst_tier = days.iter().map(|d| d.heat_index.risk_tier).max();

    Ok(HeatHistorySummary { unit, days, max, mean, caution_days, worst_tier })
}
