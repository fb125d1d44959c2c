//! Route Risk Ranking
//!
//! Turns the directions provider's alternatives into scored candidates:
//! shade estimate + heat-exposure category per route.
//!
//! Exposure score: `distance_km × (1 − shade/100) × severity factor`,
//! where the factor comes from the current heat index (see
//! [`HeatSeverity::exposure_factor`]).

use serde::{Deserialize, Serialize};

use crate::heat_index::{HeatIndexResult, HeatSeverity};
use crate::shade::ShadeEstimator;

// Score cutoffs (exclusive upper bound of each tier)
pub const LOW_CUTOFF: f64 = 0.5;
pub const MODERATE_CUTOFF: f64 = 1.5;
pub const HIGH_CUTOFF: f64 = 3.0;

/// One route option as returned by the directions provider (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAlternative {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Plain-text turn-by-turn instructions, in order
    #[serde(default)]
    pub steps: Vec<String>,
    /// Provider's route label ("via Elm St"), if any
    #[serde(default)]
    pub summary: Option<String>,
}

impl RouteAlternative {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds / 60.0).round().max(0.0) as u32
    }
}

/// Heat-exposure category, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatExposureRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl HeatExposureRisk {
    /// Strict `<` comparisons: a score exactly on a cutoff goes to the higher tier
    pub fn from_score(score: f64) -> Self {
        if score < LOW_CUTOFF {
            HeatExposureRisk::Low
        } else if score < MODERATE_CUTOFF {
            HeatExposureRisk::Moderate
        } else if score < HIGH_CUTOFF {
            HeatExposureRisk::High
        } else {
            HeatExposureRisk::VeryHigh
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HeatExposureRisk::Low => "Low",
            HeatExposureRisk::Moderate => "Moderate",
            HeatExposureRisk::High => "High",
            HeatExposureRisk::VeryHigh => "Very High",
        }
    }
}

/// Scored view of one alternative.
///
/// `index` is the position in the provider's original list and is what the UI
/// selects by; re-ranking never changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub index: usize,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub steps: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Always within [0, 100]
    pub shade_coverage_percent: f64,
    pub exposure_score: f64,
    pub heat_exposure_risk: HeatExposureRisk,
}

impl RouteCandidate {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds / 60.0).round().max(0.0) as u32
    }
}

/// Raw exposure score before categorisation
pub fn exposure_score(
    distance_km: f64,
    shade_percent: f64,
    heat_index: Option<&HeatIndexResult>,
) -> f64 {
    let shade = shade_percent.clamp(0.0, 100.0);
    let factor = heat_index
        .map(|hi| hi.severity().exposure_factor())
        .unwrap_or_else(|| HeatSeverity::Normal.exposure_factor());

    distance_km.max(0.0) * (1.0 - shade / 100.0) * factor
}

/// Pure, deterministic ranker
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteRiskRanker;

impl RouteRiskRanker {
    /// Exposure category for a candidate under the current heat index.
    /// With no heat index the severity factor is 1.
    pub fn rank(
        &self,
        candidate: &RouteCandidate,
        heat_index: Option<&HeatIndexResult>,
    ) -> HeatExposureRisk {
        HeatExposureRisk::from_score(exposure_score(
            candidate.distance_km(),
            candidate.shade_coverage_percent,
            heat_index,
        ))
    }

    /// Score every alternative, preserving the provider's order
    pub fn rank_all(
        &self,
        alternatives: &[RouteAlternative],
        estimator: &dyn ShadeEstimator,
        heat_index: Option<&HeatIndexResult>,
        hour: u32,
    ) -> Vec<RouteCandidate> {
        alternatives
            .iter()
            .enumerate()
            .map(|(index, alt)| {
                let shade = estimator.estimate(&alt.steps, hour).clamp(0.0, 100.0);
                let score = exposure_score(alt.distance_km(), shade, heat_index);
                RouteCandidate {
                    index,
                    distance_meters: alt.distance_meters,
                    duration_seconds: alt.duration_seconds,
                    steps: alt.steps.clone(),
                    summary: alt.summary.clone(),
                    shade_coverage_percent: shade,
                    exposure_score: score,
                    heat_exposure_risk: HeatExposureRisk::from_score(score),
                }
            })
            .collect()
    }
}

/// Candidate indices ordered safest first: lowest risk, then most shade,
/// then the provider's original order. The candidates themselves are untouched.
pub fn safest_first(candidates: &[RouteCandidate]) -> Vec<usize> {
    let mut order: Vec<&RouteCandidate> = candidates.iter().collect();
    order.sort_by(|a, b| {
        a.heat_exposure_risk
            .cmp(&b.heat_exposure_risk)
            .then_with(|| b.shade_coverage_percent.total_cmp(&a.shade_coverage_percent))
            .then_with(|| a.index.cmp(&b.index))
    });
    order.into_iter().map(|c| c.index).collect()
}
