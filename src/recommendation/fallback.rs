//! Deterministic fallback tips
//!
//! Always available: no network, no failure path, never empty.

use serde::{Deserialize, Serialize};

use crate::heat_index::HeatSeverity;

/// Routes with more than this much shade count as `Shaded`
pub const SHADED_ROUTE_THRESHOLD: f64 = 50.0;

/// Journeys longer than this (minutes) get extra guidance
pub const LONG_JOURNEY_MINUTES: u32 = 45;

/// Used when no route has been selected yet
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Shaded,
    #[default]
    Direct,
}

impl RouteType {
    pub fn from_shade(shade_coverage_percent: f64) -> Self {
        if shade_coverage_percent > SHADED_ROUTE_THRESHOLD {
            RouteType::Shaded
        } else {
            RouteType::Direct
        }
    }
}

const BASE_TIPS: [&str; 4] = [
    "Stay hydrated by drinking water before, during, and after your journey.",
    "Wear lightweight, light-colored, loose-fitting clothing.",
    "Apply sunscreen with SPF 30+ to exposed skin.",
    "Wear a wide-brimmed hat and sunglasses.",
];

fn severity_tips(severity: HeatSeverity) -> &'static [&'static str] {
    match severity {
        HeatSeverity::Extreme => &[
            "EXTREME DANGER: Consider postponing your journey if possible.",
            "If you must go outside, take frequent breaks in air-conditioned spaces.",
            "Watch for signs of heat stroke: high body temperature, altered mental state, nausea.",
            "Call emergency services immediately if you or someone else shows signs of heat stroke.",
        ],
        HeatSeverity::Danger => &[
            "DANGER: Limit outdoor activity during the hottest part of the day (10am-4pm).",
            "Take frequent breaks in shaded or air-conditioned areas.",
            "Watch for signs of heat exhaustion: heavy sweating, weakness, dizziness.",
            "Consider using public transportation for part of your journey to reduce exposure.",
        ],
        HeatSeverity::Caution => &[
            "CAUTION: Take breaks in shaded areas as needed.",
            "Consider carrying a personal fan or cooling towel.",
            "Pay attention to how you feel and slow down if necessary.",
        ],
        HeatSeverity::Normal => &[],
    }
}

fn route_tips(route_type: RouteType) -> &'static [&'static str] {
    match route_type {
        RouteType::Shaded => &[
            "Your selected route maximizes shade coverage.",
            "Even in shaded areas, remember that heat can still affect you.",
        ],
        RouteType::Direct => &[
            "This direct route has limited shade coverage.",
            "Consider carrying an umbrella for additional sun protection.",
        ],
    }
}

const LONG_JOURNEY_TIPS: [&str; 3] = [
    "For journeys over 45 minutes, bring extra water and electrolyte drinks.",
    "Plan for rest stops along the way.",
    "Consider breaking your journey into smaller segments.",
];

/// Base tips + severity tips + route-type tips + duration tips, in that order.
pub fn fallback_tips(
    heat_index_f: f64,
    route_type: RouteType,
    duration_minutes: u32,
) -> Vec<String> {
    let mut tips: Vec<String> = BASE_TIPS.iter().map(|s| s.to_string()).collect();

    let severity = HeatSeverity::from_fahrenheit(heat_index_f);
    tips.extend(severity_tips(severity).iter().map(|s| s.to_string()));
    tips.extend(route_tips(route_type).iter().map(|s| s.to_string()));

    if duration_minutes > LONG_JOURNEY_MINUTES {
        tips.extend(LONG_JOURNEY_TIPS.iter().map(|s| s.to_string()));
    }

    tips
}
