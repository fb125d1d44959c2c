//! Completion prompt construction
//!
//! The prompt carries user context, a route summary, a weather summary and the
//! heat index, and asks for bullet-point recommendations so the reply can be
//! read by [`super::parse::parse_recommendations`].

use serde::{Deserialize, Serialize};

use crate::heat_index::{HeatIndexResult, WeatherSample};
use crate::routes::RouteCandidate;

pub const SYSTEM_MESSAGE: &str = "You are an expert in heat safety and public health. \
Provide personalized, specific recommendations for people walking outdoors in hot weather conditions. \
Focus on practical advice that can help prevent heat-related illnesses.";

/// Optional profile fields the user chose to share
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub health_conditions: Vec<String>,
}

/// Everything the enrichment stage needs; all of it must be present
#[derive(Debug, Clone)]
pub struct EnrichmentContext<'a> {
    pub weather: &'a WeatherSample,
    pub route: &'a RouteCandidate,
    pub heat_index: &'a HeatIndexResult,
    pub user: Option<&'a UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPrompt {
    pub system: String,
    pub user: String,
}

fn user_context(user: Option<&UserProfile>) -> String {
    let Some(user) = user else {
        return String::new();
    };

    let mut text = match user.age {
        Some(age) => format!("The person is {} years old", age),
        None => "The person is an adult".to_string(),
    };

    if user.health_conditions.is_empty() {
        text.push('.');
    } else {
        text.push_str(&format!(
            " and has the following health conditions: {}.",
            user.health_conditions.join(", ")
        ));
    }
    text
}

fn route_summary(route: &RouteCandidate) -> String {
    format!(
        "They plan to walk a route that is {:.1} km with an estimated duration of {} mins.\n\
         The route has approximately {:.0}% shade coverage and a {} heat exposure risk.",
        route.distance_km(),
        route.duration_minutes(),
        route.shade_coverage_percent,
        route.heat_exposure_risk.display_name().to_lowercase(),
    )
}

fn weather_summary(weather: &WeatherSample, heat_index: &HeatIndexResult) -> String {
    let unit = weather.unit.symbol();
    let mut lines = vec![
        "Current weather conditions:".to_string(),
        format!("- Temperature: {:.1}{}", weather.temperature, unit),
    ];
    if let Some(feels_like) = weather.feels_like {
        lines.push(format!("- Feels like: {:.1}{}", feels_like, unit));
    }
    lines.push(format!("- Humidity: {:.0}%", weather.relative_humidity));
    if let Some(description) = &weather.description {
        lines.push(format!("- Weather conditions: {}", description));
    }
    lines.push(format!(
        "- Heat index: {:.1}{} ({})",
        heat_index.display_value(),
        heat_index.unit.symbol(),
        heat_index.risk_tier.display_name()
    ));
    lines.join("\n")
}

impl CompletionPrompt {
    pub fn build(ctx: &EnrichmentContext<'_>) -> Self {
        let sections = [
            user_context(ctx.user),
            route_summary(ctx.route),
            weather_summary(ctx.weather, ctx.heat_index),
            "Please provide 5-7 personalized heat safety recommendations for this specific situation.\n\
             Focus on practical advice that will help them avoid heat-related illnesses during their journey.\n\
             Include any warning signs they should watch for and actions they should take if they start feeling unwell.\n\
             Format each recommendation as a bullet point."
                .to_string(),
        ];

        let user = sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            system: SYSTEM_MESSAGE.to_string(),
            user,
        }
    }
}
