//! Heat Index Calculator
//!
//! Combines air temperature and relative humidity into a perceived-heat value
//! using the NWS Rothfusz regression.
//!
//! Two-branch structure:
//! - below 80°F the heat index is the air temperature itself
//! - at or above 80°F the full Rothfusz polynomial applies
//!
//! The polynomial is quadratic in temperature. At very low humidity it is
//! concave and turns downward past its vertex (about 150°F at 0%), so the
//! regression branch holds its peak value beyond that point. Temperatures
//! outside [`MIN_TEMPERATURE_F`, `MAX_TEMPERATURE_F`] are rejected.
//!
//! Inputs are normalized to Fahrenheit at the boundary and the result is
//! converted back to the caller's unit. The risk tier is always evaluated on
//! the Celsius value so both units share one set of boundaries.

use serde::{Deserialize, Serialize};

use crate::error::HeatIndexError;

/// Below this (°F) the regression is not meaningful and HI == T
pub const ROTHFUSZ_THRESHOLD_F: f64 = 80.0;

/// Accepted air temperature range (°F, inclusive)
pub const MIN_TEMPERATURE_F: f64 = -150.0;
pub const MAX_TEMPERATURE_F: f64 = 200.0;

// Risk tier lower bounds (°C, inclusive)
pub const CAUTION_C: f64 = 27.0;
pub const DANGER_C: f64 = 32.0;
pub const EXTREME_DANGER_C: f64 = 41.0;

/// Temperature unit declared by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

#[inline]
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

#[inline]
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Current conditions supplied per request by the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub temperature: f64,
    #[serde(default)]
    pub unit: TemperatureUnit,
    /// Relative humidity (0-100)
    pub relative_humidity: f64,
    /// Provider's "feels like" value in the same unit, if reported
    #[serde(default)]
    pub feels_like: Option<f64>,
    /// Free-text conditions ("clear sky", "haze")
    #[serde(default)]
    pub description: Option<String>,
}

impl WeatherSample {
    pub fn new(temperature: f64, unit: TemperatureUnit, relative_humidity: f64) -> Self {
        Self {
            temperature,
            unit,
            relative_humidity,
            feels_like: None,
            description: None,
        }
    }

    pub fn temperature_f(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Fahrenheit => self.temperature,
            TemperatureUnit::Celsius => celsius_to_fahrenheit(self.temperature),
        }
    }

    /// Heat index for this sample, reported in the sample's own unit
    pub fn heat_index(&self) -> Result<HeatIndexResult, HeatIndexError> {
        compute(self.temperature, self.relative_humidity, self.unit)
    }
}

/// Risk tier, ordered by increasing severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Caution,
    Danger,
    ExtremeDanger,
}

impl RiskTier {
    /// Classify a heat index expressed in Celsius
    pub fn from_celsius(heat_index_c: f64) -> Self {
        match heat_index_c {
            c if c >= EXTREME_DANGER_C => RiskTier::ExtremeDanger,
            c if c >= DANGER_C => RiskTier::Danger,
            c if c >= CAUTION_C => RiskTier::Caution,
            _ => RiskTier::Low,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Caution => "Caution",
            RiskTier::Danger => "Danger",
            RiskTier::ExtremeDanger => "Extreme Danger",
        }
    }
}

/// Fahrenheit severity bands used by the walking-route stages
/// (route exposure factor and fallback tip escalation).
///
/// These are the Fahrenheit readings of the same bands as [`RiskTier`]
/// (80.6/89.6/105.8°F), rounded to the values walkers see on forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatSeverity {
    Normal,
    Caution,
    Danger,
    Extreme,
}

impl HeatSeverity {
    pub fn from_fahrenheit(heat_index_f: f64) -> Self {
        match heat_index_f {
            f if f >= 105.0 => HeatSeverity::Extreme,
            f if f >= 90.0 => HeatSeverity::Danger,
            f if f >= 80.0 => HeatSeverity::Caution,
            _ => HeatSeverity::Normal,
        }
    }

    /// Multiplier applied to a route's raw exposure score
    pub fn exposure_factor(&self) -> f64 {
        match self {
            HeatSeverity::Extreme => 3.0,
            HeatSeverity::Danger => 2.0,
            HeatSeverity::Caution => 1.5,
            HeatSeverity::Normal => 1.0,
        }
    }
}

/// Derived heat index; recomputed whenever the weather sample changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatIndexResult {
    pub value: f64,
    pub unit: TemperatureUnit,
    pub risk_tier: RiskTier,
}

impl HeatIndexResult {
    pub fn fahrenheit(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Fahrenheit => self.value,
            TemperatureUnit::Celsius => celsius_to_fahrenheit(self.value),
        }
    }

    pub fn celsius(&self) -> f64 {
        match self.unit {
            TemperatureUnit::Celsius => self.value,
            TemperatureUnit::Fahrenheit => fahrenheit_to_celsius(self.value),
        }
    }

    pub fn severity(&self) -> HeatSeverity {
        HeatSeverity::from_fahrenheit(self.fahrenheit())
    }

    /// Value rounded to one decimal place for display
    pub fn display_value(&self) -> f64 {
        (self.value * 10.0).round() / 10.0
    }

    /// Rebuild a result from a bare value, deriving the risk tier from it
    pub fn from_value(value: f64, unit: TemperatureUnit) -> Result<Self, HeatIndexError> {
        if !value.is_finite() {
            return Err(HeatIndexError::NonFiniteTemperature(value));
        }
        let celsius = match unit {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => fahrenheit_to_celsius(value),
        };
        Ok(Self { value, unit, risk_tier: RiskTier::from_celsius(celsius) })
    }

    /// Same heat index expressed in another unit
    pub fn to_unit(&self, unit: TemperatureUnit) -> Self {
        let value = match unit {
            TemperatureUnit::Celsius => self.celsius(),
            TemperatureUnit::Fahrenheit => self.fahrenheit(),
        };
        Self { value, unit, risk_tier: self.risk_tier }
    }
}

/// Rothfusz regression (°F in, °F out)
fn rothfusz(t: f64, rh: f64) -> f64 {
    -42.379
        + 2.049_015_23 * t
        + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh
}

/// Temperature (°F) at which the regression peaks for this humidity, if it
/// is concave in temperature there (humidity below ~5.7%)
fn rothfusz_peak(rh: f64) -> Option<f64> {
    let linear = 2.049_015_23 - 0.224_755_41 * rh + 0.000_852_82 * rh * rh;
    let quadratic = -0.006_837_83 + 0.001_228_74 * rh - 0.000_001_99 * rh * rh;
    (quadratic < 0.0).then(|| -linear / (2.0 * quadratic))
}

/// Heat index in Fahrenheit for already-validated inputs.
///
/// Non-decreasing in temperature at fixed humidity.
pub fn heat_index_fahrenheit(temperature_f: f64, humidity: f64) -> f64 {
    if temperature_f < ROTHFUSZ_THRESHOLD_F {
        return temperature_f;
    }
    let t = match rothfusz_peak(humidity) {
        Some(peak) => temperature_f.min(peak),
        None => temperature_f,
    };
    rothfusz(t, humidity)
}

/// Compute the heat index and risk tier.
///
/// Non-finite input, humidity outside 0-100 and temperatures outside the
/// accepted range are rejected; nothing is clamped.
pub fn compute(
    temperature: f64,
    humidity: f64,
    unit: TemperatureUnit,
) -> Result<HeatIndexResult, HeatIndexError> {
    if !temperature.is_finite() {
        return Err(HeatIndexError::NonFiniteTemperature(temperature));
    }
    if !humidity.is_finite() {
        return Err(HeatIndexError::NonFiniteHumidity(humidity));
    }
    if !(0.0..=100.0).contains(&humidity) {
        return Err(HeatIndexError::HumidityOutOfRange(humidity));
    }

    let temperature_f = match unit {
        TemperatureUnit::Fahrenheit => temperature,
        TemperatureUnit::Celsius => celsius_to_fahrenheit(temperature),
    };
    if !(MIN_TEMPERATURE_F..=MAX_TEMPERATURE_F).contains(&temperature_f) {
        return Err(HeatIndexError::TemperatureOutOfRange(temperature_f));
    }
    let hi_f = heat_index_fahrenheit(temperature_f, humidity);
    let hi_c = fahrenheit_to_celsius(hi_f);

    let value = match unit {
        TemperatureUnit::Fahrenheit => hi_f,
        TemperatureUnit::Celsius => hi_c,
    };

    Ok(HeatIndexResult {
        value,
        unit,
        risk_tier: RiskTier::from_celsius(hi_c),
    })
}
