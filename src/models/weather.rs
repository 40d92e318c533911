use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One simulated monthly weather observation or forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPoint {
    pub date: NaiveDate,
    pub location: String,
    #[serde(rename = "temperature_C")]
    pub temperature_c: f64,
    pub rainfall_mm: f64,
    pub humidity_pct: f64,
    /// Forecast confidence in percent; absent on historical points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Historical,
    Forecast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSeries {
    pub location: String,
    pub kind: SeriesKind,
    pub points: Vec<WeatherPoint>,
}

impl WeatherSeries {
    pub fn new(location: impl Into<String>, kind: SeriesKind) -> Self {
        Self {
            location: location.into(),
            kind,
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, point: WeatherPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mean_temperature(&self) -> Option<f64> {
        mean(self.points.iter().map(|p| p.temperature_c))
    }

    pub fn mean_rainfall(&self) -> Option<f64> {
        mean(self.points.iter().map(|p| p.rainfall_mm))
    }

    pub fn mean_humidity(&self) -> Option<f64> {
        mean(self.points.iter().map(|p| p.humidity_pct))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Weather-driven multiplier on base yield, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldImpact {
    pub impact_factor: f64,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_summary: Option<String>,
}

impl YieldImpact {
    pub fn neutral(explanation: impl Into<String>) -> Self {
        Self {
            impact_factor: 1.0,
            explanation: explanation.into(),
            forecast_summary: None,
        }
    }
}
