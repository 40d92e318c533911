use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw caller-supplied field values keyed by whatever names the caller uses
/// (form names, dataset column names, ...). Values are parsed on demand.
pub type FieldData = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPrediction {
    pub yield_prediction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_impact: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub explanation: String,
    /// Percent, 0-90.
    pub confidence: u8,
}

impl YieldPrediction {
    pub fn insufficient(explanation: impl Into<String>) -> Self {
        Self {
            yield_prediction: None,
            base_yield: None,
            weather_impact: None,
            unit: None,
            explanation: explanation.into(),
            confidence: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAdvice {
    pub practice: String,
    pub recommendation: String,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalRanges {
    pub fertilizer: String,
    pub pesticide: String,
    pub recommended_irrigation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementAdvice {
    pub recommendations: Vec<PracticeAdvice>,
    pub optimal_ranges: OptimalRanges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}
