use super::SoilClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A question put to the advisory agents, either free text or text plus
/// structured hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentQuery {
    #[serde(rename = "query", default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl AgentQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_farm_id(mut self, farm_id: i64) -> Self {
        self.farm_id = Some(farm_id);
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// Case-insensitive substring test against the query text.
    pub fn mentions(&self, keyword: &str) -> bool {
        self.text.to_lowercase().contains(keyword)
    }
}

impl From<&str> for AgentQuery {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for AgentQuery {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Info,
    Recommendation,
    FarmAnalysis,
    MarketTrend,
    ProfitableCrops,
    PriceForecast,
    Error,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Info => "info",
            ResponseKind::Recommendation => "recommendation",
            ResponseKind::FarmAnalysis => "farm_analysis",
            ResponseKind::MarketTrend => "market_trend",
            ResponseKind::ProfitableCrops => "profitable_crops",
            ResponseKind::PriceForecast => "price_forecast",
            ResponseKind::Error => "error",
        }
    }
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropYieldSummary {
    #[serde(rename = "Crop_Type")]
    pub crop_type: String,
    #[serde(rename = "Avg_Yield")]
    pub avg_yield: f64,
    #[serde(rename = "Sample_Count")]
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductScore {
    pub product: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDetails {
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_demand: f64,
    pub avg_supply: f64,
    pub market_condition: String,
    pub outlook: String,
}

/// Type-specific fields carried alongside `agent`, `type` and `response`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Recommendation {
        soil_ph: f64,
        soil_type: SoilClass,
        recommended_crops: Vec<String>,
        detailed: Vec<CropYieldSummary>,
    },
    FarmAnalysis {
        top_crops: Vec<String>,
        sustainability_score: f64,
    },
    MarketTrend {
        top_products: Vec<ProductScore>,
        opportunities: Vec<ProductScore>,
    },
    ProfitableCrops {
        profitable_crops: Vec<String>,
        detailed: Vec<ProductScore>,
    },
    PriceForecast {
        product: Option<String>,
        details: Option<PriceDetails>,
    },
}

/// A structured answer from one agent. Serializes flat:
/// `{"agent", "type", "response", <payload fields>, <scores>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    pub agent: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub response: String,
    #[serde(flatten)]
    pub payload: Option<ResponsePayload>,
    /// Free-form numeric scores an agent wants merged by the coordinator.
    #[serde(flatten)]
    pub scores: BTreeMap<String, f64>,
}

impl AgentResponse {
    pub fn new(agent: impl Into<String>, kind: ResponseKind, response: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            kind,
            response: response.into(),
            payload: None,
            scores: BTreeMap::new(),
        }
    }

    pub fn error(agent: impl Into<String>, response: impl Into<String>) -> Self {
        Self::new(agent, ResponseKind::Error, response)
    }

    pub fn with_payload(mut self, payload: ResponsePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_score(mut self, field: impl Into<String>, value: f64) -> Self {
        self.scores.insert(field.into(), value);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == ResponseKind::Error
    }

    /// Top-level numeric fields of the serialized response.
    ///
    /// Nested values (crop lists, price details) are not included.
    pub fn numeric_fields(&self) -> BTreeMap<String, f64> {
        let mut fields = BTreeMap::new();
        match &self.payload {
            Some(ResponsePayload::Recommendation { soil_ph, .. }) => {
                fields.insert("soil_ph".to_string(), *soil_ph);
            }
            Some(ResponsePayload::FarmAnalysis {
                sustainability_score,
                ..
            }) => {
                fields.insert("sustainability_score".to_string(), *sustainability_score);
            }
            _ => {}
        }
        fields.extend(self.scores.iter().map(|(k, v)| (k.clone(), *v)));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_flat() {
        let resp = AgentResponse::new("FarmerAdvisor", ResponseKind::FarmAnalysis, "ok")
            .with_payload(ResponsePayload::FarmAnalysis {
                top_crops: vec!["Rice".into()],
                sustainability_score: 6.25,
            });

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["agent"], "FarmerAdvisor");
        assert_eq!(json["type"], "farm_analysis");
        assert_eq!(json["response"], "ok");
        assert_eq!(json["top_crops"][0], "Rice");
        assert_eq!(json["sustainability_score"], 6.25);
    }

    #[test]
    fn error_response_has_only_required_fields() {
        let resp = AgentResponse::error("MarketResearcher", "boom");
        let json = serde_json::to_value(&resp).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(json["type"], "error");
    }

    #[test]
    fn numeric_fields_include_payload_and_scores() {
        let resp = AgentResponse::new("A", ResponseKind::Recommendation, "r")
            .with_payload(ResponsePayload::Recommendation {
                soil_ph: 6.4,
                soil_type: SoilClass::SlightlyAcidic,
                recommended_crops: vec![],
                detailed: vec![],
            })
            .with_score("economic", 70.0);

        let fields = resp.numeric_fields();
        assert_eq!(fields.get("soil_ph"), Some(&6.4));
        assert_eq!(fields.get("economic"), Some(&70.0));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn price_forecast_details_are_not_top_level_numbers() {
        let resp = AgentResponse::new("M", ResponseKind::PriceForecast, "p").with_payload(
            ResponsePayload::PriceForecast {
                product: Some("Rice".into()),
                details: Some(PriceDetails {
                    avg_price: 100.0,
                    min_price: 90.0,
                    max_price: 110.0,
                    avg_demand: 1.0,
                    avg_supply: 1.0,
                    market_condition: "balanced".into(),
                    outlook: "stable".into(),
                }),
            },
        );
        assert!(resp.numeric_fields().is_empty());
    }

    #[test]
    fn query_from_text_and_hints() {
        let q = AgentQuery::from("Recommend crops").with_farm_id(3);
        assert!(q.mentions("recommend"));
        assert_eq!(q.farm_id, Some(3));

        let parsed: AgentQuery = serde_json::from_str(r#"{"query": "Forecast prices", "product": "Rice"}"#).unwrap();
        assert_eq!(parsed.text, "Forecast prices");
        assert_eq!(parsed.product.as_deref(), Some("Rice"));
    }
}
