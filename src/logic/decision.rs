use super::sustainability::score_record;
use crate::datasources::DataSource;
use serde::Serialize;
use std::sync::Arc;

const PH_WINDOW: f64 = 0.5;
const TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCrop {
    #[serde(rename = "Crop_Type")]
    pub crop_type: String,
    #[serde(rename = "Sustainability_Score")]
    pub sustainability_score: f64,
}

/// Result of a decision query. Serializes as exactly one of
/// `{"recommendation": [...]}`, `{"response": "..."}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Recommendation(Vec<RankedCrop>),
    Response(String),
    Error(String),
}

impl DecisionOutcome {
    pub fn recommendations(&self) -> &[RankedCrop] {
        match self {
            DecisionOutcome::Recommendation(crops) => crops,
            _ => &[],
        }
    }
}

/// Ranks raw farm records near a requested soil pH by sustainability score.
pub struct DecisionEngine {
    source: Arc<dyn DataSource>,
}

impl DecisionEngine {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    pub fn run(&self, query: &str) -> DecisionOutcome {
        if !query.to_lowercase().contains("ph") {
            return DecisionOutcome::Response("Query not understood.".to_string());
        }

        match parse_target_ph(query) {
            PhToken::Value(ph) => self.recommend_by_ph(ph),
            PhToken::Invalid(raw) => {
                tracing::warn!(token = %raw, "Unparseable pH value in query");
                DecisionOutcome::Error("Invalid pH value provided.".to_string())
            }
            PhToken::Missing => {
                DecisionOutcome::Response("No valid pH value found in query.".to_string())
            }
        }
    }

    pub fn recommend_by_ph(&self, target_ph: f64) -> DecisionOutcome {
        let candidates = self
            .source
            .farms_in_ph_range(target_ph - PH_WINDOW, target_ph + PH_WINDOW);

        if candidates.is_empty() {
            return DecisionOutcome::Response("No valid recommendations found.".to_string());
        }

        let mut ranked: Vec<RankedCrop> = candidates
            .into_iter()
            .map(|record| RankedCrop {
                crop_type: record.crop_type.clone(),
                sustainability_score: score_record(record),
            })
            .collect();

        // Stable sort keeps dataset order among equal scores
        ranked.sort_by(|a, b| {
            b.sustainability_score
                .partial_cmp(&a.sustainability_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(TOP_N);

        tracing::debug!(target_ph, results = ranked.len(), "Decision engine ranked crops");
        DecisionOutcome::Recommendation(ranked)
    }
}

#[derive(Debug, PartialEq)]
enum PhToken {
    Value(f64),
    Invalid(String),
    Missing,
}

fn parse_target_ph(query: &str) -> PhToken {
    let re = match regex_lite::Regex::new(r"(?i)ph\s*([0-9.]+)") {
        Ok(re) => re,
        Err(_) => return PhToken::Missing,
    };

    match re.captures(query) {
        Some(cap) => {
            let raw = &cap[1];
            match raw.parse::<f64>() {
                Ok(v) => PhToken::Value(v),
                Err(_) => PhToken::Invalid(raw.to_string()),
            }
        }
        None => PhToken::Missing,
    }
}
