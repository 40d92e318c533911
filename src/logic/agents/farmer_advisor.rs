use super::{grouped_means, sort_desc_by, AdvisoryAgent};
use crate::datasources::DataSource;
use crate::models::{
    AgentQuery, AgentResponse, CropYieldSummary, FarmRecord, ResponseKind, ResponsePayload,
    SoilClass,
};
use std::sync::Arc;

const PH_TOLERANCE: f64 = 0.5;
const RAINFALL_TOLERANCE_MM: f64 = 100.0;
const TEMP_TOLERANCE_C: f64 = 2.0;
const TOP_N: usize = 3;

/// Recommends crops from the yields of farms with similar soil and climate.
pub struct FarmerAdvisor {
    name: String,
    source: Arc<dyn DataSource>,
    span: tracing::Span,
}

impl FarmerAdvisor {
    pub fn new(name: impl Into<String>, source: Arc<dyn DataSource>) -> Self {
        let name = name.into();
        let span = tracing::info_span!("agent", agent = %name);
        tracing::info!(agent = %name, farms = source.farm_records().len(), "Initialized farmer advisor");
        Self { name, source, span }
    }

    pub fn generate_recommendation(&self, farm_id: Option<i64>) -> AgentResponse {
        let farm = match farm_id.and_then(|id| self.source.farm_by_id(id)) {
            Some(farm) => farm,
            None => {
                let label = farm_id.map_or_else(|| "None".to_string(), |id| id.to_string());
                tracing::warn!(farm_id = %label, "Farm not found");
                return AgentResponse::error(
                    &self.name,
                    format!("Farm_ID {} not found in dataset. Please check and try again.", label),
                );
            }
        };

        let soil_type = SoilClass::classify(farm.soil_ph);
        let similar: Vec<&FarmRecord> = self
            .source
            .farm_records()
            .iter()
            .filter(|r| is_similar(r, farm))
            .collect();

        let mut ranked = grouped_means(similar.iter().map(|r| (r.crop_type.as_str(), r.crop_yield_ton)));
        sort_desc_by(&mut ranked, |(_, mean, _)| *mean);
        ranked.truncate(TOP_N);

        let detailed: Vec<CropYieldSummary> = ranked
            .into_iter()
            .map(|(crop_type, avg_yield, sample_count)| CropYieldSummary {
                crop_type,
                avg_yield,
                sample_count,
            })
            .collect();
        let recommended: Vec<String> = detailed.iter().map(|d| d.crop_type.clone()).collect();

        let response = if recommended.is_empty() {
            format!(
                "[{}] Not enough data to generate a recommendation for Farm_ID {}.",
                self.name, farm.farm_id
            )
        } else {
            format!(
                "[{}] Based on soil pH {:?} ({} soil), I recommend: {}.",
                self.name,
                farm.soil_ph,
                soil_type,
                recommended.join(", ")
            )
        };

        let mut resp = AgentResponse::new(&self.name, ResponseKind::Recommendation, response)
            .with_payload(ResponsePayload::Recommendation {
                soil_ph: farm.soil_ph,
                soil_type,
                recommended_crops: recommended,
                detailed,
            });
        if !similar.is_empty() {
            let env = similar.iter().map(|r| r.sustainability_score).sum::<f64>() / similar.len() as f64;
            resp = resp.with_score("environmental", env);
        }
        resp
    }

    pub fn analyze_farm_data(&self) -> AgentResponse {
        let records = self.source.farm_records();
        let mut by_crop = grouped_means(records.iter().map(|r| (r.crop_type.as_str(), r.crop_yield_ton)));
        sort_desc_by(&mut by_crop, |(_, mean, _)| *mean);
        let top_crops: Vec<String> = by_crop.into_iter().take(TOP_N).map(|(c, _, _)| c).collect();

        let avg_sustainability = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.sustainability_score).sum::<f64>() / records.len() as f64
        };

        let response = format!(
            "[{}] Farm Analysis: Top performing crops are {}. Average sustainability score across farms: {:.2}/10.",
            self.name,
            top_crops.join(", "),
            avg_sustainability
        );

        AgentResponse::new(&self.name, ResponseKind::FarmAnalysis, response)
            .with_payload(ResponsePayload::FarmAnalysis {
                top_crops,
                sustainability_score: avg_sustainability,
            })
            .with_score("environmental", avg_sustainability)
    }
}

fn is_similar(candidate: &FarmRecord, target: &FarmRecord) -> bool {
    within(candidate.soil_ph, target.soil_ph, PH_TOLERANCE)
        && within(candidate.rainfall_mm, target.rainfall_mm, RAINFALL_TOLERANCE_MM)
        && within(candidate.temperature_c, target.temperature_c, TEMP_TOLERANCE_C)
}

fn within(value: f64, center: f64, tolerance: f64) -> bool {
    value >= center - tolerance && value <= center + tolerance
}

/// Farm id from a structured hint, else a `farm 12` / `farm_id 12` token.
fn resolve_farm_id(query: &AgentQuery) -> Option<i64> {
    if query.farm_id.is_some() {
        return query.farm_id;
    }
    let re = regex_lite::Regex::new(r"(?i)\bfarm(?:_id)?\s*#?\s*(\d+)").ok()?;
    re.captures(&query.text)
        .and_then(|cap| cap[1].parse::<i64>().ok())
}

impl AdvisoryAgent for FarmerAdvisor {
    fn name(&self) -> &str {
        &self.name
    }

    fn span(&self) -> Option<&tracing::Span> {
        Some(&self.span)
    }

    fn process_message(&self, query: &AgentQuery) -> AgentResponse {
        if query.mentions("recommend") || query.mentions("suggest") {
            self.generate_recommendation(resolve_farm_id(query))
        } else if query.mentions("analyze") {
            self.analyze_farm_data()
        } else {
            AgentResponse::new(
                &self.name,
                ResponseKind::Info,
                "I can provide farming recommendations based on soil and climate conditions.",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::InMemoryDataSource;
    use crate::models::records::fixtures::farm;

    fn advisor() -> FarmerAdvisor {
        let farms = vec![
            farm(1, "Rice", 6.4, 900.0, 28.0, 4.0),
            farm(2, "Wheat", 6.6, 950.0, 27.0, 3.0),
            farm(3, "Rice", 6.3, 850.0, 29.0, 5.0),
            farm(4, "Corn", 6.5, 980.0, 28.5, 6.0),
            farm(5, "Soybean", 6.5, 900.0, 28.0, 2.0),
            farm(6, "Cotton", 8.0, 400.0, 35.0, 9.0),
        ];
        FarmerAdvisor::new("FarmerAdvisor", Arc::new(InMemoryDataSource::new(farms, vec![])))
    }

    #[test]
    fn recommends_top_three_similar_crops() {
        let resp = advisor().run(&AgentQuery::new("Recommend crops").with_farm_id(1)).unwrap();
        assert_eq!(resp.kind, ResponseKind::Recommendation);
        match resp.payload.unwrap() {
            ResponsePayload::Recommendation {
                soil_ph,
                soil_type,
                recommended_crops,
                detailed,
            } => {
                assert_eq!(soil_ph, 6.4);
                assert_eq!(soil_type, SoilClass::SlightlyAcidic);
                assert_eq!(recommended_crops, vec!["Corn", "Rice", "Wheat"]);
                assert_eq!(detailed[1].sample_count, 2);
                assert!((detailed[1].avg_yield - 4.5).abs() < 1e-9);
            }
            other => panic!("unexpected payload {:?}", other),
        }
        assert!(resp.response.contains("I recommend: Corn, Rice, Wheat."));
        assert_eq!(resp.scores.get("environmental"), Some(&5.0));
    }

    #[test]
    fn whole_number_ph_keeps_its_decimal() {
        let farms = vec![farm(1, "Wheat", 7.0, 600.0, 20.0, 3.0)];
        let advisor =
            FarmerAdvisor::new("FarmerAdvisor", Arc::new(InMemoryDataSource::new(farms, vec![])));
        let resp = advisor.generate_recommendation(Some(1));
        assert_eq!(
            resp.response,
            "[FarmerAdvisor] Based on soil pH 7.0 (neutral soil), I recommend: Wheat."
        );
    }

    #[test]
    fn unknown_farm_is_error_response() {
        let resp = advisor().run(&AgentQuery::new("suggest something").with_farm_id(99)).unwrap();
        assert!(resp.is_error());
        assert_eq!(
            resp.response,
            "Farm_ID 99 not found in dataset. Please check and try again."
        );
    }

    #[test]
    fn farm_id_read_from_text() {
        let resp = advisor().run(&AgentQuery::new("Recommend crops for farm 6")).unwrap();
        assert_eq!(resp.kind, ResponseKind::Recommendation);
        assert!(resp.response.contains("alkaline soil"));
    }

    #[test]
    fn missing_farm_id_is_error() {
        let resp = advisor().run(&AgentQuery::new("Recommend crops for soil pH 6.5")).unwrap();
        assert!(resp.is_error());
        assert!(resp.response.starts_with("Farm_ID None not found"));
        assert!(resp.scores.is_empty());
    }

    #[test]
    fn analysis_reports_top_yields_and_mean_sustainability() {
        let resp = advisor().run(&AgentQuery::new("Analyze the farms")).unwrap();
        assert_eq!(resp.kind, ResponseKind::FarmAnalysis);
        assert!(resp.response.contains("Top performing crops are Cotton, Corn, Rice."));
        assert!(resp.response.contains("5.00/10"));
        assert_eq!(resp.numeric_fields().get("sustainability_score"), Some(&5.0));
        assert_eq!(resp.scores.get("environmental"), Some(&5.0));
    }

    #[test]
    fn recommend_wins_over_analyze() {
        let resp = advisor()
            .run(&AgentQuery::new("Analyze and recommend").with_farm_id(1))
            .unwrap();
        assert_eq!(resp.kind, ResponseKind::Recommendation);
    }

    #[test]
    fn other_queries_get_info() {
        let resp = advisor().run(&AgentQuery::new("hello there")).unwrap();
        assert_eq!(resp.kind, ResponseKind::Info);
        assert!(resp.payload.is_none());
    }
}
