use super::agents::{AdvisoryAgent, MarketResearcher};
use super::decision::{DecisionEngine, DecisionOutcome};
use super::rotation::RotationPlanner;
use super::weather::WeatherSimulator;
use super::yield_model::YieldPredictor;
use crate::datasources::DataSource;
use crate::error::Result;
use crate::models::{
    AgentQuery, AgentResponse, CropFamily, FieldData, ManagementAdvice, WeatherSeries,
    YieldImpact, YieldPrediction,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

const FORECAST_MONTHS: u32 = 3;
const ROTATION_YEARS: usize = 3;

/// What a grower tells us about their field.
#[derive(Debug, Clone, Default)]
pub struct FarmProfile {
    pub soil_ph: f64,
    pub location: String,
    /// Defaults to the simulator's today.
    pub planting_date: Option<NaiveDate>,
    /// Extra yield inputs (rainfall, fertiliser, ...), any naming the yield
    /// predictor understands.
    pub fields: FieldData,
}

impl FarmProfile {
    pub fn new(soil_ph: f64, location: impl Into<String>) -> Self {
        Self {
            soil_ph,
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_planting_date(mut self, date: NaiveDate) -> Self {
        self.planting_date = Some(date);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CropReport {
    pub crop_type: String,
    pub sustainability_score: f64,
    pub weather_impact: YieldImpact,
    pub yield_prediction: YieldPrediction,
    pub rotation_plan: Vec<CropFamily>,
    pub rotation_text: String,
    pub price_forecast: Option<AgentResponse>,
    pub management: Option<ManagementAdvice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmReport {
    pub query: String,
    pub engine: DecisionOutcome,
    pub weather_forecast: WeatherSeries,
    pub crop_details: Vec<CropReport>,
}

/// Runs the decision engine for a farm, then enriches each recommended crop
/// with weather, yield, rotation, price and management detail.
pub struct RecommendationPipeline {
    engine: DecisionEngine,
    researcher: MarketResearcher,
    weather: Arc<WeatherSimulator>,
    yields: Arc<YieldPredictor>,
    rotation: RotationPlanner,
}

impl RecommendationPipeline {
    pub fn new(
        source: Arc<dyn DataSource>,
        weather: Arc<WeatherSimulator>,
        yields: Arc<YieldPredictor>,
    ) -> Self {
        Self {
            engine: DecisionEngine::new(Arc::clone(&source)),
            researcher: MarketResearcher::new("MarketResearcher", source),
            weather,
            yields,
            rotation: RotationPlanner::new(),
        }
    }

    pub fn recommend(&self, profile: &FarmProfile) -> Result<FarmReport> {
        let query = format!("Recommend crops for soil pH {}", profile.soil_ph);
        let outcome = self.engine.run(&query);
        let weather_forecast = self
            .weather
            .get_weather_forecast(&profile.location, FORECAST_MONTHS);

        let mut fields = profile.fields.clone();
        fields
            .entry("Soil_pH".to_string())
            .or_insert_with(|| profile.soil_ph.to_string());
        let planting_date = profile.planting_date.unwrap_or_else(|| self.weather.today());

        let mut crop_details = Vec::new();
        for ranked in outcome.recommendations() {
            crop_details.push(self.crop_report(
                &ranked.crop_type,
                ranked.sustainability_score,
                &profile.location,
                planting_date,
                &fields,
            )?);
        }

        tracing::info!(
            soil_ph = profile.soil_ph,
            location = %profile.location,
            crops = crop_details.len(),
            "Built farm report"
        );

        Ok(FarmReport {
            query,
            engine: outcome,
            weather_forecast,
            crop_details,
        })
    }

    fn crop_report(
        &self,
        crop: &str,
        sustainability_score: f64,
        location: &str,
        planting_date: NaiveDate,
        fields: &FieldData,
    ) -> Result<CropReport> {
        let weather_impact = self
            .weather
            .calculate_yield_impact(crop, location, planting_date);
        let yield_prediction =
            self.yields
                .predict_yield(crop, fields, weather_impact.impact_factor)?;

        let rotation_plan = self.rotation.suggest_rotation(crop, None, ROTATION_YEARS);
        let rotation_text = self.rotation.format_rotation_plan(crop, &rotation_plan);

        let price_query = AgentQuery::new(format!("Forecast prices for {}", crop)).with_product(crop);
        let price_forecast = self.researcher.run(&price_query);

        let management = self.yields.evaluate_management_practices(crop, fields)?;

        Ok(CropReport {
            crop_type: crop.to_string(),
            sustainability_score,
            weather_impact,
            yield_prediction,
            rotation_plan,
            rotation_text,
            price_forecast,
            management,
        })
    }
}
