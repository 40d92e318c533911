use super::{RidgeRegression, StandardScaler};
use crate::config::YieldModelConfig;
use crate::datasources::DataSource;
use crate::error::{CropwiseError, Result};
use crate::models::{
    FarmRecord, FeatureImportance, FieldData, ManagementAdvice, OptimalRanges, PracticeAdvice,
    YieldPrediction,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Model inputs, in column order.
pub const FEATURES: [&str; 6] = [
    "Soil_pH",
    "Rainfall_mm",
    "Temperature_C",
    "Soil_Moisture",
    "Fertilizer_Usage_kg",
    "Pesticide_Usage_kg",
];

/// Form and query-string names that don't match a feature by spelling alone.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("soil_ph", "Soil_pH"),
    ("rainfall", "Rainfall_mm"),
    ("temperature", "Temperature_C"),
    ("pesticide_use", "Pesticide_Usage_kg"),
    ("fertilizer_use", "Fertilizer_Usage_kg"),
    ("Pesticide_Use_kg", "Pesticide_Usage_kg"),
    ("Fertilizer_Use_kg", "Fertilizer_Usage_kg"),
    // Field size stands in for moisture
    ("field_size", "Soil_Moisture"),
    ("Field_Size_hectare", "Soil_Moisture"),
];

const MAX_CONFIDENCE: f64 = 90.0;
const UNIT: &str = "tons/hectare";

/// Training spread of one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FeatureRange {
    min: f64,
    q1: f64,
    q3: f64,
    max: f64,
}

/// What goes to disk next to the scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelArtifact {
    feature_columns: Vec<String>,
    regression: RidgeRegression,
}

#[derive(Debug)]
struct TrainedModel {
    feature_columns: Vec<String>,
    scaler: StandardScaler,
    regression: RidgeRegression,
    ranges: Vec<FeatureRange>,
}

enum ModelSlot {
    Absent,
    Ready(Arc<TrainedModel>),
    Insufficient,
}

/// Per-crop yield regression with a lazily filled, at-most-once model cache.
pub struct YieldPredictor {
    source: Arc<dyn DataSource>,
    models_dir: Option<PathBuf>,
    min_records: usize,
    ridge_lambda: f64,
    slots: Mutex<HashMap<String, Arc<Mutex<ModelSlot>>>>,
    training_runs: AtomicUsize,
}

impl YieldPredictor {
    pub fn new(source: Arc<dyn DataSource>, config: &YieldModelConfig) -> Self {
        Self {
            source,
            models_dir: None,
            min_records: config.min_training_records,
            ridge_lambda: config.ridge_lambda,
            slots: Mutex::new(HashMap::new()),
            training_runs: AtomicUsize::new(0),
        }
    }

    /// Persist trained models under `dir` and reuse artifacts found there.
    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = Some(dir.into());
        self
    }

    /// Number of models fitted by this predictor (artifact loads excluded).
    pub fn training_runs(&self) -> usize {
        self.training_runs.load(Ordering::Relaxed)
    }

    /// Train or load a model for every crop type in the data. Returns how
    /// many crops have a usable model.
    pub fn preload(&self) -> usize {
        self.source
            .crop_types()
            .iter()
            .filter(|crop| self.model(crop).is_some())
            .count()
    }

    /// Discard any cached or persisted model for `crop` and fit a new one.
    pub fn retrain(&self, crop: &str) -> bool {
        let slot = self.slot(crop);
        let mut state = slot.lock();
        *state = self.train(crop);
        matches!(*state, ModelSlot::Ready(_))
    }

    pub fn is_trained(&self, crop: &str) -> bool {
        self.model(crop).is_some()
    }

    pub fn predict_yield(&self, crop: &str, fields: &FieldData, weather_impact: f64) -> Result<YieldPrediction> {
        let Some(model) = self.model(crop) else {
            return Ok(YieldPrediction::insufficient(format!(
                "Insufficient data to make predictions for {}",
                crop
            )));
        };

        let inputs = normalize_fields(fields)?;
        tracing::debug!(crop, inputs = ?inputs, "Normalized yield inputs");

        let row: Vec<f64> = model
            .feature_columns
            .iter()
            .map(|col| inputs.get(col.as_str()).copied().unwrap_or(0.0))
            .collect();
        let base_yield = model.regression.predict(&model.scaler.transform(&row));
        let adjusted = base_yield * weather_impact;

        let mut in_range = 0usize;
        let mut present = 0usize;
        let mut notes = Vec::new();
        for (col, range) in model.feature_columns.iter().zip(&model.ranges) {
            let Some(&value) = inputs.get(col.as_str()) else {
                continue;
            };
            present += 1;
            if range.q1 <= value && value <= range.q3 {
                in_range += 1;
            } else if value < range.min || value > range.max {
                notes.push(format!("{} is outside typical range", col));
            }
        }
        let confidence = (in_range as f64 / present.max(1) as f64 * 100.0)
            .round()
            .min(MAX_CONFIDENCE) as u8;

        let weather_effect = if weather_impact < 0.9 {
            "reduced due to unfavorable weather conditions"
        } else if weather_impact > 1.1 {
            "increased due to favorable weather conditions"
        } else {
            "not significantly affected by weather"
        };
        let mut explanation = format!("Expected yield is {}.", weather_effect);
        if !notes.is_empty() {
            explanation.push_str(&format!(" Note: {}.", notes.join("; ")));
        }

        Ok(YieldPrediction {
            yield_prediction: Some(round2(adjusted)),
            base_yield: Some(round2(base_yield)),
            weather_impact: Some(round2(weather_impact)),
            unit: Some(UNIT.to_string()),
            explanation,
            confidence,
        })
    }

    /// Relative weight of each feature, by normalised absolute coefficient.
    pub fn feature_importance(&self, crop: &str) -> Option<Vec<FeatureImportance>> {
        let model = self.model(crop)?;
        let total: f64 = model.regression.coefficients.iter().map(|c| c.abs()).sum();
        let mut importance: Vec<FeatureImportance> = model
            .feature_columns
            .iter()
            .zip(&model.regression.coefficients)
            .map(|(feature, coef)| FeatureImportance {
                feature: feature.clone(),
                importance: if total > 0.0 { coef.abs() / total } else { 0.0 },
            })
            .collect();
        importance.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Some(importance)
    }

    /// Fertiliser, pesticide and irrigation advice. `None` until the crop has
    /// a trained model.
    pub fn evaluate_management_practices(
        &self,
        crop: &str,
        fields: &FieldData,
    ) -> Result<Option<ManagementAdvice>> {
        if self.model(crop).is_none() {
            return Ok(None);
        }
        let inputs = normalize_fields(fields)?;
        Ok(Some(management_advice(crop, &inputs)))
    }

    fn slot(&self, crop: &str) -> Arc<Mutex<ModelSlot>> {
        self.slots
            .lock()
            .entry(crop.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ModelSlot::Absent)))
            .clone()
    }

    /// Ready model for `crop`, training or loading it on first use. The slot
    /// lock is held across training so concurrent callers wait instead of
    /// fitting twice.
    fn model(&self, crop: &str) -> Option<Arc<TrainedModel>> {
        let slot = self.slot(crop);
        let mut state = slot.lock();
        if matches!(*state, ModelSlot::Absent) {
            *state = self.load_or_train(crop);
        }
        match &*state {
            ModelSlot::Ready(model) => Some(Arc::clone(model)),
            _ => None,
        }
    }

    fn load_or_train(&self, crop: &str) -> ModelSlot {
        let records = self.source.farms_for_crop(crop);
        if records.len() < self.min_records {
            tracing::warn!(crop, records = records.len(), "Not enough data to train yield model");
            return ModelSlot::Insufficient;
        }

        if let Some(dir) = &self.models_dir {
            match load_artifacts(dir, crop) {
                Ok(Some((artifact, scaler))) => {
                    tracing::info!(crop, "Loaded pretrained yield model");
                    return ModelSlot::Ready(Arc::new(TrainedModel {
                        ranges: feature_ranges(&records, &artifact.feature_columns),
                        feature_columns: artifact.feature_columns,
                        scaler,
                        regression: artifact.regression,
                    }));
                }
                Ok(None) => {}
                Err(e) => tracing::error!(crop, error = %e, "Failed to load yield model, retraining"),
            }
        }

        self.train(crop)
    }

    fn train(&self, crop: &str) -> ModelSlot {
        let records = self.source.farms_for_crop(crop);
        if records.len() < self.min_records {
            tracing::warn!(crop, records = records.len(), "Not enough data to train yield model");
            return ModelSlot::Insufficient;
        }

        let columns: Vec<String> = FEATURES.iter().map(|f| f.to_string()).collect();
        let model = match fit(&records, columns, self.ridge_lambda) {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!(crop, error = %e, "Yield model training failed");
                return ModelSlot::Insufficient;
            }
        };
        self.training_runs.fetch_add(1, Ordering::Relaxed);

        if let Some(dir) = &self.models_dir {
            match save_artifacts(dir, crop, &model) {
                Ok(()) => tracing::info!(crop, dir = %dir.display(), "Trained and saved yield model"),
                Err(e) => tracing::warn!(crop, error = %e, "Trained yield model but could not save it"),
            }
        } else {
            tracing::info!(crop, "Trained yield model");
        }

        ModelSlot::Ready(Arc::new(model))
    }
}

fn fit(records: &[&FarmRecord], columns: Vec<String>, lambda: f64) -> Result<TrainedModel> {
    let rows: Vec<Vec<f64>> = records
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| r.feature(c).unwrap_or(0.0))
                .collect()
        })
        .collect();
    let targets: Vec<f64> = records.iter().map(|r| r.crop_yield_ton).collect();

    let scaler = StandardScaler::fit(&rows)?;
    let regression = RidgeRegression::fit(&scaler.transform_all(&rows), &targets, lambda)?;

    Ok(TrainedModel {
        ranges: feature_ranges(records, &columns),
        feature_columns: columns,
        scaler,
        regression,
    })
}

fn feature_ranges(records: &[&FarmRecord], columns: &[String]) -> Vec<FeatureRange> {
    columns
        .iter()
        .map(|col| {
            let mut values: Vec<f64> = records.iter().filter_map(|r| r.feature(col)).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            FeatureRange {
                min: values.first().copied().unwrap_or(0.0),
                q1: quantile(&values, 0.25),
                q3: quantile(&values, 0.75),
                max: values.last().copied().unwrap_or(0.0),
            }
        })
        .collect()
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn artifact_paths(dir: &Path, crop: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{}_yield_model.bin", crop)),
        dir.join(format!("{}_scaler.bin", crop)),
    )
}

fn load_artifacts(dir: &Path, crop: &str) -> Result<Option<(ModelArtifact, StandardScaler)>> {
    let (model_path, scaler_path) = artifact_paths(dir, crop);
    if !model_path.exists() || !scaler_path.exists() {
        return Ok(None);
    }

    let artifact: ModelArtifact = bincode::deserialize(&std::fs::read(&model_path)?)?;
    let scaler: StandardScaler = bincode::deserialize(&std::fs::read(&scaler_path)?)?;

    let width = artifact.feature_columns.len();
    if artifact.feature_columns.iter().map(String::as_str).ne(FEATURES.iter().copied())
        || artifact.regression.coefficients.len() != width
        || scaler.width() != width
    {
        return Err(CropwiseError::InvalidData(format!(
            "artifact for {} does not match the feature columns",
            crop
        )));
    }
    Ok(Some((artifact, scaler)))
}

fn save_artifacts(dir: &Path, crop: &str, model: &TrainedModel) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let (model_path, scaler_path) = artifact_paths(dir, crop);
    let artifact = ModelArtifact {
        feature_columns: model.feature_columns.clone(),
        regression: model.regression.clone(),
    };
    std::fs::write(model_path, bincode::serialize(&artifact)?)?;
    std::fs::write(scaler_path, bincode::serialize(&model.scaler)?)?;
    Ok(())
}

/// Map caller field names onto feature names and parse their values.
///
/// Keys that name no feature are dropped. A feature key whose value is not a
/// number is an error.
pub fn normalize_fields(fields: &FieldData) -> Result<BTreeMap<&'static str, f64>> {
    let mut out = BTreeMap::new();
    for (key, raw) in fields {
        let Some(feature) = canonical_feature(key) else {
            continue;
        };
        let value = raw.trim().parse::<f64>().map_err(|_| {
            CropwiseError::InvalidData(format!("{} must be numeric, got '{}'", key, raw))
        })?;
        out.insert(feature, value);
    }
    Ok(out)
}

fn canonical_feature(key: &str) -> Option<&'static str> {
    if let Some(&(_, feature)) = FIELD_ALIASES.iter().find(|(alias, _)| *alias == key) {
        return Some(feature);
    }
    let squashed = squash(key);
    FEATURES.iter().copied().find(|f| squash(f) == squashed)
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

struct PracticeTable {
    fertilizer: (u32, u32),
    pesticide: (f64, f64),
    irrigation: Option<&'static str>,
}

fn practice_table(crop: &str) -> PracticeTable {
    match crop.to_ascii_lowercase().as_str() {
        "rice" => PracticeTable { fertilizer: (80, 120), pesticide: (1.5, 2.5), irrigation: Some("Flood") },
        "wheat" => PracticeTable { fertilizer: (100, 150), pesticide: (1.0, 2.0), irrigation: Some("Sprinkler") },
        "maize" | "corn" => PracticeTable { fertilizer: (120, 180), pesticide: (1.5, 2.5), irrigation: Some("Drip") },
        "potato" => PracticeTable { fertilizer: (150, 200), pesticide: (2.0, 3.0), irrigation: Some("Sprinkler") },
        "cotton" => PracticeTable { fertilizer: (100, 150), pesticide: (2.0, 3.0), irrigation: Some("Drip") },
        _ => PracticeTable { fertilizer: (100, 150), pesticide: (1.5, 2.5), irrigation: None },
    }
}

fn management_advice(crop: &str, inputs: &BTreeMap<&'static str, f64>) -> ManagementAdvice {
    let table = practice_table(crop);
    let fertilizer = inputs.get("Fertilizer_Usage_kg").copied().unwrap_or(0.0);
    let pesticide = inputs.get("Pesticide_Usage_kg").copied().unwrap_or(0.0);

    let (fert_min, fert_max) = table.fertilizer;
    let fert_range = format!("{}-{}", fert_min, fert_max);
    let (pest_min, pest_max) = table.pesticide;
    let pest_range = format!("{:.1}-{:.1}", pest_min, pest_max);

    // (text, simulated yield impact)
    let mut advice: Vec<(String, f64)> = Vec::new();

    if fertilizer < f64::from(fert_min) {
        advice.push((
            format!("Consider increasing fertilizer application to {} kg/hectare for optimal yield.", fert_range),
            0.5,
        ));
    } else if fertilizer > f64::from(fert_max) {
        advice.push((
            format!(
                "Consider reducing fertilizer application to {} kg/hectare for optimal yield and environmental sustainability.",
                fert_range
            ),
            -0.2,
        ));
    } else {
        advice.push(("Fertilizer application is within optimal range.".to_string(), 0.0));
    }

    if pesticide < pest_min {
        advice.push((
            format!("Consider increasing pesticide application to {} kg/hectare for pest management.", pest_range),
            0.5,
        ));
    } else if pesticide > pest_max {
        advice.push((
            format!(
                "Consider reducing pesticide application to {} kg/hectare for environmental sustainability.",
                pest_range
            ),
            -0.2,
        ));
    } else {
        advice.push(("Pesticide application is within optimal range.".to_string(), 0.0));
    }

    if let Some(irrigation) = table.irrigation {
        advice.push((
            format!(
                "Consider switching to {} irrigation for optimal water use efficiency for {}.",
                irrigation, crop
            ),
            0.3,
        ));
    }

    ManagementAdvice {
        recommendations: advice
            .into_iter()
            .enumerate()
            .map(|(i, (recommendation, impact))| PracticeAdvice {
                practice: format!("Practice {}", i + 1),
                recommendation,
                impact,
            })
            .collect(),
        optimal_ranges: OptimalRanges {
            fertilizer: format!("{} kg/hectare", fert_range),
            pesticide: format!("{} kg/hectare", pest_range),
            recommended_irrigation: table.irrigation.unwrap_or("Not specified").to_string(),
        },
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::InMemoryDataSource;
    use crate::models::records::fixtures::farm;

    /// Twelve Rice farms where yield rises with rainfall, plus three Wheat.
    fn source() -> Arc<dyn DataSource> {
        let mut farms = Vec::new();
        for i in 0..12 {
            let rain = 800.0 + 20.0 * i as f64;
            let mut f = farm(i, "Rice", 6.0 + 0.1 * (i % 5) as f64, rain, 26.0 + (i % 3) as f64, 2.0 + rain / 500.0);
            f.fertilizer_usage_kg = 100.0 + (i % 4) as f64 * 5.0;
            f.pesticide_usage_kg = 1.5 + (i % 2) as f64 * 0.5;
            f.soil_moisture = 20.0 + (i % 6) as f64;
            farms.push(f);
        }
        for i in 0..3 {
            farms.push(farm(100 + i, "Wheat", 6.5, 600.0, 20.0, 3.0));
        }
        Arc::new(InMemoryDataSource::new(farms, vec![]))
    }

    fn predictor() -> YieldPredictor {
        YieldPredictor::new(source(), &YieldModelConfig::default())
    }

    fn fields(pairs: &[(&str, &str)]) -> FieldData {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn typical() -> FieldData {
        fields(&[
            ("soil_ph", "6.2"),
            ("rainfall", "910"),
            ("temperature", "27"),
            ("Soil_Moisture", "22"),
            ("fertilizer_use", "105"),
            ("pesticide_use", "1.75"),
        ])
    }

    #[test]
    fn insufficient_data_gives_zero_confidence() {
        let p = predictor();
        for input in [typical(), fields(&[("soil_ph", "acid")]), FieldData::new()] {
            let pred = p.predict_yield("Wheat", &input, 1.0).unwrap();
            assert_eq!(pred.confidence, 0);
            assert!(pred.yield_prediction.is_none());
            assert_eq!(pred.explanation, "Insufficient data to make predictions for Wheat");
        }
        assert!(p.evaluate_management_practices("Wheat", &typical()).unwrap().is_none());
        assert!(p.feature_importance("Wheat").is_none());
    }

    #[test]
    fn predicts_with_weather_adjustment() {
        let p = predictor();
        let pred = p.predict_yield("Rice", &typical(), 0.8).unwrap();
        let base = pred.base_yield.unwrap();
        assert!(base > 3.0 && base < 5.0, "base yield {}", base);
        assert!((pred.yield_prediction.unwrap() - round2(base * 0.8)).abs() < 0.011);
        assert_eq!(pred.weather_impact, Some(0.8));
        assert_eq!(pred.unit.as_deref(), Some("tons/hectare"));
        assert!(pred.explanation.starts_with("Expected yield is reduced"));
        assert!(pred.confidence <= 90);
    }

    #[test]
    fn out_of_range_inputs_are_noted_and_lower_confidence() {
        let p = predictor();
        let mut input = typical();
        input.insert("rainfall".into(), "5000".into());
        let pred = p.predict_yield("Rice", &input, 1.0).unwrap();
        assert!(pred.explanation.contains("Rainfall_mm is outside typical range"));
        assert!(pred.explanation.contains("not significantly affected"));

        let baseline = p.predict_yield("Rice", &typical(), 1.0).unwrap();
        assert!(pred.confidence < baseline.confidence || baseline.confidence == 0);
    }

    #[test]
    fn non_numeric_feature_is_invalid_data() {
        let err = predictor()
            .predict_yield("Rice", &fields(&[("Soil_pH", "acid")]), 1.0)
            .unwrap_err();
        assert!(matches!(err, CropwiseError::InvalidData(_)));
    }

    #[test]
    fn unknown_keys_are_ignored_and_missing_features_zero_filled() {
        let pred = predictor()
            .predict_yield("Rice", &fields(&[("crop_color", "green")]), 1.0)
            .unwrap();
        assert!(pred.yield_prediction.is_some());
        assert_eq!(pred.confidence, 0);
    }

    #[test]
    fn field_names_normalize() {
        let normalized = normalize_fields(&fields(&[
            ("SOIL_PH", "6.5"),
            ("rainfallmm", "900"),
            ("Field_Size_hectare", "3"),
            ("Fertilizer_Use_kg", "110"),
            ("notes", "anything"),
        ]))
        .unwrap();
        assert_eq!(normalized.get("Soil_pH"), Some(&6.5));
        assert_eq!(normalized.get("Rainfall_mm"), Some(&900.0));
        assert_eq!(normalized.get("Soil_Moisture"), Some(&3.0));
        assert_eq!(normalized.get("Fertilizer_Usage_kg"), Some(&110.0));
        assert_eq!(normalized.len(), 4);
    }

    #[test]
    fn trains_once_per_crop() {
        let p = predictor();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| p.predict_yield("Rice", &typical(), 1.0).unwrap());
            }
        });
        assert_eq!(p.training_runs(), 1);
        assert!(p.retrain("Rice"));
        assert_eq!(p.training_runs(), 2);
    }

    #[test]
    fn artifacts_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let first = predictor().with_models_dir(dir.path());
        let a = first.predict_yield("Rice", &typical(), 1.0).unwrap();
        assert!(dir.path().join("Rice_yield_model.bin").exists());
        assert!(dir.path().join("Rice_scaler.bin").exists());

        let second = predictor().with_models_dir(dir.path());
        let b = second.predict_yield("Rice", &typical(), 1.0).unwrap();
        assert_eq!(second.training_runs(), 0);
        assert_eq!(a, b);
    }

    #[test]
    fn corrupt_artifact_triggers_retrain() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Rice_yield_model.bin"), b"junk").unwrap();
        std::fs::write(dir.path().join("Rice_scaler.bin"), b"junk").unwrap();

        let p = predictor().with_models_dir(dir.path());
        assert!(p.is_trained("Rice"));
        assert_eq!(p.training_runs(), 1);
    }

    #[test]
    fn preload_trains_every_eligible_crop() {
        let p = predictor();
        assert_eq!(p.preload(), 1);
    }

    #[test]
    fn importance_is_normalized_and_sorted() {
        let imp = predictor().feature_importance("Rice").unwrap();
        assert_eq!(imp.len(), FEATURES.len());
        let total: f64 = imp.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(imp.windows(2).all(|w| w[0].importance >= w[1].importance));
        assert_eq!(imp[0].feature, "Rainfall_mm");
    }

    #[test]
    fn management_advice_for_rice() {
        let advice = predictor()
            .evaluate_management_practices(
                "Rice",
                &fields(&[("Fertilizer_Usage_kg", "60"), ("Pesticide_Use_kg", "3.0")]),
            )
            .unwrap()
            .unwrap();

        assert_eq!(advice.recommendations.len(), 3);
        assert_eq!(advice.recommendations[0].practice, "Practice 1");
        assert_eq!(advice.recommendations[0].impact, 0.5);
        assert!(advice.recommendations[0].recommendation.contains("80-120 kg/hectare"));
        assert_eq!(advice.recommendations[1].impact, -0.2);
        assert!(advice.recommendations[1].recommendation.contains("1.5-2.5"));
        assert_eq!(advice.recommendations[2].impact, 0.3);
        assert_eq!(advice.optimal_ranges.recommended_irrigation, "Flood");
        assert_eq!(advice.optimal_ranges.fertilizer, "80-120 kg/hectare");
    }

    #[test]
    fn default_practice_table_has_no_irrigation() {
        let mut inputs = BTreeMap::new();
        inputs.insert("Fertilizer_Usage_kg", 120.0);
        inputs.insert("Pesticide_Usage_kg", 2.0);
        let advice = management_advice("Sorghum", &inputs);
        assert_eq!(advice.recommendations.len(), 2);
        assert!(advice.recommendations.iter().all(|r| r.impact == 0.0));
        assert_eq!(advice.optimal_ranges.recommended_irrigation, "Not specified");
    }

    #[test]
    fn quantile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&v, 0.25), 2.0);
        assert_eq!(quantile(&[1.0, 2.0], 0.75), 1.75);
    }
}
