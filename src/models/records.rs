use serde::{Deserialize, Serialize};

/// One observed farm season. Column names match the farm dataset exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmRecord {
    #[serde(rename = "Farm_ID")]
    pub farm_id: i64,
    #[serde(rename = "Soil_pH")]
    pub soil_ph: f64,
    #[serde(rename = "Soil_Moisture")]
    pub soil_moisture: f64,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: f64,
    #[serde(rename = "Crop_Type")]
    pub crop_type: String,
    #[serde(rename = "Fertilizer_Usage_kg")]
    pub fertilizer_usage_kg: f64,
    #[serde(rename = "Pesticide_Usage_kg")]
    pub pesticide_usage_kg: f64,
    #[serde(rename = "Crop_Yield_ton")]
    pub crop_yield_ton: f64,
    #[serde(rename = "Sustainability_Score")]
    pub sustainability_score: f64,
}

impl FarmRecord {
    /// Look up a numeric column by its dataset name.
    pub fn feature(&self, column: &str) -> Option<f64> {
        match column {
            "Farm_ID" => Some(self.farm_id as f64),
            "Soil_pH" => Some(self.soil_ph),
            "Soil_Moisture" => Some(self.soil_moisture),
            "Temperature_C" => Some(self.temperature_c),
            "Rainfall_mm" => Some(self.rainfall_mm),
            "Fertilizer_Usage_kg" => Some(self.fertilizer_usage_kg),
            "Pesticide_Usage_kg" => Some(self.pesticide_usage_kg),
            "Crop_Yield_ton" => Some(self.crop_yield_ton),
            "Sustainability_Score" => Some(self.sustainability_score),
            _ => None,
        }
    }
}

/// One market observation for a product. Column names match the market dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    #[serde(rename = "Market_ID")]
    pub market_id: i64,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Market_Price_per_ton")]
    pub market_price_per_ton: f64,
    #[serde(rename = "Demand_Index")]
    pub demand_index: f64,
    #[serde(rename = "Supply_Index")]
    pub supply_index: f64,
    #[serde(rename = "Competitor_Price_per_ton")]
    pub competitor_price_per_ton: f64,
    #[serde(rename = "Economic_Indicator")]
    pub economic_indicator: f64,
    #[serde(rename = "Weather_Impact_Score")]
    pub weather_impact_score: f64,
    #[serde(rename = "Seasonal_Factor")]
    pub seasonal_factor: f64,
    #[serde(rename = "Consumer_Trend_Index")]
    pub consumer_trend_index: f64,
}

impl MarketRecord {
    /// Price x demand over supply, with supply floored at 0.1.
    pub fn profitability(&self) -> f64 {
        self.market_price_per_ton * self.demand_index / self.supply_index.max(0.1)
    }

    pub fn trend_score(&self) -> f64 {
        self.market_price_per_ton * self.demand_index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilClass {
    Acidic,
    #[serde(rename = "slightly acidic")]
    SlightlyAcidic,
    Neutral,
    #[serde(rename = "slightly alkaline")]
    SlightlyAlkaline,
    Alkaline,
}

impl SoilClass {
    /// Classify soil by pH.
    ///
    /// Conditions are checked in a fixed order (acidic, alkaline, slightly
    /// alkaline, slightly acidic) and anything left over is neutral, so 6.5
    /// and 7.0 land in neutral while 6.0 is slightly acidic and 7.5 is
    /// slightly alkaline.
    pub fn classify(ph: f64) -> Self {
        if ph < 6.0 {
            SoilClass::Acidic
        } else if ph > 7.5 {
            SoilClass::Alkaline
        } else if ph > 7.0 {
            SoilClass::SlightlyAlkaline
        } else if ph < 6.5 {
            SoilClass::SlightlyAcidic
        } else {
            SoilClass::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilClass::Acidic => "acidic",
            SoilClass::SlightlyAcidic => "slightly acidic",
            SoilClass::Neutral => "neutral",
            SoilClass::SlightlyAlkaline => "slightly alkaline",
            SoilClass::Alkaline => "alkaline",
        }
    }
}

impl std::fmt::Display for SoilClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn farm(id: i64, crop: &str, ph: f64, rainfall: f64, temp: f64, yield_ton: f64) -> FarmRecord {
        FarmRecord {
            farm_id: id,
            soil_ph: ph,
            soil_moisture: 25.0,
            temperature_c: temp,
            rainfall_mm: rainfall,
            crop_type: crop.to_string(),
            fertilizer_usage_kg: 120.0,
            pesticide_usage_kg: 2.0,
            crop_yield_ton: yield_ton,
            sustainability_score: 5.0,
        }
    }

    pub fn market(id: i64, product: &str, price: f64, demand: f64, supply: f64) -> MarketRecord {
        MarketRecord {
            market_id: id,
            product: product.to_string(),
            market_price_per_ton: price,
            demand_index: demand,
            supply_index: supply,
            competitor_price_per_ton: price * 0.95,
            economic_indicator: 1.0,
            weather_impact_score: 50.0,
            seasonal_factor: 1.0,
            consumer_trend_index: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn soil_class_boundaries_follow_fallthrough_order() {
        assert_eq!(SoilClass::classify(5.99), SoilClass::Acidic);
        assert_eq!(SoilClass::classify(6.0), SoilClass::SlightlyAcidic);
        assert_eq!(SoilClass::classify(6.49), SoilClass::SlightlyAcidic);
        assert_eq!(SoilClass::classify(6.5), SoilClass::Neutral);
        assert_eq!(SoilClass::classify(7.0), SoilClass::Neutral);
        assert_eq!(SoilClass::classify(7.01), SoilClass::SlightlyAlkaline);
        assert_eq!(SoilClass::classify(7.5), SoilClass::SlightlyAlkaline);
        assert_eq!(SoilClass::classify(7.51), SoilClass::Alkaline);
    }

    #[test]
    fn profitability_floors_supply() {
        let m = fixtures::market(1, "Rice", 100.0, 2.0, 0.0);
        assert!((m.profitability() - 2000.0).abs() < 1e-9);

        let m = fixtures::market(2, "Rice", 100.0, 2.0, 4.0);
        assert!((m.profitability() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn feature_lookup_by_column_name() {
        let f = fixtures::farm(7, "Wheat", 6.8, 120.0, 22.0, 4.5);
        assert_eq!(f.feature("Soil_pH"), Some(6.8));
        assert_eq!(f.feature("Farm_ID"), Some(7.0));
        assert_eq!(f.feature("Crop_Type"), None);
    }

    #[test]
    fn farm_record_uses_dataset_column_names() {
        let f = fixtures::farm(1, "Corn", 6.5, 100.0, 25.0, 3.0);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["Soil_pH"], 6.5);
        assert_eq!(json["Crop_Type"], "Corn");
    }

    proptest! {
        #[test]
        fn classify_is_total_and_deterministic(ph in -5.0f64..20.0) {
            let a = SoilClass::classify(ph);
            let b = SoilClass::classify(ph);
            prop_assert_eq!(a, b);
        }
    }
}
