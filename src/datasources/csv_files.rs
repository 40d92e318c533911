use super::DataSource;
use crate::error::{CropwiseError, Result};
use crate::models::{FarmRecord, MarketRecord};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

/// Farm and market datasets read from CSV files with header rows.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    farms: Vec<FarmRecord>,
    markets: Vec<MarketRecord>,
}

impl CsvDataSource {
    pub fn load(farm_csv: &Path, market_csv: &Path) -> Result<Self> {
        let farms = read_file(farm_csv)?;
        tracing::info!(path = %farm_csv.display(), count = farms.len(), "Loaded farm records");

        let markets = read_file(market_csv)?;
        tracing::info!(path = %market_csv.display(), count = markets.len(), "Loaded market records");

        Ok(Self { farms, markets })
    }

    pub fn from_readers<F: Read, M: Read>(farms: F, markets: M) -> Result<Self> {
        Ok(Self {
            farms: read_records(farms)?,
            markets: read_records(markets)?,
        })
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path).map_err(|e| {
        CropwiseError::NotFound(format!("dataset {}: {}", path.display(), e))
    })?;
    read_records(file)
}

/// Deserialize every row; a row with a non-numeric value in a numeric column
/// fails the whole load with the offending line in the message.
pub fn read_records<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

impl DataSource for CsvDataSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn farm_records(&self) -> &[FarmRecord] {
        &self.farms
    }

    fn market_records(&self) -> &[MarketRecord] {
        &self.markets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FARMS: &str = "\
Farm_ID,Soil_pH,Soil_Moisture,Temperature_C,Rainfall_mm,Crop_Type,Fertilizer_Usage_kg,Pesticide_Usage_kg,Crop_Yield_ton,Sustainability_Score
1,6.5,25.0,28.0,900.0,Rice,120.0,2.0,4.2,7.5
2,7.2,18.5,21.0,600.0,Wheat,110.0,1.5,3.1,6.0
";

    const MARKETS: &str = "\
Market_ID,Product,Market_Price_per_ton,Demand_Index,Supply_Index,Competitor_Price_per_ton,Economic_Indicator,Weather_Impact_Score,Seasonal_Factor,Consumer_Trend_Index
1,Rice,320.5,120.0,95.0,310.0,1.1,60.0,1.0,70.0
";

    #[test]
    fn reads_dataset_columns() {
        let source = CsvDataSource::from_readers(FARMS.as_bytes(), MARKETS.as_bytes()).unwrap();
        assert_eq!(source.farm_records().len(), 2);
        assert_eq!(source.farm_records()[1].crop_type, "Wheat");
        assert_eq!(source.market_records()[0].market_price_per_ton, 320.5);
    }

    #[test]
    fn malformed_number_is_an_error() {
        let bad = FARMS.replace("6.5,25.0", "acid,25.0");
        let err = CsvDataSource::from_readers(bad.as_bytes(), MARKETS.as_bytes()).unwrap_err();
        assert!(matches!(err, CropwiseError::Csv(_)));
    }

    #[test]
    fn loads_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let farm_path = dir.path().join("farms.csv");
        let market_path = dir.path().join("markets.csv");
        std::fs::File::create(&farm_path)
            .unwrap()
            .write_all(FARMS.as_bytes())
            .unwrap();
        std::fs::File::create(&market_path)
            .unwrap()
            .write_all(MARKETS.as_bytes())
            .unwrap();

        let source = CsvDataSource::load(&farm_path, &market_path).unwrap();
        assert_eq!(source.farm_by_id(1).unwrap().crop_type, "Rice");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = CsvDataSource::load(Path::new("/nope/farms.csv"), Path::new("/nope/m.csv"))
            .unwrap_err();
        assert!(matches!(err, CropwiseError::NotFound(_)));
    }
}
