pub mod csv_files;
pub mod memory;
pub mod sqlite;

pub use csv_files::CsvDataSource;
pub use memory::InMemoryDataSource;
pub use sqlite::SqliteDataSource;

use crate::models::{FarmRecord, MarketRecord};

/// Read-only tabular farm and market records.
///
/// Implementations load their records once; every consumer sees the same
/// immutable snapshot.
pub trait DataSource: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    fn farm_records(&self) -> &[FarmRecord];

    fn market_records(&self) -> &[MarketRecord];

    /// First record carrying this farm id.
    fn farm_by_id(&self, farm_id: i64) -> Option<&FarmRecord> {
        self.farm_records().iter().find(|f| f.farm_id == farm_id)
    }

    fn farms_for_crop(&self, crop_type: &str) -> Vec<&FarmRecord> {
        self.farm_records()
            .iter()
            .filter(|f| f.crop_type == crop_type)
            .collect()
    }

    /// Farms with `lo <= Soil_pH <= hi`.
    fn farms_in_ph_range(&self, lo: f64, hi: f64) -> Vec<&FarmRecord> {
        self.farm_records()
            .iter()
            .filter(|f| f.soil_ph >= lo && f.soil_ph <= hi)
            .collect()
    }

    fn markets_for_product(&self, product: &str) -> Vec<&MarketRecord> {
        self.market_records()
            .iter()
            .filter(|m| m.product == product)
            .collect()
    }

    /// Distinct crop types in first-seen order.
    fn crop_types(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for f in self.farm_records() {
            if !seen.contains(&f.crop_type) {
                seen.push(f.crop_type.clone());
            }
        }
        seen
    }

    /// Distinct products in first-seen order.
    fn products(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for m in self.market_records() {
            if !seen.contains(&m.product) {
                seen.push(m.product.clone());
            }
        }
        seen
    }
}
