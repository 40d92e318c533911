use super::DataSource;
use crate::db::Database;
use crate::error::Result;
use crate::models::{FarmRecord, MarketRecord};

/// Snapshot of the `farms` and `markets` tables taken when the source is opened.
#[derive(Debug, Clone)]
pub struct SqliteDataSource {
    farms: Vec<FarmRecord>,
    markets: Vec<MarketRecord>,
}

impl SqliteDataSource {
    pub fn load(db: &Database) -> Result<Self> {
        let farms = db.get_farm_records()?;
        let markets = db.get_market_records()?;
        tracing::info!(
            path = %db.path().display(),
            farms = farms.len(),
            markets = markets.len(),
            "Loaded records from SQLite"
        );
        Ok(Self { farms, markets })
    }
}

impl DataSource for SqliteDataSource {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn farm_records(&self) -> &[FarmRecord] {
        &self.farms
    }

    fn market_records(&self) -> &[MarketRecord] {
        &self.markets
    }
}
