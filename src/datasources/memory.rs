use super::DataSource;
use crate::models::{FarmRecord, MarketRecord};

/// Records held directly in memory, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    farms: Vec<FarmRecord>,
    markets: Vec<MarketRecord>,
}

impl InMemoryDataSource {
    pub fn new(farms: Vec<FarmRecord>, markets: Vec<MarketRecord>) -> Self {
        Self { farms, markets }
    }
}

impl DataSource for InMemoryDataSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn farm_records(&self) -> &[FarmRecord] {
        &self.farms
    }

    fn market_records(&self) -> &[MarketRecord] {
        &self.markets
    }
}
