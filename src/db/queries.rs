use crate::db::Database;
use crate::error::Result;
use crate::models::{FarmRecord, MarketRecord};
use rusqlite::{params, Row};

const FARM_COLUMNS: &str = "Farm_ID, Soil_pH, Soil_Moisture, Temperature_C, Rainfall_mm, \
     Crop_Type, Fertilizer_Usage_kg, Pesticide_Usage_kg, Crop_Yield_ton, Sustainability_Score";

const MARKET_COLUMNS: &str = "Market_ID, Product, Market_Price_per_ton, Demand_Index, \
     Supply_Index, Competitor_Price_per_ton, Economic_Indicator, Weather_Impact_Score, \
     Seasonal_Factor, Consumer_Trend_Index";

// Farm Queries

impl Database {
    pub fn get_farm_records(&self) -> Result<Vec<FarmRecord>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {} FROM farms ORDER BY rowid", FARM_COLUMNS))?;
            let rows = stmt
                .query_map([], row_to_farm)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn insert_farm_records(&self, records: &[FarmRecord]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO farms ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    FARM_COLUMNS
                ))?;
                for r in records {
                    stmt.execute(params![
                        r.farm_id,
                        r.soil_ph,
                        r.soil_moisture,
                        r.temperature_c,
                        r.rainfall_mm,
                        r.crop_type,
                        r.fertilizer_usage_kg,
                        r.pesticide_usage_kg,
                        r.crop_yield_ton,
                        r.sustainability_score,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
    }
}

// Market Queries

impl Database {
    pub fn get_market_records(&self) -> Result<Vec<MarketRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM markets ORDER BY rowid",
                MARKET_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], row_to_market)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn insert_market_records(&self, records: &[MarketRecord]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO markets ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    MARKET_COLUMNS
                ))?;
                for r in records {
                    stmt.execute(params![
                        r.market_id,
                        r.product,
                        r.market_price_per_ton,
                        r.demand_index,
                        r.supply_index,
                        r.competitor_price_per_ton,
                        r.economic_indicator,
                        r.weather_impact_score,
                        r.seasonal_factor,
                        r.consumer_trend_index,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
    }

    /// Remove every farm and market row, keeping the schema.
    pub fn clear_datasets(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch("DELETE FROM farms; DELETE FROM markets;")?;
            Ok(())
        })
    }
}

fn row_to_farm(row: &Row) -> rusqlite::Result<FarmRecord> {
    Ok(FarmRecord {
        farm_id: row.get("Farm_ID")?,
        soil_ph: row.get("Soil_pH")?,
        soil_moisture: row.get("Soil_Moisture")?,
        temperature_c: row.get("Temperature_C")?,
        rainfall_mm: row.get("Rainfall_mm")?,
        crop_type: row.get("Crop_Type")?,
        fertilizer_usage_kg: row.get("Fertilizer_Usage_kg")?,
        pesticide_usage_kg: row.get("Pesticide_Usage_kg")?,
        crop_yield_ton: row.get("Crop_Yield_ton")?,
        sustainability_score: row.get("Sustainability_Score")?,
    })
}

fn row_to_market(row: &Row) -> rusqlite::Result<MarketRecord> {
    Ok(MarketRecord {
        market_id: row.get("Market_ID")?,
        product: row.get("Product")?,
        market_price_per_ton: row.get("Market_Price_per_ton")?,
        demand_index: row.get("Demand_Index")?,
        supply_index: row.get("Supply_Index")?,
        competitor_price_per_ton: row.get("Competitor_Price_per_ton")?,
        economic_indicator: row.get("Economic_Indicator")?,
        weather_impact_score: row.get("Weather_Impact_Score")?,
        seasonal_factor: row.get("Seasonal_Factor")?,
        consumer_trend_index: row.get("Consumer_Trend_Index")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::fixtures::{farm, market};

    #[test]
    fn farm_round_trip_through_sqlite() {
        let db = Database::open_in_memory().unwrap();
        let farms = vec![
            farm(1, "Rice", 6.5, 900.0, 28.0, 4.2),
            farm(2, "Wheat", 7.1, 600.0, 20.0, 3.1),
        ];
        assert_eq!(db.insert_farm_records(&farms).unwrap(), 2);

        let loaded = db.get_farm_records().unwrap();
        assert_eq!(loaded, farms);
    }

    #[test]
    fn markets_keep_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_market_records(&[
            market(1, "Rice", 300.0, 1.2, 1.0),
            market(2, "Corn", 200.0, 0.9, 1.1),
            market(3, "Rice", 320.0, 1.3, 0.9),
        ])
        .unwrap();

        let ids: Vec<i64> = db
            .get_market_records()
            .unwrap()
            .iter()
            .map(|m| m.market_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn clear_datasets_keeps_schema() {
        let db = Database::open_in_memory().unwrap();
        db.insert_market_records(&[market(1, "Rice", 300.0, 1.2, 1.0)])
            .unwrap();
        db.clear_datasets().unwrap();
        assert!(db.get_market_records().unwrap().is_empty());
    }
}
