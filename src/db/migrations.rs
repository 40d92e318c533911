use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: dataset tables
    r#"
    CREATE TABLE IF NOT EXISTS farms (
        Farm_ID INTEGER,
        Soil_pH REAL,
        Soil_Moisture REAL,
        Temperature_C REAL,
        Rainfall_mm REAL,
        Crop_Type TEXT,
        Fertilizer_Usage_kg REAL,
        Pesticide_Usage_kg REAL,
        Crop_Yield_ton REAL,
        Sustainability_Score REAL
    );

    CREATE TABLE IF NOT EXISTS markets (
        Market_ID INTEGER,
        Product TEXT,
        Market_Price_per_ton REAL,
        Demand_Index REAL,
        Supply_Index REAL,
        Competitor_Price_per_ton REAL,
        Economic_Indicator REAL,
        Weather_Impact_Score REAL,
        Seasonal_Factor REAL,
        Consumer_Trend_Index REAL
    );
    "#,
    // Migration 2: lookup indexes
    r#"
    CREATE INDEX IF NOT EXISTS idx_farms_farm_id ON farms(Farm_ID);
    CREATE INDEX IF NOT EXISTS idx_farms_crop_type ON farms(Crop_Type);
    CREATE INDEX IF NOT EXISTS idx_markets_product ON markets(Product);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                conn.execute_batch(migration)?;
                conn.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
            }
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        run(&db).unwrap();

        let version: i32 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |r| {
                    r.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(version, MIGRATIONS.len() as i32);
    }
}
