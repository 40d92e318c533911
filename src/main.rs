mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use cropwise::config::{Config, DataBackend};
use cropwise::datasources::{CsvDataSource, DataSource, SqliteDataSource};
use cropwise::db::Database;
use cropwise::logic::{
    AdvisoryAgent, Coordinator, DecisionEngine, FarmProfile, FarmerAdvisor, MarketResearcher,
    RecommendationPipeline, RotationPlanner, WeatherSimulator, YieldPredictor,
};
use cropwise::models::{AgentQuery, FieldData, SoilHealth};
use cropwise::CropwiseError;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init = cli.command {
        let (_, path) = Config::setup_interactive()?;
        return print_json(&json!({ "config": path }));
    }

    let config = Config::load_or_default(cli.config.clone()).context("Configuration error")?;
    let data_dir = cli.data_dir.as_ref();

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Check => {
            let source = open_source(&config, data_dir)?;
            print_json(&json!({
                "config_found": Config::exists(cli.config.as_ref()),
                "backend": source.name(),
                "farm_records": source.farm_records().len(),
                "market_records": source.market_records().len(),
                "crop_types": source.crop_types(),
                "products": source.products(),
            }))
        }
        Commands::Ask {
            query,
            farm_id,
            product,
        } => {
            let source = open_source(&config, data_dir)?;
            let agents: Vec<Box<dyn AdvisoryAgent>> = vec![
                Box::new(FarmerAdvisor::new("FarmerAdvisor", Arc::clone(&source))),
                Box::new(MarketResearcher::new("MarketResearcher", source)),
            ];
            let coordinator = Coordinator::new(agents, config.coordinator.weights.clone());

            let mut q = AgentQuery::new(query);
            q.farm_id = farm_id;
            q.product = product;

            let responses = coordinator.collect_recommendations(&q);
            let resolved = coordinator.resolve_conflicts(&responses);
            print_json(&json!({ "responses": responses, "resolved": resolved }))
        }
        Commands::Decide { query } => {
            let source = open_source(&config, data_dir)?;
            print_json(&DecisionEngine::new(source).run(&query))
        }
        Commands::Rotation {
            crop,
            nitrogen,
            phosphorus,
            potassium,
            years,
        } => {
            let planner = RotationPlanner::new();
            let soil = if nitrogen.is_some() || phosphorus.is_some() || potassium.is_some() {
                Some(SoilHealth::new(
                    nitrogen.unwrap_or(0),
                    phosphorus.unwrap_or(0),
                    potassium.unwrap_or(0),
                ))
            } else {
                None
            };
            let plan = planner.suggest_rotation(&crop, soil.as_ref(), usize::from(years));
            let text = planner.format_rotation_plan(&crop, &plan);
            print_json(&json!({
                "crop": crop,
                "family": planner.family_of(&crop),
                "soil_health": soil,
                "rotation_plan": plan,
                "formatted": text,
            }))
        }
        Commands::Weather {
            location,
            history,
            forecast,
        } => {
            let weather = simulator(&config);
            print_json(&json!({
                "historical": weather.get_historical_weather(&location, history),
                "forecast": weather.get_weather_forecast(&location, forecast),
            }))
        }
        Commands::Yield {
            crop,
            location,
            fields,
        } => {
            let source = open_source(&config, data_dir)?;
            let fields = parse_fields(&fields)?;
            let predictor = predictor(&config, data_dir, source)?;

            let location = location.or_else(|| config.weather.default_location.clone());
            let impact = location.map(|loc| {
                let weather = simulator(&config);
                weather.calculate_yield_impact(&crop, &loc, weather.today())
            });
            let factor = impact.as_ref().map_or(1.0, |i| i.impact_factor);

            let result = predictor.predict_yield(&crop, &fields, factor).and_then(|prediction| {
                let management = predictor.evaluate_management_practices(&crop, &fields)?;
                Ok((prediction, management))
            });
            match result {
                Ok((prediction, management)) => print_json(&json!({
                    "crop": crop,
                    "weather_impact": impact,
                    "prediction": prediction,
                    "management": management,
                    "feature_importance": predictor.feature_importance(&crop),
                })),
                Err(CropwiseError::InvalidData(msg)) => print_json(&json!({ "error": msg })),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Recommend {
            ph,
            location,
            fields,
        } => {
            let source = open_source(&config, data_dir)?;
            let predictor = predictor(&config, data_dir, Arc::clone(&source))?;
            let pipeline =
                RecommendationPipeline::new(source, Arc::new(simulator(&config)), Arc::new(predictor));

            let profile = FarmProfile {
                soil_ph: ph,
                location,
                planting_date: None,
                fields: parse_fields(&fields)?,
            };
            match pipeline.recommend(&profile) {
                Ok(report) => print_json(&report),
                Err(CropwiseError::InvalidData(msg)) => print_json(&json!({ "error": msg })),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Import => {
            let csv = CsvDataSource::load(&config.data.farm_csv, &config.data.market_csv)?;
            let db_path = config.db_path(data_dir)?;
            let db = Database::open(&db_path)?;

            db.clear_datasets()?;
            let farms = db.insert_farm_records(csv.farm_records())?;
            let markets = db.insert_market_records(csv.market_records())?;
            tracing::info!(farms, markets, path = %db_path.display(), "Imported datasets");

            print_json(&json!({
                "database": db_path,
                "farm_records": farms,
                "market_records": markets,
            }))
        }
    }
}

fn open_source(config: &Config, data_dir: Option<&PathBuf>) -> Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match config.data.backend {
        DataBackend::Csv => Arc::new(
            CsvDataSource::load(&config.data.farm_csv, &config.data.market_csv)
                .context("Failed to load CSV datasets")?,
        ),
        DataBackend::Sqlite => {
            let db = Database::open(&config.db_path(data_dir)?)?;
            Arc::new(SqliteDataSource::load(&db)?)
        }
    };
    Ok(source)
}

fn simulator(config: &Config) -> WeatherSimulator {
    let weather = WeatherSimulator::new(config.weather.seed);
    match config.weather.anchor_date {
        Some(anchor) => weather.with_anchor(anchor),
        None => weather,
    }
}

fn predictor(
    config: &Config,
    data_dir: Option<&PathBuf>,
    source: Arc<dyn DataSource>,
) -> Result<YieldPredictor> {
    let models_dir = config.models_dir(data_dir)?;
    Ok(YieldPredictor::new(source, &config.yield_model).with_models_dir(models_dir))
}

/// Parse `name=value` pairs.
fn parse_fields(pairs: &[String]) -> Result<FieldData> {
    let mut fields = FieldData::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Expected name=value, got '{}'", pair);
        };
        fields.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(fields)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
