use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Longest rotation plan the CLI will build.
pub const MAX_ROTATION_YEARS: i64 = 50;

#[derive(Parser)]
#[command(name = "cropwise", version, about = "Crop recommendations from farm, market and weather data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override data directory (SQLite database and trained models)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run interactive setup
    Init,
    /// Validate config and count records in the data source
    Check,
    /// Ask every advisory agent and merge their scores
    Ask {
        query: String,
        #[arg(long)]
        farm_id: Option<i64>,
        #[arg(long)]
        product: Option<String>,
    },
    /// Rank crops near a soil pH, e.g. "pH 6.5"
    Decide { query: String },
    /// Plan a crop rotation
    Rotation {
        crop: String,
        /// Signed nitrogen level (negative = deficient)
        #[arg(long, allow_hyphen_values = true)]
        nitrogen: Option<i32>,
        #[arg(long, allow_hyphen_values = true)]
        phosphorus: Option<i32>,
        #[arg(long, allow_hyphen_values = true)]
        potassium: Option<i32>,
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(0..=MAX_ROTATION_YEARS))]
        years: u16,
    },
    /// Simulated weather history and forecast for a location
    Weather {
        location: String,
        #[arg(long, default_value_t = 12)]
        history: u32,
        #[arg(long, default_value_t = 3)]
        forecast: u32,
    },
    /// Predict yield and management advice for a crop
    Yield {
        crop: String,
        /// Location for the weather impact factor
        #[arg(long)]
        location: Option<String>,
        /// Field values as name=value (e.g. soil_ph=6.5 rainfall=900)
        fields: Vec<String>,
    },
    /// Full recommendation report for a farm
    Recommend {
        #[arg(long)]
        ph: f64,
        #[arg(long)]
        location: String,
        /// Field values as name=value
        fields: Vec<String>,
    },
    /// Copy the configured CSV datasets into the SQLite database
    Import,
}
