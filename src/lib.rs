//! Crop recommendations from farm and market datasets: advisory agents, a
//! sustainability-ranked decision engine, rotation planning, simulated weather
//! and per-crop yield models.

pub mod config;
pub mod datasources;
pub mod db;
pub mod error;
pub mod logic;
pub mod models;

pub use config::Config;
pub use error::{CropwiseError, Result};
