use crate::error::{CropwiseError, Result};
use chrono::NaiveDate;
use dialoguer::{Input, Select};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub yield_model: YieldModelConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataBackend {
    #[default]
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default)]
    pub backend: DataBackend,
    pub farm_csv: PathBuf,
    pub market_csv: PathBuf,
    /// Defaults to `<data dir>/cropwise.db` when unset.
    #[serde(default)]
    pub sqlite_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            backend: DataBackend::Csv,
            farm_csv: PathBuf::from("data/farmer_advisor_dataset.csv"),
            market_csv: PathBuf::from("data/market_researcher_dataset.csv"),
            sqlite_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoordinatorConfig {
    pub weights: BTreeMap<String, f64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert("economic".to_string(), 0.6);
        weights.insert("environmental".to_string(), 0.4);
        Self { weights }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fixes "today" for the simulator; the local date is used when unset.
    #[serde(default)]
    pub anchor_date: Option<NaiveDate>,
    #[serde(default)]
    pub default_location: Option<String>,
}

fn default_seed() -> u64 {
    42
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            anchor_date: None,
            default_location: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YieldModelConfig {
    /// Defaults to `<data dir>/models` when unset.
    #[serde(default)]
    pub models_dir: Option<PathBuf>,
    #[serde(default = "default_min_training_records")]
    pub min_training_records: usize,
    #[serde(default = "default_ridge_lambda")]
    pub ridge_lambda: f64,
}

fn default_min_training_records() -> usize {
    10
}

fn default_ridge_lambda() -> f64 {
    1.0
}

impl Default for YieldModelConfig {
    fn default() -> Self {
        Self {
            models_dir: None,
            min_training_records: default_min_training_records(),
            ridge_lambda: default_ridge_lambda(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(CropwiseError::Config(format!(
                "Config file not found at {:?}. Run `cropwise init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropwiseError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&config_str)
    }

    /// Parse YAML after substituting `${VAR}` references from the environment.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| CropwiseError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load the config if one can be found, otherwise fall back to defaults.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if Self::exists(config_override.as_ref()) {
            Self::load(config_override)
        } else {
            tracing::warn!("No configuration found - using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("cropwise").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/cropwise/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropwiseError::Config("Cannot determine config directory".into()))?
            .join("cropwise");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up Cropwise!");
        println!();

        println!("Data");
        let backends = ["csv", "sqlite"];
        let backend_idx = Select::new()
            .with_prompt("  Data backend")
            .items(&backends)
            .default(0)
            .interact()
            .map_err(|e| CropwiseError::Config(format!("Input error: {}", e)))?;
        let backend = if backend_idx == 0 {
            DataBackend::Csv
        } else {
            DataBackend::Sqlite
        };

        let farm_csv: String = Input::new()
            .with_prompt("  Farm dataset CSV")
            .default("data/farmer_advisor_dataset.csv".into())
            .interact_text()
            .map_err(|e| CropwiseError::Config(format!("Input error: {}", e)))?;

        let market_csv: String = Input::new()
            .with_prompt("  Market dataset CSV")
            .default("data/market_researcher_dataset.csv".into())
            .interact_text()
            .map_err(|e| CropwiseError::Config(format!("Input error: {}", e)))?;

        println!();
        println!("Coordinator weights");
        let economic: f64 = Input::new()
            .with_prompt("  economic")
            .default(0.6)
            .interact_text()
            .map_err(|e| CropwiseError::Config(format!("Input error: {}", e)))?;
        let environmental: f64 = Input::new()
            .with_prompt("  environmental")
            .default(0.4)
            .interact_text()
            .map_err(|e| CropwiseError::Config(format!("Input error: {}", e)))?;

        println!();
        println!("Weather simulation");
        let seed: u64 = Input::new()
            .with_prompt("  Random seed")
            .default(42)
            .interact_text()
            .map_err(|e| CropwiseError::Config(format!("Input error: {}", e)))?;

        println!();

        let mut weights = BTreeMap::new();
        weights.insert("economic".to_string(), economic);
        weights.insert("environmental".to_string(), environmental);

        let config = Config {
            data: DataConfig {
                backend,
                farm_csv: PathBuf::from(farm_csv),
                market_csv: PathBuf::from(market_csv),
                sqlite_path: None,
            },
            coordinator: CoordinatorConfig { weights },
            weather: WeatherConfig {
                seed,
                ..Default::default()
            },
            yield_model: YieldModelConfig::default(),
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)?;
        let content = format!(
            "# Cropwise Configuration\n# Generated by `cropwise init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("CROPWISE_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| CropwiseError::Config("Cannot determine data directory".into()))?
            .join("cropwise");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        match &self.data.sqlite_path {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::data_dir(data_dir_override)?.join("cropwise.db")),
        }
    }

    pub fn models_dir(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        match &self.yield_model.models_dir {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::data_dir(data_dir_override)?.join("models")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.data.backend, DataBackend::Csv);
        assert_eq!(config.coordinator.weights.get("economic"), Some(&0.6));
        assert_eq!(config.coordinator.weights.get("environmental"), Some(&0.4));
        assert_eq!(config.weather.seed, 42);
        assert_eq!(config.yield_model.min_training_records, 10);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = r#"
data:
  backend: sqlite
  farm_csv: farms.csv
  market_csv: markets.csv
weather:
  seed: 7
  anchor_date: 2024-06-15
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.data.backend, DataBackend::Sqlite);
        assert_eq!(config.weather.seed, 7);
        assert_eq!(
            config.weather.anchor_date,
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
        assert_eq!(config.yield_model.ridge_lambda, 1.0);
        assert_eq!(config.coordinator.weights.len(), 2);
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("CROPWISE_TEST_FARM_CSV", "/tmp/farms.csv");
        let yaml = r#"
data:
  farm_csv: ${CROPWISE_TEST_FARM_CSV}
  market_csv: markets.csv
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.data.farm_csv, PathBuf::from("/tmp/farms.csv"));
    }

    #[test]
    fn explicit_paths_win_over_data_dir() {
        let mut config = Config::default();
        config.data.sqlite_path = Some(PathBuf::from("/srv/agro.db"));
        config.yield_model.models_dir = Some(PathBuf::from("/srv/models"));
        assert_eq!(config.db_path(None).unwrap(), PathBuf::from("/srv/agro.db"));
        assert_eq!(config.models_dir(None).unwrap(), PathBuf::from("/srv/models"));
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = Config::load(Some(PathBuf::from("/nonexistent/cropwise.yaml"))).unwrap_err();
        assert!(matches!(err, CropwiseError::Config(_)));
    }
}
