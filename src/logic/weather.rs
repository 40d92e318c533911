use crate::models::{SeriesKind, WeatherPoint, WeatherSeries, YieldImpact};
use chrono::{Datelike, Months, NaiveDate};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Baseline climate for a simulated weather station.
#[derive(Debug, Clone, Copy)]
pub struct Station {
    pub name: &'static str,
    pub base_temp_c: f64,
    pub base_rainfall_mm: f64,
    pub base_humidity_pct: f64,
    pub season_amplitude: f64,
}

/// First entry is the fallback for unknown locations.
pub const STATIONS: &[Station] = &[
    Station { name: "Karimnagar", base_temp_c: 28.0, base_rainfall_mm: 900.0, base_humidity_pct: 65.0, season_amplitude: 6.0 },
    Station { name: "Warangal", base_temp_c: 29.0, base_rainfall_mm: 850.0, base_humidity_pct: 62.0, season_amplitude: 7.0 },
    Station { name: "Nizamabad", base_temp_c: 27.0, base_rainfall_mm: 950.0, base_humidity_pct: 68.0, season_amplitude: 5.0 },
    Station { name: "Adilabad", base_temp_c: 26.0, base_rainfall_mm: 1000.0, base_humidity_pct: 70.0, season_amplitude: 8.0 },
    Station { name: "Khammam", base_temp_c: 30.0, base_rainfall_mm: 800.0, base_humidity_pct: 60.0, season_amplitude: 7.0 },
];

/// How strongly a crop reacts to deviation on each axis, and where it grows best.
#[derive(Debug, Clone, Copy)]
struct CropClimate {
    crop: &'static str,
    temp_sensitivity: f64,
    rainfall_sensitivity: f64,
    humidity_sensitivity: f64,
    temp_c: (f64, f64),
    rainfall_mm: (f64, f64),
    humidity_pct: (f64, f64),
}

const CROP_CLIMATES: &[CropClimate] = &[
    CropClimate { crop: "Rice", temp_sensitivity: 0.8, rainfall_sensitivity: 1.0, humidity_sensitivity: 0.7, temp_c: (24.0, 30.0), rainfall_mm: (1000.0, 1500.0), humidity_pct: (70.0, 85.0) },
    CropClimate { crop: "Wheat", temp_sensitivity: 0.9, rainfall_sensitivity: 0.7, humidity_sensitivity: 0.5, temp_c: (15.0, 24.0), rainfall_mm: (750.0, 900.0), humidity_pct: (50.0, 70.0) },
    CropClimate { crop: "Corn", temp_sensitivity: 0.7, rainfall_sensitivity: 0.8, humidity_sensitivity: 0.6, temp_c: (20.0, 28.0), rainfall_mm: (800.0, 1100.0), humidity_pct: (60.0, 75.0) },
    CropClimate { crop: "Cotton", temp_sensitivity: 0.6, rainfall_sensitivity: 0.9, humidity_sensitivity: 0.4, temp_c: (25.0, 35.0), rainfall_mm: (700.0, 1000.0), humidity_pct: (50.0, 65.0) },
    CropClimate { crop: "Chickpea", temp_sensitivity: 0.8, rainfall_sensitivity: 0.6, humidity_sensitivity: 0.5, temp_c: (18.0, 26.0), rainfall_mm: (600.0, 800.0), humidity_pct: (40.0, 60.0) },
    CropClimate { crop: "Soybean", temp_sensitivity: 0.7, rainfall_sensitivity: 0.8, humidity_sensitivity: 0.6, temp_c: (22.0, 30.0), rainfall_mm: (800.0, 1200.0), humidity_pct: (55.0, 70.0) },
];

const TEMP_NOISE_SD: f64 = 1.5;
const RAINFALL_NOISE_SD: f64 = 50.0;
const HUMIDITY_NOISE_SD: f64 = 5.0;
const UNCERTAINTY_STEP: f64 = 0.2;

const GROWING_SEASON_MONTHS: u32 = 4;
/// Relative deviation that earns a line in the impact explanation.
const NOTABLE_DEVIATION: f64 = 0.1;
const IMPACT_MIN: f64 = 0.5;
const IMPACT_MAX: f64 = 1.5;

/// Seeded synthetic monthly weather for a fixed set of stations.
///
/// Every call draws from one shared generator, so a fresh simulator with the
/// same seed and anchor replays the same sequence of series.
pub struct WeatherSimulator {
    rng: Mutex<StdRng>,
    anchor: Option<NaiveDate>,
}

impl WeatherSimulator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            anchor: None,
        }
    }

    /// Fix "today" instead of reading the clock.
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.anchor
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Station by case-insensitive name, falling back to the first station.
    pub fn station(&self, location: &str) -> &'static Station {
        match STATIONS
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(location.trim()))
        {
            Some(station) => station,
            None => {
                tracing::warn!(location, fallback = STATIONS[0].name, "Unknown location, using default weather patterns");
                &STATIONS[0]
            }
        }
    }

    /// Monthly points from `months_back` months ago through the current month.
    pub fn get_historical_weather(&self, location: &str, months_back: u32) -> WeatherSeries {
        let station = self.station(location);
        let end = first_of_month(self.today());
        let start = end.checked_sub_months(Months::new(months_back)).unwrap_or(end);

        let mut series = WeatherSeries::new(station.name, SeriesKind::Historical);
        let mut rng = self.rng.lock();
        for k in 0..=months_back {
            let Some(date) = start.checked_add_months(Months::new(k)) else {
                break;
            };
            series.push(simulate(&mut rng, station, date, 1.0, None));
        }
        series
    }

    /// `months_ahead` monthly points starting the month after today.
    pub fn get_weather_forecast(&self, location: &str, months_ahead: u32) -> WeatherSeries {
        let station = self.station(location);
        self.forecast_from(station, self.today(), months_ahead)
    }

    fn forecast_from(&self, station: &Station, from: NaiveDate, months_ahead: u32) -> WeatherSeries {
        let base = first_of_month(from);
        let mut series = WeatherSeries::new(station.name, SeriesKind::Forecast);
        let mut rng = self.rng.lock();
        for i in 0..months_ahead {
            let Some(date) = base.checked_add_months(Months::new(i + 1)) else {
                break;
            };
            let uncertainty = 1.0 + f64::from(i) * UNCERTAINTY_STEP;
            let confidence = forecast_confidence(i);
            series.push(simulate(&mut rng, station, date, uncertainty, Some(confidence)));
        }
        series
    }

    /// Expected weather multiplier on yield over the four months after planting.
    pub fn calculate_yield_impact(&self, crop: &str, location: &str, planting_date: NaiveDate) -> YieldImpact {
        let Some(climate) = CROP_CLIMATES
            .iter()
            .find(|c| c.crop.eq_ignore_ascii_case(crop.trim()))
        else {
            tracing::warn!(crop, "Unknown crop, cannot calculate yield impact");
            return YieldImpact::neutral("No weather impact data available for this crop.");
        };

        let station = self.station(location);
        let forecast = self.forecast_from(station, planting_date, GROWING_SEASON_MONTHS);

        let avg_temp = forecast.mean_temperature().unwrap_or(station.base_temp_c);
        let season_rainfall = forecast.mean_rainfall().unwrap_or(station.base_rainfall_mm)
            * f64::from(GROWING_SEASON_MONTHS);
        let avg_humidity = forecast.mean_humidity().unwrap_or(station.base_humidity_pct);

        let temp_dev = deviation(avg_temp, climate.temp_c);
        let rain_dev = deviation(season_rainfall, climate.rainfall_mm);
        let humidity_dev = deviation(avg_humidity, climate.humidity_pct);

        let combined = ((1.0 - temp_dev.abs() * climate.temp_sensitivity)
            + (1.0 - rain_dev.abs() * climate.rainfall_sensitivity)
            + (1.0 - humidity_dev.abs() * climate.humidity_sensitivity))
            / 3.0;
        let jitter: f64 = self.rng.lock().gen_range(0.95..1.05);
        let impact = (combined * jitter).clamp(IMPACT_MIN, IMPACT_MAX);

        let mut notes = Vec::new();
        if let Some(note) = describe(temp_dev, "Temperature", "colder", "warmer", format!("{:.1}°C", avg_temp)) {
            notes.push(note);
        }
        if let Some(note) = describe(rain_dev, "Rainfall", "lower", "higher", format!("{:.0}mm", season_rainfall)) {
            notes.push(note);
        }
        if let Some(note) = describe(humidity_dev, "Humidity", "lower", "higher", format!("{:.0}%", avg_humidity)) {
            notes.push(note);
        }
        if notes.is_empty() {
            notes.push("Weather conditions are near optimal for this crop".to_string());
        }

        let outlook = if impact < 0.95 {
            "reduced"
        } else if impact > 1.05 {
            "increased"
        } else {
            "normal"
        };

        tracing::debug!(crop = climate.crop, location = station.name, impact, "Computed weather impact");

        YieldImpact {
            impact_factor: round_to(impact, 2),
            explanation: notes.join(". "),
            forecast_summary: Some(format!(
                "Expected {} yield based on {} weather forecast.",
                outlook, station.name
            )),
        }
    }
}

/// Forecast confidence for the `i`th month ahead, in percent.
pub fn forecast_confidence(i: u32) -> f64 {
    (100.0 - 20.0 * f64::from(i)).max(20.0)
}

/// Peaks mid-year, bottoms out at the turn of the year.
fn season_factor(month: u32) -> f64 {
    (PI * (f64::from(month) - 3.0) / 6.0).sin()
}

fn simulate(
    rng: &mut StdRng,
    station: &Station,
    date: NaiveDate,
    uncertainty: f64,
    confidence: Option<f64>,
) -> WeatherPoint {
    let factor = season_factor(date.month());
    let temp = station.base_temp_c
        + station.season_amplitude * factor
        + gaussian(rng, TEMP_NOISE_SD * uncertainty);
    let rainfall = (station.base_rainfall_mm * (1.0 + 0.3 * factor)
        + gaussian(rng, RAINFALL_NOISE_SD * uncertainty))
    .max(0.0);
    let humidity = (station.base_humidity_pct
        + 10.0 * factor
        + gaussian(rng, HUMIDITY_NOISE_SD * uncertainty))
    .clamp(10.0, 100.0);

    WeatherPoint {
        date,
        location: station.name.to_string(),
        temperature_c: round_to(temp, 1),
        rainfall_mm: rainfall.round(),
        humidity_pct: humidity.round(),
        confidence,
    }
}

fn gaussian(rng: &mut StdRng, sd: f64) -> f64 {
    Normal::new(0.0, sd).map(|n| n.sample(rng)).unwrap_or(0.0)
}

/// Signed deviation relative to whichever bound was crossed; 0 inside the range.
fn deviation(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if value < lo {
        (value - lo) / lo
    } else if value > hi {
        (value - hi) / hi
    } else {
        0.0
    }
}

fn describe(dev: f64, axis: &str, below: &str, above: &str, reading: String) -> Option<String> {
    if dev < -NOTABLE_DEVIATION {
        Some(format!("{} is expected to be {} than optimal ({})", axis, below, reading))
    } else if dev > NOTABLE_DEVIATION {
        Some(format!("{} is expected to be {} than optimal ({})", axis, above, reading))
    } else {
        None
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
