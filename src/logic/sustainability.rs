use crate::models::FarmRecord;

const IDEAL_PH: f64 = 6.5;
const IDEAL_MOISTURE: f64 = 25.0;
const IDEAL_TEMP_C: f64 = 30.0;
const IDEAL_RAINFALL_MM: f64 = 100.0;

/// Points available per dimension.
const TERM_WEIGHT: f64 = 25.0;

/// 0-100 composite of how close pH, moisture, temperature and rainfall are
/// to fixed ideals.
///
/// Each term is `(1 - |actual - ideal| / ideal) * 25` and may go negative;
/// only the sum is clamped.
pub fn sustainability_score(soil_ph: f64, soil_moisture: f64, temperature_c: f64, rainfall_mm: f64) -> f64 {
    let total = term(soil_ph, IDEAL_PH)
        + term(soil_moisture, IDEAL_MOISTURE)
        + term(temperature_c, IDEAL_TEMP_C)
        + term(rainfall_mm, IDEAL_RAINFALL_MM);
    total.clamp(0.0, 100.0)
}

pub fn score_record(record: &FarmRecord) -> f64 {
    sustainability_score(
        record.soil_ph,
        record.soil_moisture,
        record.temperature_c,
        record.rainfall_mm,
    )
}

fn term(actual: f64, ideal: f64) -> f64 {
    (1.0 - (actual - ideal).abs() / ideal) * TERM_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ideal_conditions_score_100() {
        assert_eq!(sustainability_score(6.5, 25.0, 30.0, 100.0), 100.0);
    }

    #[test]
    fn negative_term_pulls_down_total_before_clamp() {
        // Rainfall 300mm gives a -25 term; the other three are perfect.
        let score = sustainability_score(6.5, 25.0, 30.0, 300.0);
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn clamps_at_zero() {
        assert_eq!(sustainability_score(20.0, 200.0, 120.0, 2000.0), 0.0);
    }

    #[test]
    fn half_deviation_costs_half_a_term() {
        let score = sustainability_score(6.5, 25.0, 30.0, 50.0);
        assert!((score - 87.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn score_is_bounded(
            ph in -20.0f64..40.0,
            moisture in -100.0f64..500.0,
            temp in -60.0f64..80.0,
            rain in -100.0f64..5000.0,
        ) {
            let s = sustainability_score(ph, moisture, temp, rain);
            prop_assert!((0.0..=100.0).contains(&s));
            prop_assert_eq!(s, sustainability_score(ph, moisture, temp, rain));
        }
    }
}
