pub mod predictor;
pub mod regression;
pub mod scaler;

pub use predictor::{normalize_fields, YieldPredictor, FEATURES};
pub use regression::RidgeRegression;
pub use scaler::StandardScaler;
