pub mod agents;
pub mod coordinator;
pub mod decision;
pub mod pipeline;
pub mod rotation;
pub mod sustainability;
pub mod weather;
pub mod yield_model;

pub use agents::{AdvisoryAgent, FarmerAdvisor, MarketResearcher};
pub use coordinator::{Coordinator, CoordinatorWeights};
pub use decision::{DecisionEngine, DecisionOutcome, RankedCrop};
pub use pipeline::{CropReport, FarmProfile, FarmReport, RecommendationPipeline};
pub use rotation::RotationPlanner;
pub use sustainability::sustainability_score;
pub use weather::WeatherSimulator;
pub use yield_model::YieldPredictor;
