use super::agents::AdvisoryAgent;
use crate::models::{AgentQuery, AgentResponse};
use std::collections::BTreeMap;

/// Field name to weight. Fields missing from the table weigh 1.
pub type CoordinatorWeights = BTreeMap<String, f64>;

/// Fans a query out to every registered agent and merges their numbers.
pub struct Coordinator {
    agents: Vec<Box<dyn AdvisoryAgent>>,
    weights: CoordinatorWeights,
}

impl Coordinator {
    pub fn new(agents: Vec<Box<dyn AdvisoryAgent>>, weights: CoordinatorWeights) -> Self {
        Self { agents, weights }
    }

    /// Run every agent in registration order. Agents returning `None` are
    /// left out.
    pub fn collect_recommendations(&self, query: &AgentQuery) -> BTreeMap<String, AgentResponse> {
        let mut results = BTreeMap::new();
        for agent in &self.agents {
            match agent.run(query) {
                Some(response) => {
                    results.insert(agent.name().to_string(), response);
                }
                None => tracing::debug!(agent = agent.name(), "Agent returned no response"),
            }
        }
        results
    }

    /// Weighted sum of every numeric field across all responses.
    ///
    /// Not normalised: two agents reporting the same field both contribute.
    pub fn resolve_conflicts(
        &self,
        recommendations: &BTreeMap<String, AgentResponse>,
    ) -> BTreeMap<String, f64> {
        let mut scores: BTreeMap<String, f64> = BTreeMap::new();
        for response in recommendations.values() {
            for (field, value) in response.numeric_fields() {
                let weight = self.weight(&field);
                *scores.entry(field).or_insert(0.0) += value * weight;
            }
        }
        scores
    }

    pub fn weight(&self, field: &str) -> f64 {
        self.weights.get(field).copied().unwrap_or(1.0)
    }
}
