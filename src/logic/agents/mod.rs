pub mod farmer_advisor;
pub mod market_researcher;

pub use farmer_advisor::FarmerAdvisor;
pub use market_researcher::MarketResearcher;

use crate::models::{AgentQuery, AgentResponse};

/// An agent that answers a query with a structured response.
pub trait AdvisoryAgent: Send + Sync {
    /// Unique name, also used as the coordinator result key
    fn name(&self) -> &str;

    /// Classify the query by keyword and build the matching response.
    fn process_message(&self, query: &AgentQuery) -> AgentResponse;

    /// Span entered for every `run`.
    fn span(&self) -> Option<&tracing::Span> {
        None
    }

    /// Handle a query. `None` means the agent has nothing to contribute and
    /// is left out of coordinator results.
    fn run(&self, query: &AgentQuery) -> Option<AgentResponse> {
        let _entered = self.span().map(|span| span.enter());
        tracing::info!(agent = self.name(), query = %query.text, "Processing query");
        let response = self.process_message(query);
        tracing::debug!(agent = self.name(), kind = %response.kind, "Query handled");
        Some(response)
    }
}

/// Mean of `values` grouped by key, in first-seen key order.
pub(crate) fn grouped_means<'a, I>(items: I) -> Vec<(String, f64, usize)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for (key, value) in items {
        match groups.iter_mut().find(|(k, _, _)| k == key) {
            Some((_, sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => groups.push((key.to_string(), value, 1)),
        }
    }
    groups
        .into_iter()
        .map(|(k, sum, count)| (k, sum / count as f64, count))
        .collect()
}

/// Stable descending sort on an `f64` key; NaNs compare equal.
pub(crate) fn sort_desc_by<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
