use super::{grouped_means, sort_desc_by, AdvisoryAgent};
use crate::datasources::DataSource;
use crate::models::{
    AgentQuery, AgentResponse, MarketRecord, PriceDetails, ProductScore, ResponseKind,
    ResponsePayload,
};
use std::sync::Arc;

const TOP_N: usize = 3;
/// Demand/supply ratio beyond which a market counts as strongly skewed.
const SKEW_RATIO: f64 = 1.2;

/// Reads market records for price, demand and supply signals.
pub struct MarketResearcher {
    name: String,
    source: Arc<dyn DataSource>,
    span: tracing::Span,
}

impl MarketResearcher {
    pub fn new(name: impl Into<String>, source: Arc<dyn DataSource>) -> Self {
        let name = name.into();
        let span = tracing::info_span!("agent", agent = %name);
        tracing::info!(agent = %name, markets = source.market_records().len(), "Initialized market researcher");
        Self { name, source, span }
    }

    pub fn analyze_market_trends(&self) -> AgentResponse {
        let records = self.source.market_records();

        let mut trends = grouped_means(records.iter().map(|m| (m.product.as_str(), m.trend_score())));
        sort_desc_by(&mut trends, |(_, score, _)| *score);
        let top_products: Vec<ProductScore> = trends
            .into_iter()
            .take(TOP_N)
            .map(|(product, score, _)| ProductScore { product, score })
            .collect();

        let demand = grouped_means(records.iter().map(|m| (m.product.as_str(), m.demand_index)));
        let supply = grouped_means(records.iter().map(|m| (m.product.as_str(), m.supply_index)));
        let mut opportunities: Vec<ProductScore> = demand
            .into_iter()
            .zip(supply)
            .filter(|((_, d, _), (_, s, _))| d > s)
            .map(|((product, d, _), (_, s, _))| ProductScore {
                product,
                score: d - s,
            })
            .collect();
        sort_desc_by(&mut opportunities, |p| p.score);
        opportunities.truncate(TOP_N);

        let response = format!(
            "[{}] Market Trends: Top products by price and demand are {}. Opportunities where demand exceeds supply: {}.",
            self.name,
            join_products(&top_products),
            if opportunities.is_empty() {
                "none identified".to_string()
            } else {
                join_products(&opportunities)
            }
        );

        let mut resp = AgentResponse::new(&self.name, ResponseKind::MarketTrend, response);
        if let Some(best) = top_products.first() {
            resp = resp.with_score("economic", best.score);
        }
        resp.with_payload(ResponsePayload::MarketTrend {
            top_products,
            opportunities,
        })
    }

    pub fn recommend_profitable_crops(&self) -> AgentResponse {
        let records = self.source.market_records();
        let mut ranked = grouped_means(records.iter().map(|m| (m.product.as_str(), m.profitability())));
        sort_desc_by(&mut ranked, |(_, score, _)| *score);

        let detailed: Vec<ProductScore> = ranked
            .into_iter()
            .take(TOP_N)
            .map(|(product, score, _)| ProductScore { product, score })
            .collect();
        let profitable: Vec<String> = detailed.iter().map(|p| p.product.clone()).collect();

        let response = if profitable.is_empty() {
            format!("[{}] No market data available to rank crops by profitability.", self.name)
        } else {
            format!(
                "[{}] Most profitable crops based on current market conditions: {}.",
                self.name,
                profitable.join(", ")
            )
        };

        let mut resp = AgentResponse::new(&self.name, ResponseKind::ProfitableCrops, response);
        if let Some(best) = detailed.first() {
            resp = resp.with_score("economic", best.score);
        }
        resp.with_payload(ResponsePayload::ProfitableCrops {
            profitable_crops: profitable,
            detailed,
        })
    }

    pub fn get_price_forecast(&self, product: &str) -> AgentResponse {
        let records = self.source.markets_for_product(product);
        if records.is_empty() {
            tracing::warn!(product, "No market records for product");
            return AgentResponse::new(
                &self.name,
                ResponseKind::PriceForecast,
                format!("[{}] No market data available for {}.", self.name, product),
            )
            .with_payload(ResponsePayload::PriceForecast {
                product: Some(product.to_string()),
                details: None,
            });
        }

        let details = price_details(&records);
        let response = format!(
            "[{}] Price forecast for {}: average ${:.2}/ton (range ${:.2} - ${:.2}). Market condition: {}. Outlook: {}.",
            self.name,
            product,
            details.avg_price,
            details.min_price,
            details.max_price,
            details.market_condition,
            details.outlook
        );
        let profitability =
            records.iter().map(|m| m.profitability()).sum::<f64>() / records.len() as f64;

        AgentResponse::new(&self.name, ResponseKind::PriceForecast, response)
            .with_payload(ResponsePayload::PriceForecast {
                product: Some(product.to_string()),
                details: Some(details),
            })
            .with_score("economic", profitability)
    }

    /// Structured product wins; otherwise the first word of the text that
    /// names a known product. Both match known products case-insensitively.
    fn resolve_product(&self, query: &AgentQuery) -> Option<String> {
        let products = self.source.products();
        let known = |name: &str| {
            products
                .iter()
                .find(|p| p.eq_ignore_ascii_case(name.trim()))
                .cloned()
        };

        if let Some(product) = &query.product {
            return Some(known(product.as_str()).unwrap_or_else(|| product.clone()));
        }
        query
            .text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .find_map(known)
    }
}

fn price_details(records: &[&MarketRecord]) -> PriceDetails {
    let n = records.len() as f64;
    let avg_price = records.iter().map(|m| m.market_price_per_ton).sum::<f64>() / n;
    let min_price = records
        .iter()
        .map(|m| m.market_price_per_ton)
        .fold(f64::INFINITY, f64::min);
    let max_price = records
        .iter()
        .map(|m| m.market_price_per_ton)
        .fold(f64::NEG_INFINITY, f64::max);
    let avg_demand = records.iter().map(|m| m.demand_index).sum::<f64>() / n;
    let avg_supply = records.iter().map(|m| m.supply_index).sum::<f64>() / n;

    let (market_condition, outlook) = classify_market(avg_demand, avg_supply);

    PriceDetails {
        avg_price,
        min_price,
        max_price,
        avg_demand,
        avg_supply,
        market_condition: market_condition.to_string(),
        outlook: outlook.to_string(),
    }
}

/// Market condition and outlook, checked strongest signal first.
fn classify_market(demand: f64, supply: f64) -> (&'static str, &'static str) {
    if demand > SKEW_RATIO * supply {
        ("high demand, limited supply", "very favorable")
    } else if demand > supply {
        ("demand exceeds supply", "favorable")
    } else if supply > SKEW_RATIO * demand {
        ("oversupplied", "challenging")
    } else {
        ("balanced", "stable")
    }
}

fn join_products(items: &[ProductScore]) -> String {
    items
        .iter()
        .map(|p| p.product.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AdvisoryAgent for MarketResearcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn span(&self) -> Option<&tracing::Span> {
        Some(&self.span)
    }

    fn process_message(&self, query: &AgentQuery) -> AgentResponse {
        if query.mentions("trend") {
            self.analyze_market_trends()
        } else if query.mentions("profitable") {
            self.recommend_profitable_crops()
        } else if query.mentions("price") {
            match self.resolve_product(query) {
                Some(product) => self.get_price_forecast(&product),
                None => AgentResponse::new(
                    &self.name,
                    ResponseKind::PriceForecast,
                    format!("[{}] Please name a product to forecast prices for.", self.name),
                )
                .with_payload(ResponsePayload::PriceForecast {
                    product: None,
                    details: None,
                }),
            }
        } else {
            AgentResponse::new(
                &self.name,
                ResponseKind::Info,
                "I can analyze market trends, rank profitable crops and forecast prices.",
            )
        }
    }
}
