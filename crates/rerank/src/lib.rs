//! Scoring and ranking of catalog products for a customer.
//!
//! `score_match` is the additive customer/product compatibility score;
//! `rank_catalog` applies it across the catalog. The `next_step` module ranks
//! unseen products from learned preferences.

pub mod next_step;

use std::collections::HashSet;

use lingxi_explain::match_reason;
use lingxi_model::{Category, Customer, Level, Product, Strength};
use serde::{Deserialize, Serialize};

pub use next_step::{
    plan_next_step, recommend_next, NextStepAnalysis, NextStepConfig, NextStepPlan,
    Recommendation, RecommendationBasis,
};

/// Configuration for the match scorer.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Starting score
    pub base: i32,
    /// Customer age inside the target range
    pub age_match_bonus: i32,
    /// Customer age outside the target range (subtracted)
    pub age_mismatch_penalty: i32,
    /// Preference type equals the product's preference tag
    pub preference_bonus: i32,
    /// Low-risk customer, product risk level <= 2
    pub low_risk_bonus: i32,
    /// Medium-risk customer, product risk level <= 3
    pub medium_risk_bonus: i32,
    /// High-risk customer, product risk level >= 3
    pub high_risk_bonus: i32,
    /// Asset tier matches the product's minimum amount
    pub wealth_bonus: i32,
    /// High-value customer, product risk level <= 2
    pub high_value_bonus: i32,
    /// Senior customer, savings product
    pub senior_savings_bonus: i32,
    /// Young customer, wealth product
    pub young_wealth_bonus: i32,
    /// Assets above this are high-asset, below are low-asset
    pub high_asset_threshold: f64,
    /// Minimum amounts above this are "large"
    pub large_amount_above: f64,
    /// Minimum amounts below this are "small"
    pub small_amount_below: f64,
    pub senior_age: u32,
    pub young_age_below: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            base: 50,
            age_match_bonus: 20,
            age_mismatch_penalty: 10,
            preference_bonus: 25,
            low_risk_bonus: 15,
            medium_risk_bonus: 10,
            high_risk_bonus: 15,
            wealth_bonus: 10,
            high_value_bonus: 10,
            senior_savings_bonus: 15,
            young_wealth_bonus: 10,
            high_asset_threshold: 1_000_000.0,
            large_amount_above: 100_000.0,
            small_amount_below: 50_000.0,
            senior_age: 60,
            young_age_below: 40,
        }
    }
}

/// A product with its match score for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    pub match_score: u8,
    pub match_reason: String,
    pub recommendation_strength: Strength,
}

/// Compute the 0-100 compatibility score. Pure and deterministic.
pub fn score_match(customer: &Customer, product: &Product, config: &MatchConfig) -> u8 {
    let mut score = config.base;
    let target = &product.target_profile;
    let risk = customer.risk_profile.overall_risk;

    // Age
    if target.age.contains(customer.age) {
        score += config.age_match_bonus;
    } else {
        score -= config.age_mismatch_penalty;
    }

    // Preference type
    if customer.risk_profile.preference_type.as_str() == target.product_preference {
        score += config.preference_bonus;
    }

    // Risk alignment
    match risk {
        Level::Low if product.risk_level <= 2 => score += config.low_risk_bonus,
        Level::Medium if product.risk_level <= 3 => score += config.medium_risk_bonus,
        Level::High if product.risk_level >= 3 => score += config.high_risk_bonus,
        _ => {}
    }

    // Wealth alignment
    let high_asset = customer.assets > config.high_asset_threshold;
    let low_asset = customer.assets < config.high_asset_threshold;
    if high_asset && product.min_amount > config.large_amount_above {
        score += config.wealth_bonus;
    }
    if low_asset && product.min_amount < config.small_amount_below {
        score += config.wealth_bonus;
    }

    // Demographic bonuses
    if customer.high_value && product.risk_level <= 2 {
        score += config.high_value_bonus;
    }
    if customer.age >= config.senior_age && product.category == Category::Savings {
        score += config.senior_savings_bonus;
    }
    if customer.age < config.young_age_below && product.category == Category::Wealth {
        score += config.young_wealth_bonus;
    }

    score.clamp(0, 100) as u8
}

/// Score every product not in `exclude` and return the best `limit`.
///
/// Ties keep catalog order, so the result is stable across calls.
pub fn rank_catalog(
    customer: &Customer,
    products: &[Product],
    exclude: &HashSet<String>,
    limit: usize,
    config: &MatchConfig,
) -> Vec<ScoredProduct> {
    let mut scored: Vec<ScoredProduct> = products
        .iter()
        .filter(|p| !exclude.contains(&p.id))
        .map(|product| {
            let score = score_match(customer, product, config);
            tracing::debug!(
                customer_id = %customer.id,
                product_id = %product.id,
                score,
                "Scored product"
            );
            ScoredProduct {
                product: product.clone(),
                match_score: score,
                match_reason: match_reason(customer, product, score),
                recommendation_strength: Strength::from_score(score),
            }
        })
        .collect();

    // Sort by match score descending
    scored.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    scored.truncate(limit);

    scored
}
