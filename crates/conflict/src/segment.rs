//! Customer segmentation for a proposed product.

use lingxi_features::risk_score_distance;
use lingxi_model::{Category, Customer};
use serde::{Deserialize, Serialize};

use crate::{ConflictConfig, NewProduct};

const BASE_SCORE: u8 = 50;
const AGE_BONUS: u8 = 20;
const RISK_BONUS: u8 = 15;
const ASSET_BONUS: u8 = 15;
/// Assets must cover this many multiples of the minimum amount.
const ASSET_MULTIPLE: f64 = 5.0;
const RISK_DISTANCE_LIMIT: u32 = 25;

const HIGH_VALUE_ASSETS: f64 = 1_000_000.0;
const YOUNG_BELOW: u32 = 40;
const RETIREE_FROM: u32 = 60;
const RISK_AVERSE_BELOW: u8 = 40;
const RISK_SEEKING_ABOVE: u8 = 70;

/// Primary bucket of a matched customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerSegment {
    HighValue,
    YoungProfessional,
    Retiree,
    MassMarket,
}

impl CustomerSegment {
    fn of(customer: &Customer) -> Self {
        if customer.assets > HIGH_VALUE_ASSETS {
            Self::HighValue
        } else if customer.age < YOUNG_BELOW {
            Self::YoungProfessional
        } else if customer.age >= RETIREE_FROM {
            Self::Retiree
        } else {
            Self::MassMarket
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedCustomer {
    pub customer_id: String,
    pub score: u8,
    pub segment: CustomerSegment,
    pub reasons: Vec<String>,
}

/// Matched customer ids per segment. A customer can sit in several.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segments {
    pub high_value: Vec<String>,
    pub mass_market: Vec<String>,
    pub young_professionals: Vec<String>,
    pub retirees: Vec<String>,
    pub risk_averse: Vec<String>,
    pub risk_seeking: Vec<String>,
}

impl Segments {
    fn assign(&mut self, customer: &Customer) {
        let id = customer.id.clone();

        if customer.assets > HIGH_VALUE_ASSETS {
            self.high_value.push(id.clone());
        } else {
            self.mass_market.push(id.clone());
        }

        if customer.age < YOUNG_BELOW {
            self.young_professionals.push(id.clone());
        } else if customer.age >= RETIREE_FROM {
            self.retirees.push(id.clone());
        }

        let risk_score = customer.risk_profile.risk_score;
        if risk_score < RISK_AVERSE_BELOW {
            self.risk_averse.push(id);
        } else if risk_score > RISK_SEEKING_ABOVE {
            self.risk_seeking.push(id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segmentation {
    pub total_potential_customers: usize,
    /// Best first, capped
    pub matched_customers: Vec<MatchedCustomer>,
    pub segments: Segments,
    pub market_size: u64,
    pub penetration_rate: String,
}

/// Simplified fit of a customer to a proposed product, 50 to 100.
///
/// Uses only the age range, risk-score alignment and an asset check.
pub fn customer_fit_score(customer: &Customer, product: &NewProduct) -> u8 {
    let mut score = BASE_SCORE;

    if product.age_range().contains(customer.age) {
        score += AGE_BONUS;
    }
    let distance = risk_score_distance(customer.risk_profile.risk_score, product.risk_level());
    if distance < RISK_DISTANCE_LIMIT {
        score += RISK_BONUS;
    }
    if customer.assets >= product.min_amount() * ASSET_MULTIPLE {
        score += ASSET_BONUS;
    }

    score
}

fn match_reasons(customer: &Customer, product: &NewProduct) -> Vec<String> {
    let mut reasons = Vec::new();
    if product.age_range().contains(customer.age) {
        reasons.push("Age within target range".to_string());
    }
    if customer.assets >= product.min_amount() * 2.0 {
        reasons.push("Sufficient assets".to_string());
    }
    if risk_score_distance(customer.risk_profile.risk_score, product.risk_level()) < 30 {
        reasons.push("Risk preference matches".to_string());
    }
    reasons
}

/// Addressable market for a category, as a share of the baseline.
pub fn market_size(category: Option<Category>, baseline: f64) -> u64 {
    let factor = match category {
        Some(Category::Savings) => 0.8,
        Some(Category::Wealth) => 0.4,
        Some(Category::Credit) => 0.6,
        Some(Category::Insurance) => 0.7,
        Some(Category::Payment) => 0.9,
        None => 0.5,
    };
    (baseline * factor).floor() as u64
}

fn penetration_rate(matched: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", matched as f64 / total as f64 * 100.0)
}

/// Score and bucket the customer base against a proposed product.
pub fn segment_customers(
    product: &NewProduct,
    customers: &[Customer],
    config: &ConflictConfig,
) -> Segmentation {
    let mut matched = Vec::new();
    let mut segments = Segments::default();

    for customer in customers {
        let score = customer_fit_score(customer, product);
        if score <= config.customer_match_threshold {
            continue;
        }
        segments.assign(customer);
        matched.push(MatchedCustomer {
            customer_id: customer.id.clone(),
            score,
            segment: CustomerSegment::of(customer),
            reasons: match_reasons(customer, product),
        });
    }

    matched.sort_by(|a, b| b.score.cmp(&a.score));
    let total_potential_customers = matched.len();
    matched.truncate(config.max_matched_customers);

    Segmentation {
        total_potential_customers,
        matched_customers: matched,
        segments,
        market_size: market_size(product.category(), config.baseline_revenue),
        penetration_rate: penetration_rate(total_potential_customers, customers.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingxi_model::AgeRange;
    use lingxi_profile::{RiskResolver, TableRiskResolver};
    use pretty_assertions::assert_eq;

    const SENIOR: &str = "CDB91DCCE198B10A522FE2AABF6A8D81";
    const YOUNG: &str = "9307AC85C179D8E388DC776DB6283534";

    fn senior_savings() -> NewProduct {
        NewProduct {
            category: Some("savings".into()),
            risk_level: Some(1),
            min_amount: Some(50_000.0),
            target_age_range: Some(AgeRange::new(50, 80)),
            ..NewProduct::default()
        }
    }

    #[test]
    fn test_fit_score_terms() {
        let resolver = TableRiskResolver::builtin();
        // Outside ages, risk 20 vs 25, assets cover 5x
        assert_eq!(customer_fit_score(&resolver.resolve(SENIOR), &senior_savings()), 80);
        // Outside ages, risk 85 vs 25, assets cover 5x
        assert_eq!(customer_fit_score(&resolver.resolve(YOUNG), &senior_savings()), 65);
    }

    #[test]
    fn test_senior_savings_segments() {
        let customers = TableRiskResolver::builtin().known_customers();
        let result = segment_customers(&senior_savings(), &customers, &ConflictConfig::default());

        assert_eq!(result.total_potential_customers, 5);
        assert_eq!(result.penetration_rate, "100.0%");
        assert_eq!(result.market_size, 800_000);
        assert_eq!(result.segments.young_professionals, vec![YOUNG.to_string()]);
        assert_eq!(result.segments.mass_market, vec![YOUNG.to_string()]);
        assert_eq!(result.segments.high_value.len(), 4);
        assert_eq!(result.segments.retirees.len(), 4);
        assert_eq!(result.segments.risk_seeking, vec![YOUNG.to_string()]);
        assert!(result.matched_customers.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_expensive_risky_product_reaches_few() {
        let customers = TableRiskResolver::builtin().known_customers();
        let product = NewProduct {
            risk_level: Some(4),
            min_amount: Some(10_000_000.0),
            ..NewProduct::default()
        };
        let result = segment_customers(&product, &customers, &ConflictConfig::default());

        assert_eq!(result.total_potential_customers, 1);
        assert_eq!(result.matched_customers[0].customer_id, YOUNG);
        assert_eq!(result.matched_customers[0].segment, CustomerSegment::YoungProfessional);
        assert_eq!(result.penetration_rate, "20.0%");
        assert_eq!(result.market_size, 500_000);
    }

    #[test]
    fn test_empty_customer_base() {
        let result = segment_customers(&senior_savings(), &[], &ConflictConfig::default());
        assert_eq!(result.total_potential_customers, 0);
        assert_eq!(result.penetration_rate, "0%");
        assert_eq!(result.segments, Segments::default());
    }
}
