//! Next-step recommendation from learned preferences.
//!
//! Only products the customer has not yet given feedback on are candidates.
//! With no history the learned scorer does not run; `plan_next_step` falls
//! back to the match scorer and tags the result as `initial`.

use lingxi_catalog::ProductCatalog;
use lingxi_explain::user_insights;
use lingxi_feedback::{learn_preferences, mean_risk_level, seen_products, SampleCounts};
use lingxi_model::{
    Category, Confidence, Customer, InvestmentBehavior, PreferenceProfile, Product, RiskLean,
    Sample,
};
use serde::{Deserialize, Serialize};

use crate::{rank_catalog, MatchConfig};

const LEARNED_NEXT_STEP: &str = "New product recommendations from sample analysis";
const LEARNED_STRATEGY: &str = "Content matching over positive and negative samples";
const INITIAL_NEXT_STEP: &str = "Initial recommendations from customer features";
const INITIAL_STRATEGY: &str = "Customer profile matching";

/// Configuration for the next-step scorer.
#[derive(Debug, Clone)]
pub struct NextStepConfig {
    pub base: i32,
    /// Category has at least one positive sample
    pub preferred_category_bonus: i32,
    /// Category has at least one negative sample (subtracted)
    pub avoided_category_penalty: i32,
    /// Product risk agrees with the learned risk lean
    pub risk_lean_bonus: i32,
    /// Per liked feature tag carried by the product
    pub liked_feature_bonus: i32,
    /// Growth behaviour and a wealth product
    pub growth_bonus: i32,
    /// Products scoring below this are dropped
    pub min_score: i32,
    pub max_results: usize,
    /// Batch confidence is high from this many samples
    pub high_confidence_samples: usize,
    /// Batch confidence is low below this many samples
    pub low_confidence_samples: usize,
}

impl Default for NextStepConfig {
    fn default() -> Self {
        Self {
            base: 50,
            preferred_category_bonus: 25,
            avoided_category_penalty: 20,
            risk_lean_bonus: 15,
            liked_feature_bonus: 5,
            growth_bonus: 20,
            min_score: 50,
            max_results: 5,
            high_confidence_samples: 10,
            low_confidence_samples: 3,
        }
    }
}

/// Where a batch of recommendations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationBasis {
    /// Feature-based, no feedback collected yet
    Initial,
    /// Scored from the customer's feedback history
    Learned,
}

/// One next-step recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub risk_level: u8,
    pub min_amount: f64,
    pub features: Vec<String>,
    pub recommendation_score: u8,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub evidence: Vec<String>,
}

impl Recommendation {
    fn new(product: &Product, score: u8, confidence: Confidence) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category,
            risk_level: product.risk_level,
            min_amount: product.min_amount,
            features: product.features.clone(),
            recommendation_score: score,
            confidence,
            reasons: Vec::new(),
            evidence: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStepAnalysis {
    pub total_samples: usize,
    pub positive_samples: usize,
    pub negative_samples: usize,
    pub user_preferences: PreferenceProfile,
    pub insights: Vec<String>,
}

/// Full next-step answer for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStepPlan {
    pub next_step: String,
    pub basis: RecommendationBasis,
    pub analysis: NextStepAnalysis,
    pub recommended_products: Vec<Recommendation>,
    pub confidence: Confidence,
    pub strategy: String,
}

/// Score unseen catalog products against a learned profile.
///
/// Returns at most `config.max_results` products scoring at least
/// `config.min_score`, best first. Ties keep catalog order.
pub fn recommend_next(
    profile: &PreferenceProfile,
    catalog: &dyn ProductCatalog,
    history: &[Sample],
    config: &NextStepConfig,
) -> Vec<Recommendation> {
    let seen = seen_products(history);
    let positive_risk = mean_risk_level(history.iter().filter(|s| s.is_positive()), catalog);

    let mut recommendations: Vec<Recommendation> = catalog
        .products()
        .iter()
        .filter(|p| !seen.contains(&p.id))
        .filter_map(|product| {
            let (score, reasons) = score_unseen(profile, product, config);
            tracing::debug!(product_id = %product.id, score, "Next-step score");
            if score < config.min_score {
                return None;
            }

            let capped = score.min(100) as u8;
            let mut recommendation =
                Recommendation::new(product, capped, Confidence::from_score(capped));
            recommendation.reasons = if reasons.is_empty() {
                vec!["Matches product features".to_string()]
            } else {
                reasons
            };
            recommendation.evidence = evidence(product, profile, history, catalog, positive_risk);
            Some(recommendation)
        })
        .collect();

    recommendations.sort_by(|a, b| b.recommendation_score.cmp(&a.recommendation_score));
    recommendations.truncate(config.max_results);
    recommendations
}

fn score_unseen(
    profile: &PreferenceProfile,
    product: &Product,
    config: &NextStepConfig,
) -> (i32, Vec<String>) {
    let mut score = config.base;
    let mut reasons = Vec::new();
    let label = product.category.label();

    if profile.prefers(product.category) {
        score += config.preferred_category_bonus;
        reasons.push(format!("Customer responded positively to {label} products"));
    }
    if profile.avoids(product.category) {
        score -= config.avoided_category_penalty;
        reasons.push(format!("Customer responded negatively to {label} products"));
    }

    match profile.risk_preference {
        RiskLean::Aggressive if product.risk_level >= 3 => {
            score += config.risk_lean_bonus;
            reasons.push("Fits the customer's higher risk preference".to_string());
        }
        RiskLean::Conservative if product.risk_level <= 2 => {
            score += config.risk_lean_bonus;
            reasons.push("Fits the customer's lower risk preference".to_string());
        }
        _ => {}
    }

    for feature in &product.features {
        if profile.likes_feature(feature) {
            score += config.liked_feature_bonus;
            reasons.push(format!("Has a feature the customer liked: {feature}"));
        }
    }

    let growth = profile.investment_behavior == InvestmentBehavior::Growth;
    if growth && product.category == Category::Wealth {
        score += config.growth_bonus;
        reasons.push("Fits the customer's growth orientation".to_string());
    }

    (score, reasons)
}

fn evidence(
    product: &Product,
    profile: &PreferenceProfile,
    history: &[Sample],
    catalog: &dyn ProductCatalog,
    positive_risk: f64,
) -> Vec<String> {
    let mut evidence = Vec::new();

    let same_category = history
        .iter()
        .filter(|s| s.is_positive())
        .filter(|s| catalog.get(&s.product_id).is_some_and(|p| p.category == product.category))
        .count();
    if same_category > 0 {
        evidence.push(format!(
            "Customer was interested in {same_category} products of this category"
        ));
    }

    if (product.risk_level as f64 - positive_risk).abs() <= 1.0 {
        evidence.push(format!(
            "Risk level {} matches the customer's preference ({positive_risk:.1})",
            product.risk_level
        ));
    }

    let matched = product.features.iter().filter(|f| profile.likes_feature(f)).count();
    if matched > 0 {
        evidence.push(format!("Has {matched} features the customer liked"));
    }

    evidence
}

/// Confidence in a whole batch, from history size and category evidence.
///
/// Any preferred category lifts the tier by one, even on a single sample.
fn batch_confidence(
    sample_count: usize,
    profile: &PreferenceProfile,
    config: &NextStepConfig,
) -> Confidence {
    let base = if sample_count >= config.high_confidence_samples {
        Confidence::High
    } else if sample_count < config.low_confidence_samples {
        Confidence::Low
    } else {
        Confidence::Medium
    };

    if profile.preferred_categories.values().any(|n| *n > 0) {
        base.upgrade()
    } else {
        base
    }
}

/// Next-step plan for a customer: learned when history exists, initial otherwise.
pub fn plan_next_step(
    customer: &Customer,
    history: &[Sample],
    catalog: &dyn ProductCatalog,
    match_config: &MatchConfig,
    config: &NextStepConfig,
) -> NextStepPlan {
    if history.is_empty() {
        return initial_plan(customer, catalog, match_config, config);
    }

    let profile = learn_preferences(history, catalog);
    let counts = SampleCounts::from_history(history);
    let recommended_products = recommend_next(&profile, catalog, history, config);
    tracing::debug!(
        customer_id = %customer.id,
        samples = history.len(),
        recommended = recommended_products.len(),
        "Learned next-step plan"
    );

    NextStepPlan {
        next_step: LEARNED_NEXT_STEP.to_string(),
        basis: RecommendationBasis::Learned,
        confidence: batch_confidence(history.len(), &profile, config),
        analysis: NextStepAnalysis {
            total_samples: counts.total_samples,
            positive_samples: counts.positive_samples,
            negative_samples: counts.negative_samples,
            insights: user_insights(&profile),
            user_preferences: profile,
        },
        recommended_products,
        strategy: LEARNED_STRATEGY.to_string(),
    }
}

fn initial_plan(
    customer: &Customer,
    catalog: &dyn ProductCatalog,
    match_config: &MatchConfig,
    config: &NextStepConfig,
) -> NextStepPlan {
    let risk = customer.risk_profile.overall_risk.as_str();
    let ranked = rank_catalog(
        customer,
        catalog.products(),
        &Default::default(),
        config.max_results,
        match_config,
    );

    let recommended_products = ranked
        .into_iter()
        .map(|scored| {
            let mut recommendation =
                Recommendation::new(&scored.product, scored.match_score, Confidence::Medium);
            recommendation.reasons = vec![
                format!("Based on customer age ({})", customer.age),
                format!("Matches risk preference: {risk}"),
            ];
            recommendation.evidence = vec!["Feature-based match".to_string()];
            recommendation
        })
        .collect();

    let user_preferences = PreferenceProfile {
        investment_behavior: if customer.age >= match_config.senior_age {
            InvestmentBehavior::Conservative
        } else {
            InvestmentBehavior::Growth
        },
        ..PreferenceProfile::default()
    };

    NextStepPlan {
        next_step: INITIAL_NEXT_STEP.to_string(),
        basis: RecommendationBasis::Initial,
        analysis: NextStepAnalysis {
            total_samples: 0,
            positive_samples: 0,
            negative_samples: 0,
            user_preferences,
            insights: vec![
                "Recommendation based on customer features".to_string(),
                format!("Risk preference: {risk}"),
            ],
        },
        recommended_products,
        confidence: Confidence::Medium,
        strategy: INITIAL_STRATEGY.to_string(),
    }
}
