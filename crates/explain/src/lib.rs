//! Explanation generation for matches and feedback analytics.
//!
//! Converts scores, profiles and sample logs into human-readable reports
//! suitable for display in the advisor console.

mod deviation;

use std::collections::BTreeMap;

use lingxi_catalog::ProductCatalog;
use lingxi_model::{
    Category, Customer, InvestmentBehavior, Level, PreferenceProfile, Product, RiskLean, Sample,
};
use serde::{Deserialize, Serialize};

pub use deviation::{DeviationSimulator, PredictionDeviation};

/// Baseline accuracy of the first, feature-only recommendation step.
const BASELINE_ACCURACY: f64 = 45.0;
/// Accuracy gained per collected sample, capped at `MAX_IMPROVEMENT`.
const IMPROVEMENT_PER_SAMPLE: f64 = 5.0;
const MAX_IMPROVEMENT: f64 = 30.0;
/// Relative improvement (percent) that counts as meeting the target.
const REQUIRED_IMPROVEMENT: f64 = 50.0;
const TARGET_SAMPLES: usize = 10;
/// Window of recent samples used for strategy analysis.
const STRATEGY_WINDOW: usize = 10;

fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Short justification for a match score.
pub fn match_reason(customer: &Customer, product: &Product, score: u8) -> String {
    let mut reasons = Vec::new();

    if score >= 80 {
        reasons.push("Highly matched to customer needs");
    }
    if customer.age >= 60 && product.risk_level <= 1 {
        reasons.push("Suits steady investment for seniors");
    }
    if customer.high_value && product.min_amount >= 100_000.0 {
        reasons.push("Fits high-net-worth customers");
    }
    if customer.risk_profile.overall_risk == Level::Low && product.risk_level == 1 {
        reasons.push("Low-risk principal protection");
    }
    if customer.age < 40 && product.category == Category::Wealth {
        reasons.push("Suits long-term investing for young customers");
    }

    if reasons.is_empty() {
        "Recommended by system analysis".to_string()
    } else {
        reasons.join("; ")
    }
}

/// High-level reading of a customer profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInsight {
    pub risk_level: String,
    pub suitable_categories: Vec<Category>,
    pub investment_capacity: Level,
    pub recommendation: String,
}

pub fn customer_insight(customer: &Customer) -> CustomerInsight {
    let senior = customer.age >= 60;
    CustomerInsight {
        risk_level: match customer.risk_profile.overall_risk {
            Level::High => "High risk appetite",
            Level::Medium => "Moderate risk appetite",
            Level::Low => "Low risk appetite",
        }
        .to_string(),
        suitable_categories: if senior {
            vec![Category::Savings, Category::Insurance]
        } else {
            vec![Category::Wealth, Category::Credit]
        },
        investment_capacity: if customer.assets > 1_000_000.0 {
            Level::High
        } else {
            Level::Medium
        },
        recommendation: if senior {
            "Recommend steady products"
        } else {
            "Can allocate part of the portfolio to higher-risk products"
        }
        .to_string(),
    }
}

/// Observations about a learned preference profile.
pub fn user_insights(profile: &PreferenceProfile) -> Vec<String> {
    let mut insights = Vec::new();

    // Highest count wins; ties go to the first category in order.
    let top = profile
        .preferred_categories
        .iter()
        .fold(None, |best: Option<(&Category, &u32)>, (category, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((category, count)),
        });
    if let Some((category, count)) = top {
        insights.push(format!(
            "Customer prefers {} products ({} positive responses)",
            category.label(),
            count
        ));
    }

    match profile.risk_preference {
        RiskLean::Aggressive => insights.push("Customer shows a higher risk tolerance".to_string()),
        RiskLean::Conservative => {
            insights.push("Customer leans toward steady low-risk products".to_string())
        }
        RiskLean::Neutral => {}
    }

    if profile.investment_behavior == InvestmentBehavior::Growth {
        insights.push("Customer has a growth investment orientation".to_string());
    }

    if !profile.product_features.liked.is_empty() {
        let top_features: Vec<&str> =
            profile.product_features.liked.iter().take(3).map(String::as_str).collect();
        insights.push(format!("Customer favours products with: {}", top_features.join(", ")));
    }

    insights
}

/// Positive/negative counts for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    pub positive: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleAnalysis {
    pub total_samples: usize,
    pub positive_ratio: String,
    pub negative_ratio: String,
    /// Keyed by category label, or `"unknown"` for products not in the catalog.
    pub category_preferences: BTreeMap<String, CategoryStats>,
    pub insights: Vec<String>,
}

pub fn sample_analysis(history: &[Sample], catalog: &dyn ProductCatalog) -> SampleAnalysis {
    let positive = history.iter().filter(|s| s.is_positive()).count();
    let negative = history.len() - positive;

    let mut category_preferences: BTreeMap<String, CategoryStats> = BTreeMap::new();
    for sample in history {
        let key = catalog
            .get(&sample.product_id)
            .map(|p| p.category.label())
            .unwrap_or("unknown");
        let stats = category_preferences.entry(key.to_string()).or_default();
        if sample.is_positive() {
            stats.positive += 1;
        } else {
            stats.negative += 1;
        }
    }

    let insights = category_preferences
        .iter()
        .filter_map(|(category, stats)| {
            if stats.positive > stats.negative {
                Some(format!("{category} products are well received"))
            } else if stats.positive == 0 && stats.negative > 0 {
                Some(format!("{category} products need a strategy adjustment"))
            } else {
                None
            }
        })
        .collect();

    SampleAnalysis {
        total_samples: history.len(),
        positive_ratio: format!("{:.1}%", percent(positive, history.len())),
        negative_ratio: format!("{:.1}%", percent(negative, history.len())),
        category_preferences,
        insights,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAnalysis {
    pub customer_preference: String,
    pub recommendation_adjustment: String,
    /// Positive ratio of the recent window, in percent.
    pub strategy_score: f64,
    pub next_recommendation: String,
}

/// Strategy reading over the most recent samples.
pub fn strategy_analysis(history: &[Sample]) -> StrategyAnalysis {
    let recent = &history[history.len().saturating_sub(STRATEGY_WINDOW)..];
    let recent_positive = recent.iter().filter(|s| s.is_positive()).count();
    let score = round1(percent(recent_positive, recent.len()));
    let active = score >= 60.0;

    StrategyAnalysis {
        customer_preference: if active { "active" } else { "conservative" }.to_string(),
        recommendation_adjustment: if active {
            "Recommend more products"
        } else {
            "Needs more precise matching"
        }
        .to_string(),
        strategy_score: score,
        next_recommendation: if active {
            "Keep the current strategy"
        } else {
            "Adjust the recommendation algorithm"
        }
        .to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyImprovement {
    pub step1_accuracy: String,
    pub step2_accuracy: String,
    pub actual_improvement: String,
    pub meets_requirement: bool,
    pub samples_needed: usize,
}

/// Projected accuracy of the second step given the number of samples.
pub fn accuracy_improvement(sample_count: usize) -> AccuracyImprovement {
    let improvement = (sample_count as f64 * IMPROVEMENT_PER_SAMPLE).min(MAX_IMPROVEMENT);
    let relative = improvement / BASELINE_ACCURACY * 100.0;

    AccuracyImprovement {
        step1_accuracy: format!("{:.1}%", BASELINE_ACCURACY),
        step2_accuracy: format!("{:.1}%", BASELINE_ACCURACY + improvement),
        actual_improvement: format!("{:.1}%", relative),
        meets_requirement: relative >= REQUIRED_IMPROVEMENT,
        samples_needed: TARGET_SAMPLES.saturating_sub(sample_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lingxi_catalog::StaticCatalog;
    use lingxi_model::{
        AgeGroup, CustomerFeatures, Outcome, PreferenceType, RiskProfile, WealthLevel,
    };
    use pretty_assertions::assert_eq;

    fn sample(product_id: &str, feedback: &str) -> Sample {
        Sample {
            product_id: product_id.to_string(),
            product_name: product_id.to_string(),
            feedback: feedback.to_string(),
            label: Outcome::from_feedback(feedback),
            timestamp: Utc::now(),
            customer_features: CustomerFeatures {
                age_group: AgeGroup::Senior,
                wealth_level: WealthLevel::High,
                investment_type: PreferenceType::Conservative,
            },
        }
    }

    fn senior() -> Customer {
        Customer {
            id: "CDB91DCCE198B10A522FE2AABF6A8D81".to_string(),
            age: 82,
            assets: 5_000_000.0,
            high_value: true,
            risk_profile: RiskProfile {
                overall_risk: Level::Low,
                investment_experience: Level::High,
                preference_type: PreferenceType::Conservative,
                risk_score: 20,
            },
        }
    }

    #[test]
    fn test_match_reason() {
        let catalog = StaticCatalog::builtin().unwrap();
        let cd = catalog.get("SAVE_NEW_001").unwrap();
        let reason = match_reason(&senior(), cd, 100);
        assert!(reason.starts_with("Highly matched"));
        assert!(reason.contains("high-net-worth"));
        assert!(reason.contains("principal protection"));

        let mut young = senior();
        young.age = 30;
        young.high_value = false;
        young.risk_profile.overall_risk = Level::High;
        let credit = catalog.get("CREDIT_001").unwrap();
        assert_eq!(match_reason(&young, credit, 40), "Recommended by system analysis");
    }

    #[test]
    fn test_customer_insight() {
        let insight = customer_insight(&senior());
        assert_eq!(insight.risk_level, "Low risk appetite");
        assert_eq!(insight.suitable_categories, vec![Category::Savings, Category::Insurance]);
        assert_eq!(insight.investment_capacity, Level::High);
    }

    #[test]
    fn test_user_insights() {
        let mut profile = PreferenceProfile::default();
        assert!(user_insights(&profile).is_empty());

        profile.preferred_categories.insert(Category::Savings, 1);
        profile.preferred_categories.insert(Category::Wealth, 2);
        profile.risk_preference = RiskLean::Aggressive;
        profile.investment_behavior = InvestmentBehavior::Growth;
        profile.product_features.liked =
            vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()];

        let insights = user_insights(&profile);
        assert_eq!(insights.len(), 4);
        assert_eq!(insights[0], "Customer prefers wealth products (2 positive responses)");
        assert!(insights[3].ends_with("a, b, c"));
    }

    #[test]
    fn test_sample_analysis() {
        let catalog = StaticCatalog::builtin().unwrap();
        let history = [
            sample("SAVE_002", "interested"),
            sample("WEALTH_002", "no"),
            sample("MYSTERY", "no"),
        ];
        let analysis = sample_analysis(&history, &catalog);

        assert_eq!(analysis.total_samples, 3);
        assert_eq!(analysis.positive_ratio, "33.3%");
        assert_eq!(analysis.negative_ratio, "66.7%");
        assert_eq!(
            analysis.category_preferences.get("savings"),
            Some(&CategoryStats { positive: 1, negative: 0 })
        );
        assert!(analysis.category_preferences.contains_key("unknown"));
        let insights = &analysis.insights;
        assert!(insights.contains(&"savings products are well received".to_string()));
        assert!(insights.contains(&"wealth products need a strategy adjustment".to_string()));
    }

    #[test]
    fn test_sample_analysis_empty() {
        let catalog = StaticCatalog::builtin().unwrap();
        let analysis = sample_analysis(&[], &catalog);
        assert_eq!(analysis.positive_ratio, "0.0%");
        assert!(analysis.insights.is_empty());
    }

    #[test]
    fn test_strategy_analysis_uses_recent_window() {
        let mut history: Vec<_> = (0..10).map(|_| sample("SAVE_002", "no")).collect();
        history.extend((0..7).map(|_| sample("SAVE_002", "interested")));

        let analysis = strategy_analysis(&history);
        assert_eq!(analysis.strategy_score, 70.0);
        assert_eq!(analysis.customer_preference, "active");

        let analysis = strategy_analysis(&history[..5]);
        assert_eq!(analysis.strategy_score, 0.0);
        assert_eq!(analysis.next_recommendation, "Adjust the recommendation algorithm");
    }

    #[test]
    fn test_accuracy_improvement() {
        let one = accuracy_improvement(1);
        assert_eq!(one.step2_accuracy, "50.0%");
        assert_eq!(one.actual_improvement, "11.1%");
        assert!(!one.meets_requirement);
        assert_eq!(one.samples_needed, 9);

        let many = accuracy_improvement(12);
        assert_eq!(many.step2_accuracy, "75.0%");
        assert_eq!(many.actual_improvement, "66.7%");
        assert!(many.meets_requirement);
        assert_eq!(many.samples_needed, 0);
    }
}
