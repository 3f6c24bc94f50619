//! Product attributes and go-to-market recommendations for a proposed product.

use std::collections::HashSet;

use lingxi_model::{AgeRange, Category, ConflictType, Level, Severity};
use serde::{Deserialize, Serialize};

use crate::{ConflictDetection, NewProduct, Segmentation, Segments};

const INNOVATIVE_MARKERS: &[&str] =
    &["ai-driven", "blockchain", "robo-advisor", "digital-currency"];
const FLEXIBLE_FEATURES: &[&str] = &["draw-and-repay-anytime", "flexible-term"];
const RIGID_FEATURES: &[&str] = &["fixed-term", "fixed-income"];

const BASE_ROI: f64 = 0.15;
const ROI_PER_STRATEGY: f64 = 0.05;
const ROI_PER_RISK_STEP: f64 = 0.02;
const MAX_ROI: f64 = 0.5;

/// Revenue assumed per customer when a product has no minimum amount.
const DEFAULT_TICKET: f64 = 100_000.0;
const ANNUAL_FEE_RATE: f64 = 0.01;
const CONVERSION_RATE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAttributes {
    pub category: String,
    pub risk_level: u8,
    pub min_amount: f64,
    pub expected_return: f64,
    pub target_age_range: AgeRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAttributes {
    pub liquidity: Level,
    pub complexity: Level,
    pub flexibility: Level,
    pub innovation: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetMarket {
    HighNetWorth,
    Young,
    Retirees,
    MassMarket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompetitiveAdvantage {
    HighReturn,
    LowRisk,
    LowThreshold,
    Comprehensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Differentiation {
    /// Carries a feature no catalog product has
    HighlyDifferentiated,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAttributes {
    pub target_market: TargetMarket,
    pub competitive_advantage: CompetitiveAdvantage,
    pub differentiation: Differentiation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    pub basic: BasicAttributes,
    pub features: FeatureAttributes,
    pub market: MarketAttributes,
}

fn has_any(product: &NewProduct, tags: &[&str]) -> bool {
    product.features.iter().any(|f| tags.contains(&f.as_str()))
}

fn liquidity(category: Option<Category>) -> Level {
    match category {
        Some(Category::Savings | Category::Payment) => Level::High,
        Some(Category::Wealth) => Level::Medium,
        _ => Level::Low,
    }
}

fn complexity(feature_count: usize) -> Level {
    match feature_count {
        n if n > 5 => Level::High,
        n if n > 3 => Level::Medium,
        _ => Level::Low,
    }
}

fn flexibility(product: &NewProduct) -> Level {
    if has_any(product, FLEXIBLE_FEATURES) {
        Level::High
    } else if has_any(product, RIGID_FEATURES) {
        Level::Low
    } else {
        Level::Medium
    }
}

fn innovation(product: &NewProduct) -> Level {
    let innovative = product
        .features
        .iter()
        .any(|f| INNOVATIVE_MARKERS.iter().any(|m| f.contains(m)));
    if innovative {
        Level::High
    } else {
        Level::Medium
    }
}

fn target_market(product: &NewProduct) -> TargetMarket {
    // An unspecified age range says nothing about the audience.
    let ages = product.target_age_range;
    if product.min_amount() > 100_000.0 {
        TargetMarket::HighNetWorth
    } else if ages.is_some_and(|r| r.min < 30) {
        TargetMarket::Young
    } else if ages.is_some_and(|r| r.max > 60) {
        TargetMarket::Retirees
    } else {
        TargetMarket::MassMarket
    }
}

fn competitive_advantage(product: &NewProduct) -> CompetitiveAdvantage {
    if product.expected_return() > 0.08 {
        CompetitiveAdvantage::HighReturn
    } else if product.risk_level() <= 2 {
        CompetitiveAdvantage::LowRisk
    } else if product.min_amount.is_some_and(|m| m < 10_000.0) {
        CompetitiveAdvantage::LowThreshold
    } else {
        CompetitiveAdvantage::Comprehensive
    }
}

/// Describe a proposed product. `known_features` is every tag in the catalog.
pub fn product_attributes(
    product: &NewProduct,
    known_features: &HashSet<&str>,
) -> ProductAttributes {
    let category = product.category();
    let differentiation = if product.features.iter().any(|f| !known_features.contains(f.as_str())) {
        Differentiation::HighlyDifferentiated
    } else {
        Differentiation::Standard
    };

    ProductAttributes {
        basic: BasicAttributes {
            category: category.map_or("uncategorised", |c| c.label()).to_string(),
            risk_level: product.risk_level(),
            min_amount: product.min_amount(),
            expected_return: product.expected_return(),
            target_age_range: product.age_range(),
        },
        features: FeatureAttributes {
            liquidity: liquidity(category),
            complexity: complexity(product.features.len()),
            flexibility: flexibility(product),
            innovation: innovation(product),
        },
        market: MarketAttributes {
            target_market: target_market(product),
            competitive_advantage: competitive_advantage(product),
            differentiation,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarketPositioning {
    Premium,
    Steady,
    HighYield,
    Balanced,
}

pub fn market_positioning(product: &NewProduct) -> MarketPositioning {
    if product.min_amount() > 500_000.0 {
        MarketPositioning::Premium
    } else if product.risk_level() <= 2 {
        MarketPositioning::Steady
    } else if product.expected_return() > 0.10 {
        MarketPositioning::HighYield
    } else {
        MarketPositioning::Balanced
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub level: Level,
    pub score: i32,
    pub factors: Vec<String>,
}

pub fn assess_risk(product: &NewProduct) -> RiskAssessment {
    let risk_level = product.risk_level();
    let category = product.category();

    let mut score = 50;
    if risk_level >= 4 {
        score += 30;
    }
    if risk_level <= 1 {
        score -= 20;
    }
    if product.min_amount() > 1_000_000.0 {
        score += 10;
    }
    if category == Some(Category::Insurance) {
        score -= 10;
    }

    let level = if score > 70 {
        Level::High
    } else if score > 40 {
        Level::Medium
    } else {
        Level::Low
    };

    RiskAssessment {
        level,
        score,
        factors: vec![
            format!("Risk level: {risk_level}/4"),
            format!("Minimum amount: {:.0}", product.min_amount()),
            format!("Category: {}", category.map_or("uncategorised", |c| c.label())),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    ProductDifferentiation,
    PricingStrategy,
    PremiumPositioning,
    CrossSelling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStrategy {
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    pub description: String,
    pub actions: Vec<String>,
    pub expected_revenue_increase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_segment: Option<String>,
}

impl RevenueStrategy {
    fn new(kind: StrategyKind) -> Self {
        let (description, actions, increase, timeframe, segment) = match kind {
            StrategyKind::ProductDifferentiation => (
                "Reduce internal competition through functional differentiation",
                [
                    "Highlight the new product's unique value",
                    "Adjust the feature mix",
                    "Clarify usage scenarios per product",
                ],
                "15-25%",
                Some("3-6 months"),
                None,
            ),
            StrategyKind::PricingStrategy => (
                "Refine pricing to avoid a price war",
                [
                    "Adopt value-based pricing",
                    "Offer tiered pricing",
                    "Add value-added services",
                ],
                "10-20%",
                Some("1-3 months"),
                None,
            ),
            StrategyKind::PremiumPositioning => (
                "Premium pricing for high-net-worth customers",
                [
                    "Launch a VIP edition",
                    "Add customised services",
                    "Assign dedicated relationship managers",
                ],
                "25-35%",
                None,
                Some("high-net-worth customers"),
            ),
            StrategyKind::CrossSelling => (
                "Cross-sell with existing products",
                [
                    "Identify complementary bundles",
                    "Design bundled offers",
                    "Provide upgrade paths",
                ],
                "20-30%",
                Some("2-4 months"),
                None,
            ),
        };

        Self {
            kind,
            description: description.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            expected_revenue_increase: increase.to_string(),
            implementation_timeframe: timeframe.map(str::to_string),
            target_segment: segment.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueProjection {
    pub first_year: u64,
    pub second_year: u64,
    pub third_year: u64,
    pub total_three_years: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMitigation {
    pub risk: String,
    pub mitigation: String,
    pub priority: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueOptimization {
    pub primary_strategies: Vec<RevenueStrategy>,
    pub all_strategies: Vec<RevenueStrategy>,
    pub expected_roi: f64,
    pub revenue_projection: RevenueProjection,
    pub risk_mitigation: Vec<RiskMitigation>,
}

fn expected_roi(product: &NewProduct, strategy_count: usize) -> f64 {
    let risk_steps = 4 - product.risk_level() as i32;
    let roi = BASE_ROI
        + ROI_PER_STRATEGY * strategy_count as f64
        + ROI_PER_RISK_STEP * risk_steps as f64;
    roi.min(MAX_ROI)
}

fn project_revenue(product: &NewProduct, matched_customers: usize) -> RevenueProjection {
    let ticket = if product.min_amount() > 0.0 { product.min_amount() } else { DEFAULT_TICKET };
    let annual = matched_customers as f64 * ticket * ANNUAL_FEE_RATE * CONVERSION_RATE;

    RevenueProjection {
        first_year: (annual * 0.3).floor() as u64,
        second_year: (annual * 0.7).floor() as u64,
        third_year: annual.floor() as u64,
        total_three_years: (annual * 2.0).floor() as u64,
    }
}

fn risk_mitigation() -> Vec<RiskMitigation> {
    [
        ("Market risk", "Small pilot, then gradual rollout", Severity::High),
        (
            "Competition risk",
            "Differentiated positioning and a unique value proposition",
            Severity::Medium,
        ),
        ("Operational risk", "Strengthen risk controls and staff training", Severity::High),
        ("Compliance risk", "Strict regulatory review and compliance checks", Severity::High),
    ]
    .into_iter()
    .map(|(risk, mitigation, priority)| RiskMitigation {
        risk: risk.to_string(),
        mitigation: mitigation.to_string(),
        priority,
    })
    .collect()
}

/// Revenue strategies, ROI and projection for a proposed product.
///
/// Each strategy kind appears at most once however many conflicts call for it.
pub fn optimize_revenue(
    product: &NewProduct,
    detection: &ConflictDetection,
    segmentation: &Segmentation,
) -> RevenueOptimization {
    let has_conflict = |t: ConflictType| detection.conflicts.iter().any(|c| c.conflict_type == t);

    let mut strategies = Vec::new();
    if has_conflict(ConflictType::FunctionalOverlap) {
        strategies.push(RevenueStrategy::new(StrategyKind::ProductDifferentiation));
    }
    if has_conflict(ConflictType::PriceCompetition) {
        strategies.push(RevenueStrategy::new(StrategyKind::PricingStrategy));
    }
    if !segmentation.segments.high_value.is_empty() {
        strategies.push(RevenueStrategy::new(StrategyKind::PremiumPositioning));
    }
    strategies.push(RevenueStrategy::new(StrategyKind::CrossSelling));

    RevenueOptimization {
        primary_strategies: strategies.iter().take(3).cloned().collect(),
        expected_roi: expected_roi(product, strategies.len()),
        revenue_projection: project_revenue(product, segmentation.total_potential_customers),
        risk_mitigation: risk_mitigation(),
        all_strategies: strategies,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingStrategy {
    pub segment: String,
    pub approach: String,
    pub channels: Vec<String>,
    pub messaging: String,
}

fn marketing(
    segment: &str,
    approach: &str,
    channels: [&str; 3],
    messaging: &str,
) -> MarketingStrategy {
    MarketingStrategy {
        segment: segment.to_string(),
        approach: approach.to_string(),
        channels: channels.iter().map(|c| c.to_string()).collect(),
        messaging: messaging.to_string(),
    }
}

/// One marketing plan per non-empty target segment.
pub fn marketing_strategy(segments: &Segments) -> Vec<MarketingStrategy> {
    let mut plans = Vec::new();
    if !segments.high_value.is_empty() {
        plans.push(marketing(
            "high-net-worth customers",
            "Dedicated relationship manager with tailored proposals",
            ["private banking", "client salons", "one-to-one consultation"],
            "Asset allocation and wealth transfer planning",
        ));
    }
    if !segments.young_professionals.is_empty() {
        plans.push(marketing(
            "young professionals",
            "Digital and social media marketing",
            ["mobile app", "social media", "online communities"],
            "Smart investing and growth potential",
        ));
    }
    if !segments.retirees.is_empty() {
        plans.push(marketing(
            "retirees",
            "Branch channels and in-person events",
            ["branches", "community events", "health seminars"],
            "Steady returns and retirement planning",
        ));
    }
    plans
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchStrategy {
    pub phase: String,
    pub timeline: String,
    pub approach: String,
}

pub fn launch_strategy(detection: &ConflictDetection) -> LaunchStrategy {
    let (phase, timeline, approach) = if !detection.has_conflicts {
        ("fast", "Full launch within 3 months", "Simultaneous multi-channel promotion")
    } else if detection.overall_severity == Severity::High {
        (
            "phased",
            "Gradual rollout over 6-12 months",
            "Pilot first and resolve conflicts before scaling",
        )
    } else {
        (
            "steady",
            "Staged launch over 4-6 months",
            "Differentiated positioning to avoid direct competition",
        )
    };

    LaunchStrategy {
        phase: phase.to_string(),
        timeline: timeline.to_string(),
        approach: approach.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{detect_conflicts, segment_customers, ConflictConfig};
    use lingxi_catalog::StaticCatalog;
    use lingxi_profile::{RiskResolver, TableRiskResolver};
    use pretty_assertions::assert_eq;

    fn product(json: &str) -> NewProduct {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_attributes() {
        let known: HashSet<&str> = ["principal-protected", "flexible-term"].into_iter().collect();
        let deposit = product(
            r#"{"category": "储蓄类", "riskLevel": 1, "minAmount": 200000,
                "targetAgeRange": [50, 80], "features": ["principal-protected", "flexible-term"]}"#,
        );
        let attrs = product_attributes(&deposit, &known);

        assert_eq!(attrs.basic.category, "savings");
        assert_eq!(attrs.features.liquidity, Level::High);
        assert_eq!(attrs.features.complexity, Level::Low);
        assert_eq!(attrs.features.flexibility, Level::High);
        assert_eq!(attrs.features.innovation, Level::Medium);
        assert_eq!(attrs.market.target_market, TargetMarket::HighNetWorth);
        assert_eq!(attrs.market.competitive_advantage, CompetitiveAdvantage::LowRisk);
        assert_eq!(attrs.market.differentiation, Differentiation::Standard);
    }

    #[test]
    fn test_innovative_product() {
        let known = HashSet::new();
        let robo = product(
            r#"{"category": "wealth", "riskLevel": 3, "minAmount": 1000, "expectedReturn": 0.12,
                "targetAgeRange": [22, 45],
                "features": ["robo-advisor-lite", "a", "b", "c", "d", "e"]}"#,
        );
        let attrs = product_attributes(&robo, &known);

        assert_eq!(attrs.features.liquidity, Level::Medium);
        assert_eq!(attrs.features.complexity, Level::High);
        assert_eq!(attrs.features.innovation, Level::High);
        assert_eq!(attrs.market.target_market, TargetMarket::Young);
        assert_eq!(attrs.market.competitive_advantage, CompetitiveAdvantage::HighReturn);
        assert_eq!(attrs.market.differentiation, Differentiation::HighlyDifferentiated);
        assert_eq!(market_positioning(&robo), MarketPositioning::HighYield);
    }

    #[test]
    fn test_positioning_and_risk() {
        let premium = product(r#"{"minAmount": 600000}"#);
        assert_eq!(market_positioning(&premium), MarketPositioning::Premium);
        assert_eq!(market_positioning(&product(r#"{"riskLevel": 2}"#)), MarketPositioning::Steady);
        assert_eq!(market_positioning(&product("{}")), MarketPositioning::Balanced);

        let risky = assess_risk(&product(r#"{"riskLevel": 4, "minAmount": 2000000}"#));
        assert_eq!(risky.score, 90);
        assert_eq!(risky.level, Level::High);
        assert_eq!(risky.factors.len(), 3);

        let cover = assess_risk(&product(r#"{"riskLevel": 1, "category": "insurance"}"#));
        assert_eq!(cover.score, 20);
        assert_eq!(cover.level, Level::Low);

        assert_eq!(assess_risk(&product("{}")).level, Level::Medium);
    }

    #[test]
    fn test_revenue_optimization() {
        let catalog = StaticCatalog::builtin().unwrap();
        let customers = TableRiskResolver::builtin().known_customers();
        let config = ConflictConfig::default();
        let deposit = product(
            r#"{"category": "savings", "riskLevel": 1, "minAmount": 50000,
                "targetAgeRange": [50, 80]}"#,
        );

        let detection = detect_conflicts(&deposit, &catalog, &config);
        let segmentation = segment_customers(&deposit, &customers, &config);
        let result = optimize_revenue(&deposit, &detection, &segmentation);

        let kinds: Vec<StrategyKind> = result.all_strategies.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::ProductDifferentiation,
                StrategyKind::PricingStrategy,
                StrategyKind::PremiumPositioning,
                StrategyKind::CrossSelling,
            ]
        );
        assert_eq!(result.primary_strategies.len(), 3);
        // 0.15 + 4 * 0.05 + 3 * 0.02
        assert!((result.expected_roi - 0.41).abs() < 1e-9);
        assert_eq!(
            result.revenue_projection,
            RevenueProjection {
                first_year: 37,
                second_year: 87,
                third_year: 125,
                total_three_years: 250,
            }
        );
        assert_eq!(result.risk_mitigation.len(), 4);
    }

    #[test]
    fn test_roi_is_capped() {
        let low_risk = product(r#"{"riskLevel": 1}"#);
        assert_eq!(expected_roi(&low_risk, 10), MAX_ROI);
    }

    #[test]
    fn test_launch_strategy_by_severity() {
        let catalog = StaticCatalog::builtin().unwrap();
        let config = ConflictConfig::default();

        let savings = product(r#"{"category": "savings", "riskLevel": 1}"#);
        let clash = detect_conflicts(&savings, &catalog, &config);
        assert_eq!(launch_strategy(&clash).phase, "phased");

        let empty = ConflictDetection {
            conflicts: Vec::new(),
            resolutions: Vec::new(),
            has_conflicts: false,
            ..clash
        };
        assert_eq!(launch_strategy(&empty).phase, "fast");

        let moderate = ConflictDetection {
            has_conflicts: true,
            overall_severity: Severity::Medium,
            ..empty
        };
        assert_eq!(launch_strategy(&moderate).phase, "steady");
    }

    #[test]
    fn test_marketing_per_segment() {
        let segments = Segments {
            retirees: vec!["a".into()],
            ..Segments::default()
        };
        let plans = marketing_strategy(&segments);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].segment, "retirees");
        assert!(marketing_strategy(&Segments::default()).is_empty());
    }
}
