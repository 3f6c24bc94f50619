//! New-product conflict analysis.
//!
//! Compares a proposed product against every catalog product and against the
//! known customer base:
//! - `detect_conflicts`: per-rule conflict entries, overall severity, resolutions
//! - `segment_customers`: addressable segments, market size, penetration
//! - `analyze_new_product`: the full launch report built from both

mod segment;
mod strategy;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use lingxi_catalog::ProductCatalog;
use lingxi_features::{age_overlap_ratio, price_difference, product_similarity, risk_gap};
use lingxi_model::{
    AgeRange, Category, ConflictRecord, ConflictType, Customer, ModelError, Product, Severity,
};
use serde::{Deserialize, Serialize};

pub use segment::{
    customer_fit_score, market_size, segment_customers, CustomerSegment, MatchedCustomer,
    Segmentation, Segments,
};
pub use strategy::{
    assess_risk, launch_strategy, market_positioning, marketing_strategy, optimize_revenue,
    product_attributes, CompetitiveAdvantage, Differentiation, LaunchStrategy, MarketPositioning,
    MarketingStrategy, ProductAttributes, RevenueOptimization, RevenueProjection, RevenueStrategy,
    RiskAssessment, RiskMitigation, StrategyKind, TargetMarket,
};

/// Floating-point slack for threshold comparisons on summed weights.
const EPSILON: f64 = 1e-9;

/// Configuration for conflict detection and segmentation.
#[derive(Debug, Clone)]
pub struct ConflictConfig {
    /// Minimum composite similarity for functional overlap
    pub similarity_threshold: f64,
    /// Relative amount difference counted as "similar" inside the similarity
    pub amount_tolerance: f64,
    /// Relative price difference below which products compete on price
    pub price_tolerance: f64,
    /// Age-range overlap ratio above which customers overlap
    pub age_overlap_threshold: f64,
    /// Largest risk-level gap still counted as similar
    pub risk_tolerance: u8,
    /// Baseline revenue for impact and market-size estimates
    pub baseline_revenue: f64,
    /// Customers scoring above this are addressable
    pub customer_match_threshold: u8,
    /// Cap on the matched-customer list in reports
    pub max_matched_customers: usize,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            amount_tolerance: 0.3,
            price_tolerance: 0.2,
            age_overlap_threshold: 0.6,
            risk_tolerance: 1,
            baseline_revenue: 1_000_000.0,
            customer_match_threshold: 60,
            max_matched_customers: 100,
        }
    }
}

/// A proposed product. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Free text; unrecognised categories never overlap functionally.
    pub category: Option<String>,
    pub risk_level: Option<u8>,
    pub min_amount: Option<f64>,
    pub expected_return: Option<f64>,
    pub target_age_range: Option<AgeRange>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl NewProduct {
    pub const DEFAULT_RISK_LEVEL: u8 = 3;
    pub const DEFAULT_AGE_RANGE: AgeRange = AgeRange::new(25, 65);

    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(level) = self.risk_level {
            if !(1..=4).contains(&level) {
                return Err(ModelError::InvalidRiskLevel(level));
            }
        }
        if let Some(amount) = self.min_amount {
            if amount < 0.0 {
                return Err(ModelError::NegativeAmount(amount));
            }
        }
        match self.target_age_range {
            Some(range) => range.validate(),
            None => Ok(()),
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.category.as_deref().and_then(Category::parse)
    }

    pub fn risk_level(&self) -> u8 {
        self.risk_level.unwrap_or(Self::DEFAULT_RISK_LEVEL)
    }

    pub fn min_amount(&self) -> f64 {
        self.min_amount.unwrap_or(0.0)
    }

    pub fn expected_return(&self) -> f64 {
        self.expected_return.unwrap_or(0.0)
    }

    pub fn age_range(&self) -> AgeRange {
        self.target_age_range.unwrap_or(Self::DEFAULT_AGE_RANGE)
    }

    fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("NEW")
    }
}

/// Short- and long-term suggestion for one conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPlan {
    pub short_term: String,
    pub long_term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueImpact {
    /// Negative: projected loss against the baseline
    pub potential_loss: f64,
    pub recovery_time: String,
    pub mitigation_potential: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    pub conflict_id: String,
    pub conflict_type: ConflictType,
    pub resolution: ResolutionPlan,
    pub revenue_impact: RevenueImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSummary {
    pub by_type: BTreeMap<ConflictType, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDetection {
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictRecord>,
    pub resolutions: Vec<ConflictResolution>,
    pub overall_severity: Severity,
    pub summary: ConflictSummary,
}

/// Conflict types triggered between a candidate and one existing product.
pub fn conflict_types(
    candidate: &NewProduct,
    existing: &Product,
    config: &ConflictConfig,
) -> Vec<ConflictType> {
    let mut triggered = Vec::new();
    let same_category = candidate.category() == Some(existing.category);

    if same_category {
        let similarity = product_similarity(
            true,
            candidate.risk_level(),
            existing.risk_level,
            candidate.min_amount(),
            existing.min_amount,
            config.amount_tolerance,
        );
        if similarity + EPSILON >= config.similarity_threshold {
            triggered.push(ConflictType::FunctionalOverlap);
        }
    }

    if price_difference(candidate.min_amount(), existing.min_amount) < config.price_tolerance {
        triggered.push(ConflictType::PriceCompetition);
    }

    let age_overlap = age_overlap_ratio(candidate.age_range(), existing.target_profile.age);
    if age_overlap > config.age_overlap_threshold {
        triggered.push(ConflictType::TargetCustomerOverlap);
    }

    if risk_gap(candidate.risk_level(), existing.risk_level) <= config.risk_tolerance {
        triggered.push(ConflictType::RiskLevelSimilarity);
    }

    triggered
}

fn conflict_record(conflict_type: ConflictType, existing: &Product) -> ConflictRecord {
    let name = &existing.name;
    let (description, impact) = match conflict_type {
        ConflictType::FunctionalOverlap => (
            format!("Functionally overlaps with {name}"),
            "May divert customers and lower sales of the existing product",
        ),
        ConflictType::PriceCompetition => (
            format!("Priced close to {name}"),
            "May start a price war and squeeze margins",
        ),
        ConflictType::TargetCustomerOverlap => (
            format!("Targets largely the same customers as {name}"),
            "Internal competition, needs differentiated positioning",
        ),
        ConflictType::RiskLevelSimilarity => (
            format!("Risk level similar to {name}"),
            "Customers may struggle to choose, needs clear differentiation",
        ),
    };

    ConflictRecord {
        product_id: existing.id.clone(),
        product_name: existing.name.clone(),
        conflict_type,
        severity: conflict_type.severity(),
        description,
        impact: impact.to_string(),
    }
}

/// Suggested resolution for a conflict type.
pub fn resolution_plan(conflict_type: ConflictType) -> ResolutionPlan {
    let (short_term, long_term) = match conflict_type {
        ConflictType::FunctionalOverlap => (
            "Reposition the product around its distinctive features",
            "Consider merging products or reallocating features",
        ),
        ConflictType::PriceCompetition => (
            "Introduce tiered pricing",
            "Develop versions at different price points",
        ),
        ConflictType::TargetCustomerOverlap => (
            "Narrow the target customer group",
            "Build features for specific segments",
        ),
        ConflictType::RiskLevelSimilarity => (
            "Strengthen differentiation in marketing",
            "Keep refining product characteristics",
        ),
    };
    ResolutionPlan { short_term: short_term.to_string(), long_term: long_term.to_string() }
}

/// Projected revenue impact of one conflict at the given baseline.
pub fn revenue_impact(severity: Severity, baseline_revenue: f64) -> RevenueImpact {
    RevenueImpact {
        potential_loss: baseline_revenue * severity.revenue_impact_factor(),
        recovery_time: "6-12 months".to_string(),
        mitigation_potential: "60-80%".to_string(),
    }
}

/// Aggregate severity of a conflict list.
///
/// HIGH when any entry is HIGH or more than two are MEDIUM, MEDIUM when any
/// entry is MEDIUM, LOW otherwise (including no conflicts at all).
pub fn overall_severity(conflicts: &[ConflictRecord]) -> Severity {
    if conflicts.iter().any(|c| c.severity == Severity::High) {
        return Severity::High;
    }
    match conflicts.iter().filter(|c| c.severity == Severity::Medium).count() {
        n if n > 2 => Severity::High,
        0 => Severity::Low,
        _ => Severity::Medium,
    }
}

fn summarize(conflicts: &[ConflictRecord]) -> ConflictSummary {
    let mut by_type = BTreeMap::new();
    let mut by_severity: BTreeMap<Severity, usize> =
        [Severity::High, Severity::Medium, Severity::Low].into_iter().map(|s| (s, 0)).collect();

    for conflict in conflicts {
        *by_type.entry(conflict.conflict_type).or_insert(0) += 1;
        *by_severity.entry(conflict.severity).or_insert(0) += 1;
    }

    ConflictSummary { by_type, by_severity }
}

/// Compare a candidate against every catalog product.
pub fn detect_conflicts(
    candidate: &NewProduct,
    catalog: &dyn ProductCatalog,
    config: &ConflictConfig,
) -> ConflictDetection {
    let mut conflicts = Vec::new();
    let mut resolutions = Vec::new();

    for existing in catalog.products() {
        for conflict_type in conflict_types(candidate, existing, config) {
            let record = conflict_record(conflict_type, existing);
            resolutions.push(ConflictResolution {
                conflict_id: format!("{}-{}", candidate.display_id(), existing.id),
                conflict_type,
                resolution: resolution_plan(conflict_type),
                revenue_impact: revenue_impact(record.severity, config.baseline_revenue),
            });
            conflicts.push(record);
        }
    }

    ConflictDetection {
        has_conflicts: !conflicts.is_empty(),
        overall_severity: overall_severity(&conflicts),
        summary: summarize(&conflicts),
        conflicts,
        resolutions,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub product_attributes: ProductAttributes,
    pub conflict_detection: ConflictDetection,
    pub target_customer_segmentation: Segmentation,
    pub revenue_optimization: RevenueOptimization,
    pub market_positioning: MarketPositioning,
    pub risk_assessment: RiskAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRecommendations {
    pub target_customers: Segments,
    pub marketing_strategy: Vec<MarketingStrategy>,
    pub conflict_resolution: Vec<ConflictResolution>,
    pub launch_strategy: LaunchStrategy,
}

/// Full analysis of a proposed product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductAnalysis {
    pub product_info: NewProduct,
    pub analysis: AnalysisReport,
    pub recommendations: LaunchRecommendations,
    pub timestamp: DateTime<Utc>,
}

/// Analyze a proposed product against the catalog and the customer base.
pub fn analyze_new_product(
    candidate: &NewProduct,
    catalog: &dyn ProductCatalog,
    customers: &[Customer],
    config: &ConflictConfig,
    now: DateTime<Utc>,
) -> NewProductAnalysis {
    let known_features: HashSet<&str> = catalog
        .products()
        .iter()
        .flat_map(|p| p.features.iter().map(String::as_str))
        .collect();

    let conflict_detection = detect_conflicts(candidate, catalog, config);
    let segmentation = segment_customers(candidate, customers, config);
    let revenue_optimization = optimize_revenue(candidate, &conflict_detection, &segmentation);

    tracing::info!(
        product = candidate.name.as_deref().unwrap_or("unnamed"),
        conflicts = conflict_detection.conflicts.len(),
        severity = ?conflict_detection.overall_severity,
        matched_customers = segmentation.total_potential_customers,
        "Analyzed new product"
    );

    NewProductAnalysis {
        product_info: candidate.clone(),
        recommendations: LaunchRecommendations {
            target_customers: segmentation.segments.clone(),
            marketing_strategy: marketing_strategy(&segmentation.segments),
            conflict_resolution: conflict_detection.resolutions.clone(),
            launch_strategy: launch_strategy(&conflict_detection),
        },
        analysis: AnalysisReport {
            product_attributes: product_attributes(candidate, &known_features),
            market_positioning: market_positioning(candidate),
            risk_assessment: assess_risk(candidate),
            conflict_detection,
            target_customer_segmentation: segmentation,
            revenue_optimization,
        },
        timestamp: now,
    }
}
