//! Core domain model for the Lingxi product-matching engine.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Product`: an immutable catalog entry with its target profile
//! - `Customer` / `RiskProfile`: the derived view of a customer
//! - `Sample`: one recorded feedback event
//! - `PreferenceProfile`: the aggregate learned from a sample log
//! - `ConflictRecord`: an overlap between a candidate and an existing product

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feedback value that marks a sample as positive. Anything else is negative.
pub const INTERESTED: &str = "interested";

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("risk level {0} outside 1-4")]
    InvalidRiskLevel(u8),
    #[error("invalid age range [{min}, {max}]")]
    InvalidAgeRange { min: u32, max: u32 },
    #[error("negative minimum amount {0}")]
    NegativeAmount(f64),
}

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "储蓄类")]
    Savings,
    #[serde(alias = "信贷类")]
    Credit,
    #[serde(alias = "财富类")]
    Wealth,
    #[serde(alias = "保障类")]
    Insurance,
    #[serde(alias = "支付类")]
    Payment,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "savings" | "储蓄类" => Some(Self::Savings),
            "credit" | "信贷类" => Some(Self::Credit),
            "wealth" | "财富类" => Some(Self::Wealth),
            "insurance" | "保障类" => Some(Self::Insurance),
            "payment" | "支付类" => Some(Self::Payment),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Wealth => "wealth",
            Self::Insurance => "insurance",
            Self::Payment => "payment",
        }
    }
}

/// Three-step scale used for risk tolerance, overall risk and experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Wealth tier a product is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WealthLevel {
    Low,
    Medium,
    High,
    Any,
}

/// Investment style of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceType {
    Conservative,
    Balanced,
    Aggressive,
}

impl PreferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }
}

/// Inclusive age interval, serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && age <= self.max
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.min > self.max {
            return Err(ModelError::InvalidAgeRange { min: self.min, max: self.max });
        }
        Ok(())
    }
}

impl From<[u32; 2]> for AgeRange {
    fn from([min, max]: [u32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<AgeRange> for [u32; 2] {
    fn from(range: AgeRange) -> Self {
        [range.min, range.max]
    }
}

/// Who a product is designed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetProfile {
    pub age: AgeRange,
    pub risk_tolerance: Level,
    pub wealth_level: WealthLevel,
    /// Compared verbatim against the customer's preference type.
    pub product_preference: String,
}

/// A catalog product. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Category,
    /// 1 (lowest) to 4 (highest)
    pub risk_level: u8,
    pub min_amount: f64,
    pub target_profile: TargetProfile,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Product {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(1..=4).contains(&self.risk_level) {
            return Err(ModelError::InvalidRiskLevel(self.risk_level));
        }
        if self.min_amount < 0.0 {
            return Err(ModelError::NegativeAmount(self.min_amount));
        }
        self.target_profile.age.validate()
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Risk and behaviour profile derived for a customer identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub overall_risk: Level,
    pub investment_experience: Level,
    pub preference_type: PreferenceType,
    /// 0 (risk averse) to 100 (risk seeking)
    pub risk_score: u8,
}

/// A customer as seen by the scorers. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub age: u32,
    pub assets: f64,
    pub high_value: bool,
    pub risk_profile: RiskProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Young,
    Adult,
    Senior,
}

/// Snapshot of customer features stored with each sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFeatures {
    pub age_group: AgeGroup,
    pub wealth_level: WealthLevel,
    pub investment_type: PreferenceType,
}

/// Binary sample label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Positive,
    Negative,
}

impl Outcome {
    /// Only an exact `"interested"` counts as positive.
    pub fn from_feedback(feedback: &str) -> Self {
        if feedback == INTERESTED {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

/// One recorded feedback event. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub product_id: String,
    pub product_name: String,
    pub feedback: String,
    pub label: Outcome,
    pub timestamp: DateTime<Utc>,
    pub customer_features: CustomerFeatures,
}

impl Sample {
    pub fn is_positive(&self) -> bool {
        self.label == Outcome::Positive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLean {
    Aggressive,
    Conservative,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentBehavior {
    Growth,
    #[default]
    Conservative,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureSets {
    pub liked: Vec<String>,
    pub disliked: Vec<String>,
}

/// Preferences inferred from a customer's full sample log.
///
/// The default value is the "no evidence" profile produced for an empty log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    pub preferred_categories: BTreeMap<Category, u32>,
    pub avoided_categories: BTreeMap<Category, u32>,
    pub risk_preference: RiskLean,
    pub product_features: FeatureSets,
    pub investment_behavior: InvestmentBehavior,
}

impl PreferenceProfile {
    pub fn prefers(&self, category: Category) -> bool {
        self.preferred_categories.get(&category).is_some_and(|n| *n > 0)
    }

    pub fn avoids(&self, category: Category) -> bool {
        self.avoided_categories.get(&category).is_some_and(|n| *n > 0)
    }

    pub fn likes_feature(&self, feature: &str) -> bool {
        self.product_features.liked.iter().any(|f| f == feature)
    }
}

/// Strength tag attached to a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Medium,
    Weak,
}

impl Strength {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            Self::Strong
        } else if score >= 60 {
            Self::Medium
        } else {
            Self::Weak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_score(score: u8) -> Self {
        if score >= 85 {
            Self::High
        } else if score >= 70 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// One tier up, saturating at `High`.
    pub fn upgrade(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }
}

/// Kinds of conflict between a candidate product and an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    FunctionalOverlap,
    PriceCompetition,
    TargetCustomerOverlap,
    RiskLevelSimilarity,
}

impl ConflictType {
    pub fn severity(&self) -> Severity {
        match self {
            Self::FunctionalOverlap => Severity::High,
            Self::PriceCompetition | Self::TargetCustomerOverlap => Severity::Medium,
            Self::RiskLevelSimilarity => Severity::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FunctionalOverlap => "Functional Overlap",
            Self::PriceCompetition => "Price Competition",
            Self::TargetCustomerOverlap => "Target Customer Overlap",
            Self::RiskLevelSimilarity => "Risk Level Similarity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Fraction of baseline revenue projected to be lost.
    pub fn revenue_impact_factor(&self) -> f64 {
        match self {
            Self::High => -0.15,
            Self::Medium => -0.08,
            Self::Low => -0.03,
        }
    }
}

/// A detected overlap between a candidate product and a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    pub product_id: String,
    pub product_name: String,
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub description: String,
    pub impact: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product(risk_level: u8, age: AgeRange) -> Product {
        Product {
            id: "SAVE_002".into(),
            name: "Time Deposit".into(),
            category: Category::Savings,
            risk_level,
            min_amount: 50_000.0,
            target_profile: TargetProfile {
                age,
                risk_tolerance: Level::Low,
                wealth_level: WealthLevel::Low,
                product_preference: "conservative".into(),
            },
            features: vec!["principal-protected".into()],
        }
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("Savings"), Some(Category::Savings));
        assert_eq!(Category::parse("财富类"), Some(Category::Wealth));
        assert_eq!(Category::parse("crypto"), None);
    }

    #[test]
    fn test_category_deserializes_chinese_alias() {
        let category: Category = serde_json::from_str("\"储蓄类\"").unwrap();
        assert_eq!(category, Category::Savings);
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"savings\"");
    }

    #[test]
    fn test_age_range_is_an_array() {
        let range = AgeRange::new(30, 70);
        assert_eq!(serde_json::to_string(&range).unwrap(), "[30,70]");
        assert!(range.contains(30) && range.contains(70));
        assert!(!range.contains(71));
    }

    #[test]
    fn test_product_validation() {
        assert!(product(1, AgeRange::new(30, 70)).validate().is_ok());
        assert_eq!(
            product(5, AgeRange::new(30, 70)).validate(),
            Err(ModelError::InvalidRiskLevel(5))
        );
        assert_eq!(
            product(2, AgeRange::new(70, 30)).validate(),
            Err(ModelError::InvalidAgeRange { min: 70, max: 30 })
        );
    }

    #[test]
    fn test_outcome_only_exact_sentinel_is_positive() {
        assert_eq!(Outcome::from_feedback("interested"), Outcome::Positive);
        assert_eq!(Outcome::from_feedback("Interested"), Outcome::Negative);
        assert_eq!(Outcome::from_feedback("not_interested"), Outcome::Negative);
    }

    #[test]
    fn test_confidence_upgrade_saturates() {
        assert_eq!(Confidence::Low.upgrade(), Confidence::Medium);
        assert_eq!(Confidence::Medium.upgrade(), Confidence::High);
        assert_eq!(Confidence::High.upgrade(), Confidence::High);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(Strength::from_score(80), Strength::Strong);
        assert_eq!(Strength::from_score(79), Strength::Medium);
        assert_eq!(Strength::from_score(59), Strength::Weak);
        assert_eq!(Confidence::from_score(85), Confidence::High);
        assert_eq!(Confidence::from_score(70), Confidence::Medium);
        assert_eq!(Confidence::from_score(69), Confidence::Low);
    }

    #[test]
    fn test_conflict_severity_ordering() {
        assert!(Severity::High > Severity::Medium && Severity::Medium > Severity::Low);
        assert_eq!(ConflictType::FunctionalOverlap.severity(), Severity::High);
        assert_eq!(ConflictType::RiskLevelSimilarity.severity(), Severity::Low);
    }

    #[test]
    fn test_preference_profile_keys_serialize_as_strings() {
        let mut profile = PreferenceProfile::default();
        profile.preferred_categories.insert(Category::Savings, 1);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["preferredCategories"]["savings"], 1);
        assert_eq!(json["riskPreference"], "neutral");
        assert!(profile.prefers(Category::Savings));
        assert!(!profile.avoids(Category::Savings));
    }
}
