//! Feature extraction for product matching.
//!
//! Provides pure functions for computing features used in scoring:
//! - Age-range overlap
//! - Relative amount differences
//! - Product similarity
//! - Customer feature snapshots (age group, wealth level)

use lingxi_model::{AgeGroup, AgeRange, Customer, CustomerFeatures, WealthLevel};

/// Weights of the composite product similarity.
pub const CATEGORY_WEIGHT: f64 = 0.4;
pub const RISK_WEIGHT: f64 = 0.3;
pub const AMOUNT_WEIGHT: f64 = 0.3;

/// Overlap length divided by union length of two age ranges.
///
/// Degenerate ranges (zero-length union) overlap fully only when identical.
pub fn age_overlap_ratio(a: AgeRange, b: AgeRange) -> f64 {
    let overlap_min = a.min.max(b.min);
    let overlap_max = a.max.min(b.max);
    let overlap = overlap_max.saturating_sub(overlap_min) as f64;
    let union = a.max.max(b.max).saturating_sub(a.min.min(b.min)) as f64;

    if union == 0.0 {
        return if a == b { 1.0 } else { 0.0 };
    }
    overlap / union
}

/// Price gap of a candidate relative to an existing product's minimum amount.
///
/// A zero reference amount is treated as 1 unit.
pub fn price_difference(candidate: f64, reference: f64) -> f64 {
    let denominator = if reference > 0.0 { reference } else { 1.0 };
    (candidate - reference).abs() / denominator
}

/// Symmetric relative difference: the gap divided by the larger amount.
pub fn amount_difference(a: f64, b: f64) -> f64 {
    let a_base = if a > 0.0 { a } else { 1.0 };
    let b_base = if b > 0.0 { b } else { 1.0 };
    (a - b).abs() / a_base.max(b_base)
}

/// Absolute gap between two 1-4 risk levels.
pub fn risk_gap(a: u8, b: u8) -> u8 {
    a.abs_diff(b)
}

/// Composite similarity in [0, 1].
///
/// Category contributes 0.4, risk levels within 1 contribute 0.3 and minimum
/// amounts within `amount_tolerance` relative difference contribute 0.3.
pub fn product_similarity(
    same_category: bool,
    risk_a: u8,
    risk_b: u8,
    amount_a: f64,
    amount_b: f64,
    amount_tolerance: f64,
) -> f64 {
    let mut similarity = 0.0;
    if same_category {
        similarity += CATEGORY_WEIGHT;
    }
    if risk_gap(risk_a, risk_b) <= 1 {
        similarity += RISK_WEIGHT;
    }
    if amount_difference(amount_a, amount_b) < amount_tolerance {
        similarity += AMOUNT_WEIGHT;
    }
    similarity
}

/// Distance between a 0-100 risk score and a product risk level on the same scale.
pub fn risk_score_distance(risk_score: u8, risk_level: u8) -> u32 {
    (risk_score as i32 - risk_level as i32 * 25).unsigned_abs()
}

pub fn age_group(age: u32) -> AgeGroup {
    if age < 40 {
        AgeGroup::Young
    } else if age < 60 {
        AgeGroup::Adult
    } else {
        AgeGroup::Senior
    }
}

pub fn wealth_level(assets: f64) -> WealthLevel {
    if assets >= 2_000_000.0 {
        WealthLevel::High
    } else if assets >= 500_000.0 {
        WealthLevel::Medium
    } else {
        WealthLevel::Low
    }
}

/// Snapshot stored alongside each feedback sample.
pub fn customer_features(customer: &Customer) -> CustomerFeatures {
    CustomerFeatures {
        age_group: age_group(customer.age),
        wealth_level: wealth_level(customer.assets),
        investment_type: customer.risk_profile.preference_type,
    }
}
