//! Preference inference from a sample log.

use lingxi_catalog::ProductCatalog;
use lingxi_model::{Category, InvestmentBehavior, PreferenceProfile, RiskLean, Sample};

/// Risk level assumed for samples whose product is not in the catalog.
const UNKNOWN_RISK_LEVEL: f64 = 2.0;

/// Mean gap between positive and negative risk levels needed to call a lean.
const LEAN_MARGIN: f64 = 0.5;

/// Mean product risk level over a set of samples. An empty set has mean 0.
pub fn mean_risk_level<'a>(
    samples: impl IntoIterator<Item = &'a Sample>,
    catalog: &dyn ProductCatalog,
) -> f64 {
    let (sum, count) = samples.into_iter().fold((0.0, 0usize), |(sum, count), sample| {
        let level = catalog
            .get(&sample.product_id)
            .map(|p| p.risk_level as f64)
            .unwrap_or(UNKNOWN_RISK_LEVEL);
        (sum + level, count + 1)
    });
    sum / count.max(1) as f64
}

/// Aggregate a full history into a preference profile.
///
/// An empty history yields the default profile, which means "no evidence".
/// Samples for products missing from the catalog only affect the risk means.
pub fn learn_preferences(history: &[Sample], catalog: &dyn ProductCatalog) -> PreferenceProfile {
    let mut profile = PreferenceProfile::default();

    let (positive, negative): (Vec<&Sample>, Vec<&Sample>) =
        history.iter().partition(|s| s.is_positive());

    for sample in &positive {
        if let Some(product) = catalog.get(&sample.product_id) {
            *profile.preferred_categories.entry(product.category).or_insert(0) += 1;
            for feature in &product.features {
                if !profile.product_features.liked.contains(feature) {
                    profile.product_features.liked.push(feature.clone());
                }
            }
        }
    }

    for sample in &negative {
        if let Some(product) = catalog.get(&sample.product_id) {
            *profile.avoided_categories.entry(product.category).or_insert(0) += 1;
            for feature in &product.features {
                if !profile.product_features.disliked.contains(feature) {
                    profile.product_features.disliked.push(feature.clone());
                }
            }
        }
    }

    // One-sided histories compare against a mean of 0.
    let pos = mean_risk_level(positive.iter().copied(), catalog);
    let neg = mean_risk_level(negative.iter().copied(), catalog);
    profile.risk_preference = if pos > neg + LEAN_MARGIN {
        RiskLean::Aggressive
    } else if pos < neg - LEAN_MARGIN {
        RiskLean::Conservative
    } else {
        RiskLean::Neutral
    };

    if profile.prefers(Category::Wealth) {
        profile.investment_behavior = InvestmentBehavior::Growth;
    }

    profile
}
