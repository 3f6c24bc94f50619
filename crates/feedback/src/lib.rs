//! Feedback collection.
//!
//! A per-customer, append-only sample log behind the `FeedbackRepository`
//! trait, plus the preference learner that aggregates a log into a
//! `PreferenceProfile`.

mod preference;

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use lingxi_catalog::ProductCatalog;
use lingxi_model::{CustomerFeatures, Outcome, Sample};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use preference::{learn_preferences, mean_risk_level};

#[derive(Debug, Error, PartialEq)]
pub enum FeedbackError {
    #[error("feedback must be a non-empty list")]
    EmptyBatch,

    #[error("feedback entry {0} has no productId")]
    MissingProductId(usize),

    #[error("feedback store lock poisoned")]
    StorePoisoned,
}

/// One submitted feedback item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub product_id: String,
    #[serde(default)]
    pub product_name: Option<String>,
    /// Anything other than the positive sentinel, including nothing, is negative
    #[serde(default)]
    pub feedback: String,
}

/// Storage for customer sample logs.
///
/// Implementations must apply each `append` batch atomically so that batches
/// for the same customer never interleave.
pub trait FeedbackRepository: Send + Sync {
    /// Append samples and return the customer's full history, oldest first.
    fn append(&self, customer_id: &str, samples: Vec<Sample>) -> Result<Vec<Sample>, FeedbackError>;

    /// A customer's history, oldest first. Empty if nothing was recorded.
    fn history(&self, customer_id: &str) -> Result<Vec<Sample>, FeedbackError>;

    /// Number of customers with at least one sample.
    fn customer_count(&self) -> Result<usize, FeedbackError>;
}

/// Process-lifetime store guarded by a single lock.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackRepository {
    samples: RwLock<HashMap<String, Vec<Sample>>>,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeedbackRepository for InMemoryFeedbackRepository {
    fn append(
        &self,
        customer_id: &str,
        samples: Vec<Sample>,
    ) -> Result<Vec<Sample>, FeedbackError> {
        let mut store = self.samples.write().map_err(|_| FeedbackError::StorePoisoned)?;
        let log = store.entry(customer_id.to_string()).or_default();
        log.extend(samples);
        Ok(log.clone())
    }

    fn history(&self, customer_id: &str) -> Result<Vec<Sample>, FeedbackError> {
        let store = self.samples.read().map_err(|_| FeedbackError::StorePoisoned)?;
        Ok(store.get(customer_id).cloned().unwrap_or_default())
    }

    fn customer_count(&self) -> Result<usize, FeedbackError> {
        let store = self.samples.read().map_err(|_| FeedbackError::StorePoisoned)?;
        Ok(store.values().filter(|log| !log.is_empty()).count())
    }
}

/// Validate a batch, derive samples and append them.
///
/// Returns the customer's full history after the append. Nothing is written
/// when validation fails.
pub fn record(
    repository: &dyn FeedbackRepository,
    catalog: &dyn ProductCatalog,
    customer_id: &str,
    entries: &[FeedbackEntry],
    snapshot: &CustomerFeatures,
    now: DateTime<Utc>,
) -> Result<Vec<Sample>, FeedbackError> {
    if entries.is_empty() {
        return Err(FeedbackError::EmptyBatch);
    }
    if let Some(index) = entries.iter().position(|e| e.product_id.trim().is_empty()) {
        return Err(FeedbackError::MissingProductId(index));
    }

    let samples: Vec<Sample> = entries
        .iter()
        .map(|entry| Sample {
            product_id: entry.product_id.clone(),
            product_name: entry
                .product_name
                .clone()
                .or_else(|| catalog.get(&entry.product_id).map(|p| p.name.clone()))
                .unwrap_or_else(|| entry.product_id.clone()),
            feedback: entry.feedback.clone(),
            label: Outcome::from_feedback(&entry.feedback),
            timestamp: now,
            customer_features: snapshot.clone(),
        })
        .collect();

    let added = samples.len();
    let history = repository.append(customer_id, samples)?;

    tracing::info!(
        customer_id = %customer_id,
        added,
        total = history.len(),
        "Recorded feedback samples"
    );

    Ok(history)
}

/// Positive/negative/total counts of a sample log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCounts {
    pub positive_samples: usize,
    pub negative_samples: usize,
    pub total_samples: usize,
}

impl SampleCounts {
    pub fn from_history(history: &[Sample]) -> Self {
        let positive_samples = history.iter().filter(|s| s.is_positive()).count();
        Self {
            positive_samples,
            negative_samples: history.len() - positive_samples,
            total_samples: history.len(),
        }
    }
}

/// Product identifiers already offered to the customer.
pub fn seen_products(history: &[Sample]) -> HashSet<String> {
    history.iter().map(|s| s.product_id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingxi_catalog::StaticCatalog;
    use lingxi_model::{AgeGroup, PreferenceType, WealthLevel};
    use pretty_assertions::assert_eq;

    fn snapshot() -> CustomerFeatures {
        CustomerFeatures {
            age_group: AgeGroup::Adult,
            wealth_level: WealthLevel::Medium,
            investment_type: PreferenceType::Balanced,
        }
    }

    fn entry(product_id: &str, feedback: &str) -> FeedbackEntry {
        FeedbackEntry {
            product_id: product_id.to_string(),
            product_name: None,
            feedback: feedback.to_string(),
        }
    }

    #[test]
    fn test_record_appends_in_order() {
        let repo = InMemoryFeedbackRepository::new();
        let catalog = StaticCatalog::builtin().unwrap();
        let now = Utc::now();

        let first = [entry("SAVE_002", "interested")];
        record(&repo, &catalog, "c1", &first, &snapshot(), now).unwrap();
        let history = record(
            &repo,
            &catalog,
            "c1",
            &[entry("WEALTH_002", "not_interested"), entry("CREDIT_001", "interested")],
            &snapshot(),
            now,
        )
        .unwrap();

        let ids: Vec<_> = history.iter().map(|s| s.product_id.as_str()).collect();
        assert_eq!(ids, vec!["SAVE_002", "WEALTH_002", "CREDIT_001"]);
        assert_eq!(history[0].label, Outcome::Positive);
        assert_eq!(history[1].label, Outcome::Negative);
        assert_eq!(history[0].product_name, "Time Deposit");
        assert_eq!(repo.history("c1").unwrap(), history);
    }

    #[test]
    fn test_empty_batch_rejected_without_mutation() {
        let repo = InMemoryFeedbackRepository::new();
        let catalog = StaticCatalog::builtin().unwrap();

        let result = record(&repo, &catalog, "c1", &[], &snapshot(), Utc::now());
        assert_eq!(result, Err(FeedbackError::EmptyBatch));
        assert!(repo.history("c1").unwrap().is_empty());
        assert_eq!(repo.customer_count().unwrap(), 0);
    }

    #[test]
    fn test_missing_product_id_rejected_without_mutation() {
        let repo = InMemoryFeedbackRepository::new();
        let catalog = StaticCatalog::builtin().unwrap();
        let entries = [entry("SAVE_002", "interested"), entry(" ", "interested")];

        let result = record(&repo, &catalog, "c1", &entries, &snapshot(), Utc::now());
        assert_eq!(result, Err(FeedbackError::MissingProductId(1)));
        assert!(repo.history("c1").unwrap().is_empty());
    }

    #[test]
    fn test_supplied_product_name_is_kept() {
        let repo = InMemoryFeedbackRepository::new();
        let catalog = StaticCatalog::builtin().unwrap();
        let mut item = entry("UNKNOWN_9", "interested");
        item.product_name = Some("Custom".to_string());

        let entries = [item, entry("UNKNOWN_8", "meh")];
        let history = record(&repo, &catalog, "c1", &entries, &snapshot(), Utc::now()).unwrap();
        assert_eq!(history[0].product_name, "Custom");
        assert_eq!(history[1].product_name, "UNKNOWN_8");
    }

    #[test]
    fn test_customers_are_isolated() {
        let repo = InMemoryFeedbackRepository::new();
        let catalog = StaticCatalog::builtin().unwrap();
        let entries = [entry("SAVE_002", "interested")];
        record(&repo, &catalog, "a", &entries, &snapshot(), Utc::now()).unwrap();

        assert!(repo.history("b").unwrap().is_empty());
        assert_eq!(repo.customer_count().unwrap(), 1);
    }

    #[test]
    fn test_sample_counts() {
        let repo = InMemoryFeedbackRepository::new();
        let catalog = StaticCatalog::builtin().unwrap();
        let history = record(
            &repo,
            &catalog,
            "c1",
            &[entry("SAVE_002", "interested"), entry("SAVE_003", "no"), entry("SAVE_004", "no")],
            &snapshot(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            SampleCounts::from_history(&history),
            SampleCounts { positive_samples: 1, negative_samples: 2, total_samples: 3 }
        );
        assert_eq!(seen_products(&history).len(), 3);
    }

    #[test]
    fn test_concurrent_batches_do_not_interleave() {
        use std::sync::Arc;
        use std::thread;

        let repo = Arc::new(InMemoryFeedbackRepository::new());
        let catalog = Arc::new(StaticCatalog::builtin().unwrap());

        let handles: Vec<_> = ["A", "B"]
            .into_iter()
            .map(|tag| {
                let repo = Arc::clone(&repo);
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || {
                    let entries: Vec<_> =
                        (0..50).map(|i| entry(&format!("{tag}_{i}"), "no")).collect();
                    record(&*repo, &*catalog, "shared", &entries, &snapshot(), Utc::now())
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let history = repo.history("shared").unwrap();
        assert_eq!(history.len(), 100);
        let first_tag = &history[0].product_id[..1];
        assert!(history[..50].iter().all(|s| s.product_id.starts_with(first_tag)));
    }
}
