//! Customer risk resolution.
//!
//! Turns a customer identifier into a `Customer` with a derived risk profile:
//! - exact lookup in a table of known customers
//! - otherwise a pattern-based fallback classifier over the identifier
//!
//! Resolution never fails. Downstream code depends only on `RiskResolver`.

use lingxi_model::{Customer, Level, PreferenceType, RiskProfile};

/// Assets above which a customer counts as high-asset.
pub const HIGH_ASSET_THRESHOLD: f64 = 1_000_000.0;

/// Trait for customer profile sources.
pub trait RiskResolver: Send + Sync {
    /// Resolve a customer. Unknown identifiers degrade to heuristic defaults.
    fn resolve(&self, customer_id: &str) -> Customer;

    /// The customer base used for segmentation, in a stable order.
    fn known_customers(&self) -> Vec<Customer>;
}

/// Canned profile chosen for an unknown identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackClass {
    /// Younger, risk-seeking customer
    Young,
    /// Older, conservative customer
    Senior,
    /// Default balanced customer
    Balanced,
}

const YOUNG_MARKERS: &[&str] = &["9307"];
const SENIOR_MARKERS: &[&str] = &["9FA", "CB0"];
const HIGH_VALUE_MARKERS: &[&str] = &["CDB", "797E"];

fn has_marker(customer_id: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| customer_id.contains(m))
}

/// Classify an unknown identifier. Young markers win over senior markers.
pub fn classify_identifier(customer_id: &str) -> FallbackClass {
    if has_marker(customer_id, YOUNG_MARKERS) {
        FallbackClass::Young
    } else if has_marker(customer_id, SENIOR_MARKERS) {
        FallbackClass::Senior
    } else {
        FallbackClass::Balanced
    }
}

/// Whether the identifier carries a high-value marker.
pub fn has_high_value_marker(customer_id: &str) -> bool {
    has_marker(customer_id, HIGH_VALUE_MARKERS)
}

/// High value means a marked identifier or assets above the high-asset threshold.
pub fn is_high_value(customer_id: &str, assets: f64) -> bool {
    has_high_value_marker(customer_id) || assets > HIGH_ASSET_THRESHOLD
}

/// Build the canned customer for an unknown identifier.
pub fn fallback_customer(customer_id: &str) -> Customer {
    let high_value_marker = has_high_value_marker(customer_id);

    let (age, assets, risk_profile) = match classify_identifier(customer_id) {
        FallbackClass::Young => (
            35,
            500_000.0,
            RiskProfile {
                overall_risk: Level::High,
                investment_experience: Level::Medium,
                preference_type: PreferenceType::Aggressive,
                risk_score: 80,
            },
        ),
        FallbackClass::Senior => (
            75,
            2_000_000.0,
            RiskProfile {
                overall_risk: Level::Low,
                investment_experience: Level::High,
                preference_type: PreferenceType::Conservative,
                risk_score: if high_value_marker { 30 } else { 40 },
            },
        ),
        FallbackClass::Balanced => (
            55,
            1_000_000.0,
            RiskProfile {
                overall_risk: Level::Medium,
                investment_experience: Level::Medium,
                preference_type: PreferenceType::Balanced,
                risk_score: 60,
            },
        ),
    };

    Customer {
        id: customer_id.to_string(),
        age,
        assets,
        high_value: is_high_value(customer_id, assets),
        risk_profile,
    }
}

/// Resolver backed by a fixed table of known customers.
#[derive(Debug, Clone, Default)]
pub struct TableRiskResolver {
    customers: Vec<Customer>,
}

impl TableRiskResolver {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self { customers }
    }

    /// The built-in customer table.
    pub fn builtin() -> Self {
        Self::new(vec![
            known(
                "CDB91DCCE198B10A522FE2AABF6A8D81",
                82,
                5_000_000.0,
                RiskProfile {
                    overall_risk: Level::Low,
                    investment_experience: Level::High,
                    preference_type: PreferenceType::Conservative,
                    risk_score: 20,
                },
            ),
            known(
                "9307AC85C179D8E388DC776DB6283534",
                38,
                800_000.0,
                RiskProfile {
                    overall_risk: Level::High,
                    investment_experience: Level::Medium,
                    preference_type: PreferenceType::Aggressive,
                    risk_score: 85,
                },
            ),
            known(
                "9FA3282573CEB37A5E9BC1C38088087F",
                74,
                1_500_000.0,
                RiskProfile {
                    overall_risk: Level::Medium,
                    investment_experience: Level::Medium,
                    preference_type: PreferenceType::Balanced,
                    risk_score: 60,
                },
            ),
            known(
                "CB0D6827A924C7FFDD9DD57BF5CE9358",
                73,
                3_000_000.0,
                RiskProfile {
                    overall_risk: Level::Low,
                    investment_experience: Level::High,
                    preference_type: PreferenceType::Conservative,
                    risk_score: 30,
                },
            ),
            known(
                "797E3448CF516A52ADBE6DB33626B50E",
                67,
                2_000_000.0,
                RiskProfile {
                    overall_risk: Level::Medium,
                    investment_experience: Level::High,
                    preference_type: PreferenceType::Balanced,
                    risk_score: 65,
                },
            ),
        ])
    }

    fn lookup(&self, customer_id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == customer_id)
    }
}

fn known(id: &str, age: u32, assets: f64, risk_profile: RiskProfile) -> Customer {
    Customer {
        id: id.to_string(),
        age,
        assets,
        high_value: is_high_value(id, assets),
        risk_profile,
    }
}

impl RiskResolver for TableRiskResolver {
    fn resolve(&self, customer_id: &str) -> Customer {
        match self.lookup(customer_id) {
            Some(customer) => customer.clone(),
            None => {
                let customer = fallback_customer(customer_id);
                tracing::debug!(
                    customer_id = %customer_id,
                    class = ?classify_identifier(customer_id),
                    "Unknown customer, using fallback profile"
                );
                customer
            }
        }
    }

    fn known_customers(&self) -> Vec<Customer> {
        self.customers.clone()
    }
}
