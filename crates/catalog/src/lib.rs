//! Product catalog.
//!
//! Provides the read-only `ProductCatalog` trait and a static implementation
//! loaded once at startup. Scoring code only ever sees the trait, so a real
//! data source can replace the built-in table without touching it.

use std::collections::HashSet;

use lingxi_model::{AgeRange, Category, Level, ModelError, Product, TargetProfile, WealthLevel};
use thiserror::Error;

/// Errors from catalog construction.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate product id: {0}")]
    DuplicateProduct(String),

    #[error("invalid product {id}: {source}")]
    InvalidProduct {
        id: String,
        #[source]
        source: ModelError,
    },
}

/// Read-only access to the product catalog.
pub trait ProductCatalog: Send + Sync {
    /// All products, in catalog order.
    fn products(&self) -> &[Product];

    /// Look up a product by identifier.
    fn get(&self, id: &str) -> Option<&Product> {
        self.products().iter().find(|p| p.id == id)
    }

    fn len(&self) -> usize {
        self.products().len()
    }

    fn is_empty(&self) -> bool {
        self.products().is_empty()
    }

    /// Get the catalog name for logging.
    fn name(&self) -> &'static str;
}

/// Immutable in-memory catalog.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// Build a catalog, rejecting invalid products and duplicate identifiers.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in &products {
            product.validate().map_err(|source| CatalogError::InvalidProduct {
                id: product.id.clone(),
                source,
            })?;
            if !seen.insert(product.id.as_str()) {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }
        Ok(Self { products })
    }

    /// The built-in product table.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_products())
    }
}

impl ProductCatalog for StaticCatalog {
    fn products(&self) -> &[Product] {
        &self.products
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    category: Category,
    risk_level: u8,
    min_amount: f64,
    age: (u32, u32),
    risk_tolerance: Level,
    wealth_level: WealthLevel,
    preference: &str,
    features: &[&str],
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category,
        risk_level,
        min_amount,
        target_profile: TargetProfile {
            age: AgeRange::new(age.0, age.1),
            risk_tolerance,
            wealth_level,
            product_preference: preference.to_string(),
        },
        features: features.iter().map(|f| f.to_string()).collect(),
    }
}

fn builtin_products() -> Vec<Product> {
    use Category::*;
    use Level as R;
    use WealthLevel as W;

    vec![
        product(
            "SAVE_NEW_001",
            "Large-Denomination CD",
            Savings,
            1,
            200_000.0,
            (50, 80),
            R::Low,
            W::Medium,
            "conservative",
            &["principal-protected", "fixed-income", "high-rate"],
        ),
        product(
            "SAVE_002",
            "Time Deposit",
            Savings,
            1,
            50_000.0,
            (30, 70),
            R::Low,
            W::Low,
            "conservative",
            &["principal-protected", "stable-income", "flexible-term"],
        ),
        product(
            "CREDIT_001",
            "Personal Consumer Loan",
            Credit,
            2,
            10_000.0,
            (25, 55),
            R::Medium,
            W::Low,
            "flexible",
            &["fast-approval", "draw-and-repay-anytime", "preferential-rate"],
        ),
        product(
            "CREDIT_002",
            "Home Equity Loan",
            Credit,
            2,
            500_000.0,
            (35, 65),
            R::Medium,
            W::High,
            "investment",
            &["low-rate", "high-credit-line", "long-installments"],
        ),
        product(
            "CREDIT_003",
            "Credit Card",
            Credit,
            2,
            0.0,
            (20, 50),
            R::Medium,
            W::Low,
            "convenience",
            &["revolving-credit", "reward-points", "shopping-discounts"],
        ),
        product(
            "WEALTH_001",
            "Steady Wealth Plan",
            Wealth,
            2,
            10_000.0,
            (35, 60),
            R::Low,
            W::Medium,
            "balanced",
            &["steady-returns", "controlled-risk", "professional-management"],
        ),
        product(
            "WEALTH_002",
            "Equity Fund",
            Wealth,
            4,
            1_000.0,
            (25, 45),
            R::High,
            W::Medium,
            "aggressive",
            &["high-return-potential", "diversified", "stock-picking"],
        ),
        product(
            "WEALTH_003",
            "Gold Investment",
            Wealth,
            3,
            10_000.0,
            (40, 70),
            R::Medium,
            W::High,
            "safe",
            &["value-preservation", "inflation-hedge", "globally-accepted"],
        ),
        product(
            "INSURE_001",
            "Life Insurance",
            Insurance,
            1,
            5_000.0,
            (25, 55),
            R::Low,
            W::Medium,
            "conservative",
            &["comprehensive-cover", "wealth-transfer", "cash-value"],
        ),
        product(
            "INSURE_002",
            "Critical Illness Insurance",
            Insurance,
            1,
            3_000.0,
            (20, 50),
            R::Low,
            W::Any,
            "health",
            &["critical-illness-cover", "medical-reimbursement", "premium-waiver"],
        ),
        product(
            "SAVE_003",
            "Education Savings",
            Savings,
            1,
            10_000.0,
            (30, 50),
            R::Low,
            W::Medium,
            "conservative",
            &["dedicated-use", "tax-exempt", "scheduled-savings"],
        ),
        product(
            "SAVE_004",
            "Retirement Savings",
            Savings,
            1,
            50_000.0,
            (40, 65),
            R::Low,
            W::Medium,
            "conservative",
            &["retirement-planning", "tax-advantaged", "long-term-growth"],
        ),
        product(
            "CREDIT_004",
            "Auto Loan",
            Credit,
            2,
            50_000.0,
            (25, 50),
            R::Medium,
            W::Medium,
            "investment",
            &["low-rate", "long-installments", "secured-loan"],
        ),
        product(
            "CREDIT_005",
            "Business Loan",
            Credit,
            3,
            100_000.0,
            (30, 60),
            R::High,
            W::High,
            "aggressive",
            &["flexible-credit-line", "draw-and-repay-anytime", "business-support"],
        ),
        product(
            "WEALTH_004",
            "Bond Fund",
            Wealth,
            2,
            5_000.0,
            (35, 60),
            R::Low,
            W::Medium,
            "balanced",
            &["stable-income", "low-risk", "good-liquidity"],
        ),
        product(
            "WEALTH_005",
            "Balanced Fund",
            Wealth,
            3,
            10_000.0,
            (30, 50),
            R::Medium,
            W::Medium,
            "balanced",
            &["stock-bond-balance", "diversified", "professional-management"],
        ),
        product(
            "WEALTH_006",
            "Index Fund",
            Wealth,
            3,
            1_000.0,
            (25, 45),
            R::Medium,
            W::Low,
            "aggressive",
            &["index-tracking", "low-fees", "long-term-growth"],
        ),
        product(
            "INSURE_003",
            "Medical Insurance",
            Insurance,
            1,
            3_000.0,
            (25, 55),
            R::Low,
            W::Any,
            "health",
            &["medical-reimbursement", "hospital-allowance", "health-management"],
        ),
        product(
            "INSURE_004",
            "Annuity Insurance",
            Insurance,
            1,
            10_000.0,
            (40, 65),
            R::Low,
            W::High,
            "conservative",
            &["retirement-income", "stable-payouts", "cash-value"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = StaticCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 19);
        assert_eq!(catalog.name(), "static");
        use Category::*;
        for category in [Savings, Credit, Wealth, Insurance] {
            assert!(catalog.products().iter().any(|p| p.category == category));
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = StaticCatalog::builtin().unwrap();
        let product = catalog.get("SAVE_002").unwrap();
        assert_eq!(product.category, Category::Savings);
        assert_eq!(product.risk_level, 1);
        assert!(catalog.get("NOPE").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut products = builtin_products();
        products.push(products[0].clone());
        assert_eq!(
            StaticCatalog::new(products).unwrap_err(),
            CatalogError::DuplicateProduct("SAVE_NEW_001".to_string())
        );
    }

    #[test]
    fn test_invalid_product_rejected() {
        let mut products = builtin_products();
        products[1].risk_level = 0;
        assert!(matches!(
            StaticCatalog::new(products),
            Err(CatalogError::InvalidProduct {
                id,
                source: ModelError::InvalidRiskLevel(0),
            }) if id == "SAVE_002"
        ));
    }
}
