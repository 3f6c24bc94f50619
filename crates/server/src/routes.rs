//! HTTP handlers.

use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use lingxi_conflict::{analyze_new_product, NewProduct, NewProductAnalysis};
use lingxi_explain::{
    accuracy_improvement, customer_insight, sample_analysis, strategy_analysis, AccuracyImprovement,
    CustomerInsight, PredictionDeviation, SampleAnalysis, StrategyAnalysis,
};
use lingxi_features::customer_features;
use lingxi_feedback::{record, FeedbackEntry, SampleCounts};
use lingxi_model::{Customer, Product};
use lingxi_rerank::{plan_next_step, rank_catalog, NextStepPlan, ScoredProduct};
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub total_products: usize,
    /// Customers with at least one recorded sample
    pub sample_count: usize,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        total_products: state.catalog.len(),
        sample_count: state.feedback.customer_count()?,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub total: usize,
}

pub async fn list_products(State(state): State<AppState>) -> Json<ProductList> {
    let products = state.catalog.products().to_vec();
    Json(ProductList { total: products.len(), products })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub customer: Customer,
    pub recommendations: Vec<ScoredProduct>,
    pub sample_count: usize,
    pub customer_insight: CustomerInsight,
}

pub async fn customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerResponse>, ApiError> {
    tracing::info!(customer_id = %customer_id, "GET customer");

    let customer = state.resolver.resolve(&customer_id);
    let history = state.feedback.history(&customer_id)?;
    let recommendations = rank_catalog(
        &customer,
        state.catalog.products(),
        &HashSet::new(),
        state.config.recommendation_limit,
        &state.config.match_config,
    );

    Ok(Json(CustomerResponse {
        customer_insight: customer_insight(&customer),
        customer,
        recommendations,
        sample_count: history.len(),
    }))
}

pub async fn next_recommendations(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<NextStepPlan>, ApiError> {
    tracing::info!(customer_id = %customer_id, "GET next recommendations");

    let customer = state.resolver.resolve(&customer_id);
    let history = state.feedback.history(&customer_id)?;
    let plan = plan_next_step(
        &customer,
        &history,
        &*state.catalog,
        &state.config.match_config,
        &state.config.next_step_config,
    );

    Ok(Json(plan))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
    pub samples: SampleCounts,
    pub sample_analysis: SampleAnalysis,
    pub strategy_analysis: StrategyAnalysis,
    pub prediction_deviation: PredictionDeviation,
    pub next_step_strategy: NextStepPlan,
    pub accuracy_improvement: AccuracyImprovement,
}

/// Pull the `feedback` list out of a request body.
///
/// Everything is validated before the store is touched.
fn parse_feedback(body: &Value) -> Result<Vec<FeedbackEntry>, ApiError> {
    let items = body
        .get("feedback")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ApiError::BadRequest("feedback must be a non-empty list".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item.clone())
                .map_err(|e| ApiError::BadRequest(format!("invalid feedback entry {index}: {e}")))
        })
        .collect()
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let Json(body) = payload?;
    let entries = parse_feedback(&body)?;
    tracing::info!(customer_id = %customer_id, entries = entries.len(), "POST feedback");

    let customer = state.resolver.resolve(&customer_id);
    let snapshot = customer_features(&customer);
    let history = record(
        &*state.feedback,
        &*state.catalog,
        &customer_id,
        &entries,
        &snapshot,
        Utc::now(),
    )?;

    let prediction_deviation = state
        .deviation
        .lock()
        .map_err(|_| ApiError::Internal("deviation simulator lock poisoned".to_string()))?
        .simulate(entries.iter().map(|e| e.feedback.as_str()));

    Ok(Json(FeedbackResponse {
        success: true,
        message: "Samples recorded, strategy updated".to_string(),
        samples: SampleCounts::from_history(&history),
        sample_analysis: sample_analysis(&history, &*state.catalog),
        strategy_analysis: strategy_analysis(&history),
        prediction_deviation,
        next_step_strategy: plan_next_step(
            &customer,
            &history,
            &*state.catalog,
            &state.config.match_config,
            &state.config.next_step_config,
        ),
        accuracy_improvement: accuracy_improvement(history.len()),
    }))
}

pub async fn new_product_analysis(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<NewProductAnalysis>, ApiError> {
    let Json(mut body) = payload?;
    let raw = match body.get_mut("newProduct").map(Value::take) {
        Some(Value::Null) | None => {
            return Err(ApiError::BadRequest("newProduct is required".to_string()));
        }
        Some(raw) => raw,
    };

    let candidate: NewProduct = serde_json::from_value(raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid newProduct: {e}")))?;
    candidate.validate()?;
    let product = candidate.name.as_deref().unwrap_or("unnamed");
    tracing::info!(product, "POST new-product analysis");

    let customers = state.resolver.known_customers();
    Ok(Json(analyze_new_product(
        &candidate,
        &*state.catalog,
        &customers,
        &state.config.conflict_config,
        Utc::now(),
    )))
}
