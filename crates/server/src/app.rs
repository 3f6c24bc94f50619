//! Shared application state and router assembly.

use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use lingxi_catalog::{CatalogError, ProductCatalog, StaticCatalog};
use lingxi_explain::DeviationSimulator;
use lingxi_feedback::{FeedbackRepository, InMemoryFeedbackRepository};
use lingxi_profile::{RiskResolver, TableRiskResolver};

use crate::config::ServerConfig;
use crate::routes;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub resolver: Arc<dyn RiskResolver>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub deviation: Arc<Mutex<DeviationSimulator>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        resolver: Arc<dyn RiskResolver>,
        feedback: Arc<dyn FeedbackRepository>,
        config: ServerConfig,
    ) -> Self {
        Self {
            catalog,
            resolver,
            feedback,
            deviation: Arc::new(Mutex::new(DeviationSimulator::new(config.deviation_seed))),
            config: Arc::new(config),
        }
    }

    /// Built-in catalog and customer table with an empty feedback store.
    pub fn builtin(config: ServerConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(
            Arc::new(StaticCatalog::builtin()?),
            Arc::new(TableRiskResolver::builtin()),
            Arc::new(InMemoryFeedbackRepository::new()),
            config,
        ))
    }
}

/// Build the router with every route under the configured prefix.
pub fn router(state: AppState) -> Router {
    let mount = state.config.mount_path();

    let api = Router::new()
        .route("/health", get(routes::health))
        .route("/products", get(routes::list_products))
        .route("/products/new-product-analysis", post(routes::new_product_analysis))
        .route("/customers/{id}", get(routes::customer))
        .route("/customers/{id}/next-recommendations", get(routes::next_recommendations))
        .route("/customers/{id}/feedback", post(routes::submit_feedback))
        .with_state(state);

    match mount {
        Some(path) => Router::new().nest(&path, api),
        None => api,
    }
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let bind = state.config.bind;
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!(
        %bind,
        prefix = %state.config.api_prefix,
        products = state.catalog.len(),
        catalog = state.catalog.name(),
        "Lingxi server listening"
    );

    axum::serve(listener, router(state)).await
}
