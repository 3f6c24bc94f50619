//! Server configuration.

use std::net::SocketAddr;

use lingxi_conflict::ConflictConfig;
use lingxi_rerank::{MatchConfig, NextStepConfig};

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Path prefix for every route, e.g. `/api`. Empty mounts at the root.
    pub api_prefix: String,
    /// Seed for the simulated prediction-deviation report
    pub deviation_seed: u64,
    /// Number of products on the customer endpoint
    pub recommendation_limit: usize,
    pub match_config: MatchConfig,
    pub next_step_config: NextStepConfig,
    pub conflict_config: ConflictConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3001)),
            api_prefix: "/api".to_string(),
            deviation_seed: 42,
            recommendation_limit: 5,
            match_config: MatchConfig::default(),
            next_step_config: NextStepConfig::default(),
            conflict_config: ConflictConfig::default(),
        }
    }
}

impl ServerConfig {
    /// The prefix normalised to `/segment` form, or `None` for the root.
    pub fn mount_path(&self) -> Option<String> {
        let trimmed = self.api_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{trimmed}"))
        }
    }
}
