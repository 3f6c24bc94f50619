//! Lingxi product-matching service and CLI.
//!
//! Usage:
//!     lingxi serve --bind 127.0.0.1:3001 --prefix /api
//!     lingxi recommend CDB91DCCE198B10A522FE2AABF6A8D81 --limit 5
//!     lingxi analyze new_product.json
//!     lingxi products

mod app;
mod config;
mod error;
mod routes;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use lingxi_conflict::{analyze_new_product, NewProduct};
use lingxi_explain::customer_insight;
use lingxi_rerank::rank_catalog;
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::config::ServerConfig;

#[derive(Parser)]
#[command(name = "lingxi")]
#[command(about = "Financial product matching and next-step recommendation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log scoring detail
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3001")]
        bind: SocketAddr,

        /// Path prefix for all routes
        #[arg(long, default_value = "/api")]
        prefix: String,

        /// Seed for the simulated prediction-deviation report
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Score the catalog for one customer
    Recommend {
        /// Customer identifier
        customer_id: String,

        /// Maximum results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Analyze a proposed product read from a JSON file
    Analyze {
        /// Path to the product JSON
        file: PathBuf,
    },

    /// List the catalog
    Products,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let directive = if cli.verbose { "lingxi=debug" } else { "lingxi=info" };
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve { bind, prefix, seed } => {
            let config = ServerConfig {
                bind,
                api_prefix: prefix,
                deviation_seed: seed,
                ..Default::default()
            };
            let state = AppState::builtin(config)?;
            app::serve(state).await?;
        }
        Commands::Recommend { customer_id, limit, format } => {
            run_recommend(&customer_id, limit, &format)?;
        }
        Commands::Analyze { file } => {
            run_analyze(&file)?;
        }
        Commands::Products => {
            run_products()?;
        }
    }

    Ok(())
}

fn run_recommend(customer_id: &str, limit: usize, format: &str) -> Result<()> {
    let state = AppState::builtin(ServerConfig::default())?;
    let customer = state.resolver.resolve(customer_id);
    let hits = rank_catalog(
        &customer,
        state.catalog.products(),
        &HashSet::new(),
        limit,
        &state.config.match_config,
    );

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    let insight = customer_insight(&customer);
    println!(
        "Customer {} (age {}, assets {:.0}, risk {})",
        customer.id,
        customer.age,
        customer.assets,
        customer.risk_profile.overall_risk.as_str()
    );
    println!("{}", insight.recommendation);
    println!("---");

    for (i, hit) in hits.iter().enumerate() {
        println!("\n{}. {} ({})", i + 1, hit.product.name, hit.product.id);
        println!(
            "   Category: {} | Risk Level: {} | Min Amount: {:.0}",
            hit.product.category.label(),
            hit.product.risk_level,
            hit.product.min_amount
        );
        println!("   Match Score: {} ({:?})", hit.match_score, hit.recommendation_strength);
        println!("   {}", hit.match_reason);
    }

    println!("\n---");
    println!("Total: {} results", hits.len());

    Ok(())
}

fn run_analyze(file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let candidate: NewProduct = serde_json::from_str(&raw).context("parsing new product JSON")?;
    candidate.validate()?;

    let state = AppState::builtin(ServerConfig::default())?;
    let report = analyze_new_product(
        &candidate,
        &*state.catalog,
        &state.resolver.known_customers(),
        &state.config.conflict_config,
        Utc::now(),
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_products() -> Result<()> {
    let state = AppState::builtin(ServerConfig::default())?;
    for product in state.catalog.products() {
        println!(
            "{:<14} {:<28} {:<10} risk {} min {:.0}",
            product.id,
            product.name,
            product.category.label(),
            product.risk_level,
            product.min_amount
        );
    }
    println!("---");
    println!("Total: {} products", state.catalog.len());
    Ok(())
}
