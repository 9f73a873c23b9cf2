//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment method catalog, the plan catalog and configuration.

use checkout_core::{MethodCatalog, PlanCatalog};
use checkout_providers::ProviderConfig;
use std::net::SocketAddr;
use std::sync::Arc;

const DEFAULT_PLANS_PATHS: &[&str] = &[
    "config/plans.toml",
    "../config/plans.toml",
    "../../config/plans.toml",
];

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit plan catalog path (`PLANS_PATH`)
    pub plans_path: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            plans_path: lookup("PLANS_PATH").filter(|p| !p.trim().is_empty()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment methods, cached per country
    pub methods: Arc<MethodCatalog>,
    /// Purchasable plans
    pub plans: Arc<PlanCatalog>,
    /// Provider credentials and bank details
    pub providers: Arc<ProviderConfig>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build state from environment variables and the plan catalog file
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let providers = ProviderConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load provider config: {}", e))?;
        let plans = load_plan_catalog(config.plans_path.as_deref())?;

        Ok(Self::from_parts(config, providers, plans))
    }

    pub fn from_parts(config: AppConfig, providers: ProviderConfig, plans: PlanCatalog) -> Self {
        Self {
            methods: Arc::new(MethodCatalog::new(providers.catalog_config())),
            plans: Arc::new(plans),
            providers: Arc::new(providers),
            config,
        }
    }
}

/// Load the plan catalog from `explicit` or the default locations
pub fn load_plan_catalog(explicit: Option<&str>) -> anyhow::Result<PlanCatalog> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return parse_plans(path, &content);
    }

    for path in DEFAULT_PLANS_PATHS {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_plans(path, &content);
        }
    }

    tracing::warn!("No plan catalog found, using empty catalog");
    Ok(PlanCatalog::new())
}

fn parse_plans(path: &str, content: &str) -> anyhow::Result<PlanCatalog> {
    let catalog = PlanCatalog::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!("Loaded {} plans from {}", catalog.plans.len(), path);
    Ok(catalog)
}
