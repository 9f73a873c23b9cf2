//! # checkout-server
//!
//! Serves the checkout catalog to the browser.
//!
//! ## Usage
//!
//! ```bash
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export PAYPAL_CLIENT_ID=...
//! export BANK_IBAN="GB82 WEST 1234 5698 7654 32" BANK_ACCOUNT_HOLDER="Acme Ltd"
//!
//! checkout-server
//! ```

use checkout_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;
    let addr = state.config.socket_addr()?;

    info!("Environment: {}", state.config.environment);
    info!("Plans loaded: {}", state.plans.active_plans().count());
    info!(
        "Payment methods (no country): {:?}",
        state
            .methods
            .available_methods(None)
            .iter()
            .filter(|m| m.available)
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
    );

    let app = routes::create_router(state.clone());

    info!("checkout-server {} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);
    if !state.config.is_production() {
        info!("Payment methods: GET http://{}/api/v1/payment-methods?country=SN", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
