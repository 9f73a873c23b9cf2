//! # checkout-api
//!
//! HTTP API layer for checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The payment method catalog, filtered by country and by which
//!   providers this deployment has credentials for
//! - The plan catalog loaded from `config/plans.toml`
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/payment-methods?country=XX` | Payment methods |
//! | GET | `/api/v1/plans` | List plans |
//! | GET | `/api/v1/plans/{plan_id}` | Get plan |
//! | GET | `/api/v1/checkout/config` | Publishable keys, bank details |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
