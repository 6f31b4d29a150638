//! HTTP API Layer
//!
//! This crate provides the REST API for the accounting core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Thin request handlers delegating to the repositories
//! - **Middleware**: Request tracing and audit logging
//! - **DTOs**: Request/Response data transfer objects, validated once at
//!   the boundary
//! - **Error Handling**: Domain taxonomy translated to the wire envelope
//!
//! Authentication is out of scope for the core: callers pass an explicit
//! `company_id` on every mutating request, and the trust boundary sits in
//! front of this service.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config)?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Currency;
use infra_db::{AccountRepository, LedgerRepository, PeriodRepository};

use crate::config::ApiConfig;
use crate::handlers::{accounts, entries, health, operations, periods};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub currency: Currency,
}

impl AppState {
    /// Account repository over the shared pool
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.pool.clone(), self.currency)
    }

    /// Ledger repository over the shared pool
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.pool.clone(), self.currency)
    }

    /// Period repository over the shared pool
    pub fn periods(&self) -> PeriodRepository {
        PeriodRepository::new(self.pool.clone())
    }
}

/// Creates the main API router
///
/// # Errors
///
/// Fails when the configured book currency cannot be parsed.
pub fn create_router(pool: PgPool, config: ApiConfig) -> anyhow::Result<Router> {
    let currency = config.book_currency()?;
    let state = AppState {
        pool,
        config,
        currency,
    };

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Chart of accounts
    let account_routes = Router::new()
        .route("/", post(accounts::create_account).get(accounts::list_accounts))
        .route(
            "/:id",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        );

    // Journal entries
    let entry_routes = Router::new()
        .route("/", post(entries::post_entry).get(entries::list_entries))
        .route("/:id", get(entries::get_entry).put(entries::correct_entry))
        .route("/:id/void", post(entries::void_entry));

    // Accounting periods
    let period_routes = Router::new()
        .route("/:id", get(periods::get_period))
        .route("/:id/close", post(periods::close_period));

    // Transaction strategies
    let operation_routes = Router::new()
        .route("/simple-entries", post(operations::simple_entry))
        .route("/liabilities", post(operations::create_liability))
        .route("/transfers", post(operations::transfer))
        .route("/investments", post(operations::external_investment))
        .route("/investor-exits", post(operations::investor_exit))
        .route("/profit-distributions", post(operations::profit_distribution))
        .route("/asset-protections", post(operations::asset_protection));

    let api_routes = Router::new()
        .nest("/accounts", account_routes)
        .nest("/entries", entry_routes)
        .nest("/periods", period_routes)
        .nest("/operations", operation_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ));

    Ok(Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state))
}
