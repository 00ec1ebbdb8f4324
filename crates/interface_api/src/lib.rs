//! HTTP API Layer
//!
//! This crate exposes the mixed-payment flow of the billing console over
//! REST using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for orders, vouchers, payments and accounts
//! - **Middleware**: Request ids, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod demo;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_billing::PaymentService;

use crate::handlers::{accounts, health, payments, vouchers};
use crate::middleware::{audit_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: PaymentService,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Payment service wired to its ports
pub fn create_router(service: PaymentService) -> Router {
    let state = AppState { service };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let order_routes = Router::new()
        .route("/:id/vouchers", get(vouchers::list_order_vouchers))
        .route("/:id/payment-plan", get(payments::get_payment_plan))
        .route("/:id/payments", post(payments::submit_payment));

    let account_routes = Router::new().route("/:id/balance", get(accounts::get_balance));

    let api_routes = Router::new()
        .nest("/orders", order_routes)
        .nest("/accounts", account_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
