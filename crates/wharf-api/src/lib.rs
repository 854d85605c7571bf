//! # wharf-api — Axum API Surface
//!
//! Thin HTTP adapter over `wharf-service`. Handlers parse and validate
//! the wire shapes, delegate to the services, and map domain outcomes to
//! structured responses — no business logic lives here.
//!
//! ## API Surface
//!
//! | Route                                  | Operation                      |
//! |----------------------------------------|--------------------------------|
//! | `POST /v1/packages`                    | Package intake                 |
//! | `GET  /v1/packages/{id}`               | Package + timeline             |
//! | `POST /v1/packages/{id}/transitions`   | Propose a status transition    |
//! | `POST /v1/packages/{id}/delivery-code` | Ensure a delivery code exists  |
//! | `POST /v1/packages/{id}/redemptions`   | Redeem a delivery code         |
//! | `POST /v1/shipments`                   | Group packages into a shipment |
//! | `GET  /v1/shipments/{id}`              | Shipment snapshot              |
//! | `POST /v1/shipments/{id}/reconcile`    | Reconcile one shipment         |
//! | `POST /v1/shipments/reconcile`         | Maintenance sweep              |
//! | `GET  /health/live`, `/health/ready`   | Probes (unauthenticated)       |
//!
//! Staff authentication happens upstream; this crate assumes an
//! authenticated staff session and carries only a TraceLayer.

pub mod error;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::packages::router())
        .merge(routes::shipments::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
