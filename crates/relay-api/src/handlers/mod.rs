//! HTTP API handlers: builder-specs proposer endpoints and relay status.

pub mod proposer;
pub mod status;

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use relay_core::{EndpointIdentity, NetworkDomain};
use relay_services::{ProposerDatastore, RegistrationPipeline, StatsAggregator};

#[derive(Clone)]
pub struct ApiState {
    pub datastore: Arc<ProposerDatastore>,
    pub pipeline: RegistrationPipeline,
    pub stats: StatsAggregator,
    pub network: Arc<NetworkDomain>,
    /// Configured builder endpoints. Only reported; bids are not fetched here.
    pub builders: Arc<Vec<EndpointIdentity>>,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(
        datastore: Arc<ProposerDatastore>,
        network: NetworkDomain,
        builders: Vec<EndpointIdentity>,
        stats: StatsAggregator,
    ) -> Self {
        let pipeline = RegistrationPipeline::new(datastore.clone(), network.signing_domain, stats.clone());
        Self {
            datastore,
            pipeline,
            stats,
            network: Arc::new(network),
            builders: Arc::new(builders),
            started_at: Instant::now(),
        }
    }
}

// ── Error responses ───────────────────────────────────────────────────────────

/// Error body `{"code": <status>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u16,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.status.as_u16(),
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

// Re-export handler functions for use in router setup.
pub use proposer::{handle_get_header, handle_get_payload, handle_register_validators};
pub use status::{handle_builder_status, handle_epoch_stats, handle_relay_status, handle_slot_stats};
