//! /eth/v1/builder/status and /relay/v1/* handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use relay_core::stats::{EpochSummary, SlotSummary};
use relay_services::CacheState;

use super::{ApiError, ApiState};

// ── /eth/v1/builder/status ───────────────────────────────────────────────────

pub async fn handle_builder_status() -> Json<Value> {
    Json(json!({}))
}

// ── /relay/v1/status ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub network: String,
    pub signing_domain: String,
    pub ready: bool,
    pub known_validators: CacheInfo,
    pub builders: Vec<BuilderInfo>,
    pub current_slot: u64,
    pub current_epoch: u64,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct CacheInfo {
    pub state: CacheState,
    pub count: usize,
}

#[derive(Serialize)]
pub struct BuilderInfo {
    pub address: String,
    pub pubkey: String,
}

pub async fn handle_relay_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let known = state.datastore.known_validators();
    let builders = state
        .builders
        .iter()
        .map(|b| BuilderInfo {
            address: b.address().to_string(),
            pubkey: b.pubkey_hex(),
        })
        .collect();

    Json(StatusResponse {
        network: state.network.name.clone(),
        signing_domain: state.network.signing_domain_hex(),
        ready: known.is_ready(),
        known_validators: CacheInfo {
            state: known.state(),
            count: known.len(),
        },
        builders,
        current_slot: state.stats.current_slot(),
        current_epoch: state.stats.current_epoch(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

// ── /relay/v1/stats ──────────────────────────────────────────────────────────

pub async fn handle_epoch_stats(
    State(state): State<ApiState>,
    Path(epoch): Path<String>,
) -> Result<Json<EpochSummary>, ApiError> {
    let epoch: u64 = epoch
        .parse()
        .map_err(|_| ApiError::bad_request("invalid epoch"))?;
    state
        .stats
        .epoch_summary(epoch)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no stats for epoch {epoch}")))
}

pub async fn handle_slot_stats(
    State(state): State<ApiState>,
    Path(slot): Path<String>,
) -> Result<Json<SlotSummary>, ApiError> {
    let slot: u64 = slot.parse().map_err(|_| ApiError::bad_request("invalid slot"))?;
    state
        .stats
        .slot_summary(slot)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no stats for slot {slot}")))
}
