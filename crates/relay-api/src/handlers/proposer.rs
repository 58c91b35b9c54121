//! builder-specs proposer endpoints.
//!
//! Bodies are taken as raw bytes and decoded here so that a malformed body
//! yields our `{code, message}` error with the decoder's own message.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};

use relay_core::types::SIGNATURE_LEN;
use relay_core::{SignedBlindedBeaconBlock, SignedValidatorRegistration};

use super::{ApiError, ApiState};

/// Hex digits in a 48-byte pubkey.
const PUBKEY_HEX_DIGITS: usize = 96;
/// Hex digits in a 32-byte hash.
const HASH_HEX_DIGITS: usize = 64;

/// Unsigned decimal, digits only. `u64::from_str` would also take a leading `+`.
fn parse_slot(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `0x` followed by exactly `digits` hex characters, either case.
fn is_prefixed_hex(s: &str, digits: usize) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|h| h.len() == digits && h.bytes().all(|b| b.is_ascii_hexdigit()))
}

// ── POST /eth/v1/builder/validators ──────────────────────────────────────────

pub async fn handle_register_validators(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(method = "registerValidator", body_len = body.len(), "request");
    state.stats.record_register_request();

    let registrations: Vec<SignedValidatorRegistration> =
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;

    // Per-entry failures are logged and counted; the proposer always gets 200.
    state.pipeline.process(registrations).await;

    Ok(Json(json!({})))
}

// ── GET /eth/v1/builder/header/{slot}/{parent_hash}/{pubkey} ─────────────────

pub async fn handle_get_header(
    State(state): State<ApiState>,
    Path((slot, parent_hash, pubkey)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    tracing::info!(
        method = "getHeader",
        slot = %slot,
        parent_hash = %parent_hash,
        pubkey = %pubkey,
        "request"
    );

    let checked = match parse_slot(&slot) {
        None => Err("invalid slot"),
        Some(_) if !is_prefixed_hex(&pubkey, PUBKEY_HEX_DIGITS) => Err("invalid pubkey"),
        Some(_) if !is_prefixed_hex(&parent_hash, HASH_HEX_DIGITS) => Err("invalid hash"),
        Some(slot) => Ok(slot),
    };
    let slot = match checked {
        Ok(slot) => slot,
        Err(message) => {
            state.stats.record_get_header(None, None);
            return Err(ApiError::bad_request(message));
        }
    };
    state.stats.record_get_header(Some(slot), Some(&pubkey));

    // No bid source is attached to this relay; every valid request gets 204.
    state.stats.record_header_no_content(slot);
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /eth/v1/builder/blinded_blocks ──────────────────────────────────────

pub async fn handle_get_payload(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(method = "getPayload", body_len = body.len(), "request");

    let block: SignedBlindedBeaconBlock = match serde_json::from_slice(&body) {
        Ok(b) => b,
        Err(e) => {
            state.stats.record_get_payload(None);
            return Err(ApiError::bad_request(e.to_string()));
        }
    };
    let slot = block.message.slot;

    if block.signature.len() != SIGNATURE_LEN {
        tracing::debug!(slot, signature_len = block.signature.len(), "rejecting blinded block");
        state.stats.record_get_payload(None);
        return Err(ApiError::bad_request("invalid signature"));
    }
    state.stats.record_get_payload(Some(slot));

    tracing::info!(
        slot,
        proposer_index = block.message.proposer_index,
        "blinded block accepted"
    );
    state.stats.record_payload_sent(slot);
    Ok(Json(json!({})))
}
