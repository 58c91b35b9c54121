//! Validator registration pipeline.
//!
//! Each entry of a batch is checked in order: field lengths, membership in
//! the known-validator snapshot, BLS signature, then a last-write-wins
//! upsert. A failure at any stage drops that entry only; the batch as a
//! whole never fails.

use std::sync::Arc;

use relay_core::signing::{verify_registration, Domain, SigningError};
use relay_core::types::{PUBKEY_LEN, SIGNATURE_LEN};
use relay_core::SignedValidatorRegistration;
use serde::Serialize;
use thiserror::Error;

use crate::datastore::{ProposerDatastore, UpsertOutcome};
use crate::known_validators::KnownValidatorSet;
use crate::stats::StatsAggregator;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("pubkey must be {PUBKEY_LEN} bytes, got {0}")]
    PubkeyLength(usize),
    #[error("signature must be {SIGNATURE_LEN} bytes, got {0}")]
    SignatureLength(usize),
    #[error("validator is not known")]
    UnknownValidator,
    #[error("signature could not be checked: {0}")]
    MalformedSignature(SigningError),
    #[error("signature does not match registration")]
    SignatureMismatch,
}

/// Checks that need no store access. Runs against one snapshot of the
/// known-validator set for the whole batch.
pub fn validate_registration(
    registration: &SignedValidatorRegistration,
    known: &KnownValidatorSet,
    domain: Domain,
) -> Result<(), ValidationError> {
    let pubkey_len = registration.message.pubkey.len();
    if pubkey_len != PUBKEY_LEN {
        return Err(ValidationError::PubkeyLength(pubkey_len));
    }
    let sig_len = registration.signature.len();
    if sig_len != SIGNATURE_LEN {
        return Err(ValidationError::SignatureLength(sig_len));
    }

    if !known.contains_key(&registration.pubkey_hex()) {
        return Err(ValidationError::UnknownValidator);
    }

    match verify_registration(&registration.message, &registration.signature, domain) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ValidationError::SignatureMismatch),
        Err(e) => Err(ValidationError::MalformedSignature(e)),
    }
}

/// Per-batch tally. `received` always equals the sum of the other fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub received: u64,
    pub inserted: u64,
    pub updated: u64,
    pub stale: u64,
    pub invalid_length: u64,
    pub unknown_validator: u64,
    pub malformed_signature: u64,
    pub signature_mismatch: u64,
    pub store_errors: u64,
}

impl PipelineReport {
    pub fn saved(&self) -> u64 {
        self.inserted + self.updated
    }

    /// Entries dropped before reaching the store.
    pub fn unverified(&self) -> u64 {
        self.invalid_length + self.unknown_validator + self.malformed_signature + self.signature_mismatch
    }

    fn record_rejection(&mut self, err: &ValidationError) {
        match err {
            ValidationError::PubkeyLength(_) | ValidationError::SignatureLength(_) => {
                self.invalid_length += 1
            }
            ValidationError::UnknownValidator => self.unknown_validator += 1,
            ValidationError::MalformedSignature(_) => self.malformed_signature += 1,
            ValidationError::SignatureMismatch => self.signature_mismatch += 1,
        }
    }
}

#[derive(Clone)]
pub struct RegistrationPipeline {
    datastore: Arc<ProposerDatastore>,
    domain: Domain,
    stats: StatsAggregator,
}

impl RegistrationPipeline {
    pub fn new(datastore: Arc<ProposerDatastore>, domain: Domain, stats: StatsAggregator) -> Self {
        Self {
            datastore,
            domain,
            stats,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Validate and store a batch. Entries are processed in request order.
    pub async fn process(&self, registrations: Vec<SignedValidatorRegistration>) -> PipelineReport {
        let known = self.datastore.known_validators().snapshot();
        let domain = self.domain;

        // Pairing checks are CPU-bound; keep them off the async workers.
        let checked = tokio::task::spawn_blocking(move || {
            registrations
                .into_iter()
                .map(|r| {
                    let result = validate_registration(&r, &known, domain);
                    (r, result)
                })
                .collect::<Vec<_>>()
        })
        .await;

        let checked = match checked {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "registration verification task failed");
                return PipelineReport::default();
            }
        };

        let mut report = PipelineReport {
            received: checked.len() as u64,
            ..Default::default()
        };

        for (registration, result) in checked {
            let pubkey = registration.pubkey_hex();
            if let Err(err) = result {
                match &err {
                    ValidationError::UnknownValidator => {
                        tracing::debug!(pubkey = %pubkey, "skipping registration: {err}")
                    }
                    _ => tracing::warn!(pubkey = %pubkey, "skipping registration: {err}"),
                }
                report.record_rejection(&err);
                continue;
            }

            match self.datastore.update_validator_registration(&registration).await {
                Ok(UpsertOutcome::Inserted) => report.inserted += 1,
                Ok(UpsertOutcome::Updated) => report.updated += 1,
                Ok(UpsertOutcome::Stale) => {
                    tracing::debug!(
                        pubkey = %pubkey,
                        timestamp = registration.message.timestamp,
                        "registration not newer than stored one"
                    );
                    report.stale += 1;
                }
                Err(e) => {
                    tracing::error!(pubkey = %pubkey, error = %e, "failed to store registration");
                    report.store_errors += 1;
                }
            }
        }

        self.stats
            .record_registrations(report.received, report.saved(), report.unverified());

        tracing::info!(
            received = report.received,
            saved = report.saved(),
            stale = report.stale,
            rejected = report.unverified(),
            store_errors = report.store_errors,
            "processed validator registrations"
        );
        report
    }
}
