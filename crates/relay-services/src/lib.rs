//! Proposer-side services: validator stores, the known-validator snapshot
//! and its refresher, the registration pipeline, and request statistics.

pub mod datastore;
pub mod known_validators;
pub mod memory_store;
pub mod pipeline;
pub mod refresher;
pub mod sqlite_store;
pub mod stats;

pub use datastore::{ProposerDatastore, StoreError, UpsertOutcome, ValidatorStore};
pub use known_validators::{CacheState, KnownValidatorCache, KnownValidatorSet};
pub use memory_store::MemoryStore;
pub use pipeline::{PipelineReport, RegistrationPipeline, ValidationError};
pub use refresher::KnownValidatorRefresher;
pub use sqlite_store::SqliteStore;
pub use stats::StatsAggregator;
