//! Relay integration test harness.
//!
//! Each test starts an in-process relay on an ephemeral loopback port,
//! backed by a memory store, and talks to it over real HTTP.
//!
//!   cargo test --test integration

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use relay_api::ApiState;
use relay_core::hex::{Address, HexBytes};
use relay_core::signing::{BlsSigner, Domain};
use relay_core::{KnownValidator, NetworkDomain, PubkeyHex, SignedValidatorRegistration, ValidatorRegistration};
use relay_services::{KnownValidatorRefresher, MemoryStore, ProposerDatastore, StatsAggregator, ValidatorStore};

mod proposer;
mod registration;
mod status;

// ── Harness ───────────────────────────────────────────────────────────────────

pub struct TestRelay {
    pub base: String,
    pub store: Arc<MemoryStore>,
    pub datastore: Arc<ProposerDatastore>,
    pub stats: StatsAggregator,
    pub domain: Domain,
    pub client: reqwest::Client,
    shutdown: broadcast::Sender<()>,
    server: JoinHandle<Result<()>>,
}

impl TestRelay {
    /// Start a relay on `network` whose store already lists `known`.
    pub async fn start(network: &str, known: &[KnownValidator]) -> Result<Self> {
        Self::start_with_interval(network, known, Duration::from_secs(384)).await
    }

    pub async fn start_with_interval(
        network: &str,
        known: &[KnownValidator],
        interval: Duration,
    ) -> Result<Self> {
        let network = NetworkDomain::resolve(network)?;
        let domain = network.signing_domain;

        let store = Arc::new(MemoryStore::new());
        store.replace_known_validators(known).await?;
        let datastore = Arc::new(ProposerDatastore::new(store.clone()));
        let stats = StatsAggregator::new();

        let (shutdown, _) = broadcast::channel(1);
        let refresher = KnownValidatorRefresher::new(
            datastore.clone(),
            stats.clone(),
            interval,
            shutdown.subscribe(),
        );
        refresher.initial_refresh().await?;
        tokio::spawn(refresher.run());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);
        let state = ApiState::new(datastore.clone(), network, Vec::new(), stats.clone());
        let server = tokio::spawn(relay_api::serve_with_listener(
            state,
            listener,
            shutdown.subscribe(),
        ));

        Ok(Self {
            base,
            store,
            datastore,
            stats,
            domain,
            client: reqwest::Client::new(),
            shutdown,
            server,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get(&self, path: &str) -> Result<(u16, String)> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {path}"))?;
        let status = resp.status().as_u16();
        Ok((status, resp.text().await?))
    }

    pub async fn post(&self, path: &str, body: String) -> Result<(u16, String)> {
        let resp = self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| format!("POST {path}"))?;
        let status = resp.status().as_u16();
        Ok((status, resp.text().await?))
    }

    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        let joined = tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .context("server did not stop")?;
        joined??;
        Ok(())
    }
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn signer(seed: u8) -> BlsSigner {
    BlsSigner::from_seed(&[seed; 32]).expect("valid seed")
}

pub fn known(signers: &[&BlsSigner]) -> Vec<KnownValidator> {
    signers
        .iter()
        .enumerate()
        .map(|(i, s)| KnownValidator {
            pubkey: PubkeyHex::from_bytes(&s.public_key()),
            index: i as u64,
        })
        .collect()
}

pub fn registration(signer: &BlsSigner, domain: Domain, timestamp: u64) -> SignedValidatorRegistration {
    let message = ValidatorRegistration {
        fee_recipient: Address([0xfe; 20]),
        gas_limit: 30_000_000,
        timestamp,
        pubkey: HexBytes::from(signer.public_key().to_vec()),
    };
    let signature = signer
        .sign_registration(&message, domain)
        .expect("48-byte pubkey");
    SignedValidatorRegistration {
        message,
        signature: HexBytes::from(signature.to_vec()),
    }
}

pub fn batch(registrations: &[SignedValidatorRegistration]) -> String {
    serde_json::to_string(registrations).expect("serializable")
}
