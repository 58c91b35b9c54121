//! SQLite-backed validator store.
//!
//! One connection behind a mutex; every call runs on the blocking pool.
//! Registrations are stored as JSON next to an indexed timestamp column so
//! the last-write-wins comparison happens inside a single statement.

use async_trait::async_trait;
use relay_core::{KnownValidator, PubkeyHex, SignedValidatorRegistration};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::datastore::{StoreError, UpsertOutcome, ValidatorStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS known_validators (
    pubkey          TEXT PRIMARY KEY,
    validator_index INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS validator_registrations (
    pubkey       TEXT PRIMARY KEY,
    timestamp    INTEGER NOT NULL,
    registration TEXT NOT NULL
);
";

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("sqlite connection poisoned".into()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

fn to_sql_int(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::OutOfRange(value))
}

#[async_trait]
impl ValidatorStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list_known_validators(&self) -> Result<Vec<KnownValidator>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT pubkey, validator_index FROM known_validators")?;
            let rows = stmt.query_map([], |row| {
                let pubkey: String = row.get(0)?;
                let index: i64 = row.get(1)?;
                Ok(KnownValidator {
                    pubkey: PubkeyHex::new(&pubkey),
                    index: index as u64,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn replace_known_validators(&self, validators: &[KnownValidator]) -> Result<(), StoreError> {
        let validators = validators.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM known_validators", [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO known_validators (pubkey, validator_index) VALUES (?1, ?2)",
                )?;
                for v in &validators {
                    stmt.execute(params![v.pubkey.as_str(), to_sql_int(v.index)?])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn upsert_registration(
        &self,
        registration: &SignedValidatorRegistration,
    ) -> Result<UpsertOutcome, StoreError> {
        let pubkey = registration.pubkey_hex();
        let timestamp = to_sql_int(registration.message.timestamp)?;
        let body = serde_json::to_string(registration)?;

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let existed = tx
                .query_row(
                    "SELECT 1 FROM validator_registrations WHERE pubkey = ?1",
                    params![pubkey.as_str()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            let changed = tx.execute(
                "INSERT INTO validator_registrations (pubkey, timestamp, registration)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(pubkey) DO UPDATE
                   SET timestamp = excluded.timestamp, registration = excluded.registration
                   WHERE excluded.timestamp > validator_registrations.timestamp",
                params![pubkey.as_str(), timestamp, body],
            )?;
            tx.commit()?;

            Ok(match (changed, existed) {
                (0, _) => UpsertOutcome::Stale,
                (_, true) => UpsertOutcome::Updated,
                (_, false) => UpsertOutcome::Inserted,
            })
        })
        .await
    }

    async fn get_registration(
        &self,
        pubkey: &PubkeyHex,
    ) -> Result<Option<SignedValidatorRegistration>, StoreError> {
        let pubkey = pubkey.clone();
        self.with_conn(move |conn| {
            let body: Option<String> = conn
                .query_row(
                    "SELECT registration FROM validator_registrations WHERE pubkey = ?1",
                    params![pubkey.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            match body {
                Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                None => Ok(None),
            }
        })
        .await
    }
}
