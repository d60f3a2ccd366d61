// src/repositories/portfolio_store.rs
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, error, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::models::portfolio::Portfolio;
use crate::repositories::storage::{KeyValueStorage, StorageError};

/// Storage entry holding the JSON array of all portfolios.
pub const STORAGE_KEY: &str = "portfolios";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Persists the portfolio collection as one serialized entry.
///
/// Reads never fail: missing, malformed or unreachable data reads as an
/// empty collection. Writes replace the whole entry or leave the previous
/// one untouched, and refuse to run on top of an entry they cannot read.
pub struct PortfolioStore {
    storage: Arc<dyn KeyValueStorage>,
    // serializes read-modify-write inside one process; across processes
    // saves remain last-write-wins
    write_lock: Mutex<()>,
}

impl PortfolioStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn list(&self) -> Vec<Portfolio> {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(StorageError::Unavailable) => {
                debug!("portfolio storage unavailable, reading as empty");
                return Vec::new();
            }
            Err(e) => {
                warn!("failed to read portfolios: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(portfolios) => portfolios,
            Err(e) => {
                warn!("malformed portfolio data, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<Portfolio> {
        self.list().into_iter().find(|p| p.id == id)
    }

    /// True iff the portfolio exists and its password matches exactly.
    pub fn verify_password(&self, id: &str, candidate: &str) -> bool {
        self.get_by_id(id)
            .map(|p| p.password == candidate)
            .unwrap_or(false)
    }

    /// Upsert by id. Returns the record as persisted.
    ///
    /// An existing record keeps its original `created_at`; `updated_at` is
    /// always refreshed. Nested entities without an id get one, and skill
    /// levels are clamped to 0..=100.
    pub fn save(&self, mut portfolio: Portfolio) -> Result<Portfolio, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut portfolios = self.load_for_write()?;
        let now = Utc::now();

        portfolio.normalize(Self::generate_entity_id);
        portfolio.updated_at = Some(now);

        match portfolios.iter().position(|p| p.id == portfolio.id) {
            Some(index) => {
                portfolio.created_at = portfolios[index]
                    .created_at
                    .or(portfolio.created_at)
                    .or(Some(now));
                portfolios[index] = portfolio.clone();
            }
            None => {
                portfolio.created_at = Some(now);
                portfolios.push(portfolio.clone());
            }
        }

        self.persist(&portfolios)?;
        debug!("saved portfolio {}", portfolio.id);
        Ok(portfolio)
    }

    /// Removes the record if present. Deleting an unknown id is a no-op.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut portfolios = self.load_for_write()?;
        let before = portfolios.len();
        portfolios.retain(|p| p.id != id);
        if portfolios.len() == before {
            return Ok(());
        }

        self.persist(&portfolios)?;
        debug!("deleted portfolio {}", id);
        Ok(())
    }

    /// Fresh portfolio id, distinct from every id currently stored.
    pub fn generate_id(&self) -> String {
        let existing = self.list();
        loop {
            let id = Self::generate_entity_id("portfolio");
            if !existing.iter().any(|p| p.id == id) {
                return id;
            }
        }
    }

    pub fn generate_entity_id(kind: &str) -> String {
        format!("{}-{}", kind, Uuid::new_v4().simple())
    }

    /// Strict counterpart of `list` for read-modify-write: an entry that
    /// exists but cannot be read or parsed is an error, never an empty
    /// collection to write over.
    fn load_for_write(&self) -> Result<Vec<Portfolio>, StoreError> {
        let Some(raw) = self.storage.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|e| {
            error!("refusing to overwrite unreadable portfolio data: {}", e);
            StoreError::Serde(e)
        })
    }

    fn persist(&self, portfolios: &[Portfolio]) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(portfolios)?;
        self.storage.set(STORAGE_KEY, &serialized)?;
        Ok(())
    }
}
