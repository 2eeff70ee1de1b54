//! Persistence over the embedded database
//!
//! Every public method runs in exactly one redb transaction. redb admits a
//! single write transaction at a time, so a read-modify-write inside one
//! write transaction cannot lose a concurrent update.

mod accounts;
mod categories;
mod engagement;
mod links;

use std::sync::Arc;

use redb::{AccessGuard, Database, ReadableTable, WriteTransaction};
use serde::{de::DeserializeOwned, Serialize};

use crate::database::TABLE_SEQUENCES;
use crate::error::Result;

pub use links::Counter;

/// Handle to the application's tables, cheap to clone
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Deserializes an optional JSON value read from a table
fn decode<T: DeserializeOwned>(guard: Option<AccessGuard<'_, &'static str>>) -> Result<Option<T>> {
    match guard {
        Some(raw) => Ok(Some(serde_json::from_str(raw.value())?)),
        None => Ok(None),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Allocates the next integer id of a named sequence, starting at 1
fn next_id(txn: &WriteTransaction, sequence: &str) -> Result<u64> {
    let mut table = txn.open_table(TABLE_SEQUENCES)?;
    let next = table.get(sequence)?.map(|current| current.value()).unwrap_or(0) + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

/// Half-open bounds covering every key that starts with `"{prefix}:"`.
/// `;` is the byte right after `:`.
fn prefix_range(prefix: &str) -> (String, String) {
    (format!("{prefix}:"), format!("{prefix};"))
}
