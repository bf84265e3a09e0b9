//! Record store seam.
//!
//! A store persists the two collections and pushes a full snapshot of a
//! collection to every subscriber whenever that collection changes.
//! Subscribers receive snapshots over a channel and replace their cache
//! wholesale; nothing is merged.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::allocation::Allocation;
use crate::models::record::Record;
use crate::models::transaction::Transaction;
use std::fmt;
use std::sync::mpsc::Receiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Allocations,
    Transactions,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Allocations => "allocations",
            Collection::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The complete current contents of one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Allocations(Vec<Record<Allocation>>),
    Transactions(Vec<Record<Transaction>>),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Snapshot::Allocations(_) => Collection::Allocations,
            Snapshot::Transactions(_) => Collection::Transactions,
        }
    }
}

/// A full document body submitted on create or replace.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Allocation(Allocation),
    Transaction(Transaction),
}

impl Payload {
    pub fn collection(&self) -> Collection {
        match self {
            Payload::Allocation(_) => Collection::Allocations,
            Payload::Transaction(_) => Collection::Transactions,
        }
    }
}

pub trait RecordStore {
    /// Registers a listener. The current snapshot is sent immediately, then
    /// again after every change to the collection.
    fn subscribe(&mut self, collection: Collection) -> Result<Receiver<Snapshot>, StoreError>;

    /// Stores a new record and returns its assigned id.
    fn create(&mut self, payload: Payload) -> Result<String, StoreError>;

    /// Replaces every field of the record with the given id.
    fn replace(&mut self, id: &str, payload: Payload) -> Result<(), StoreError>;

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// Pushes fresh snapshots when the backing data changed outside this
    /// handle. Stores that only change through their own calls need nothing.
    fn poll_changes(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
