use super::{Collection, Payload, RecordStore, Snapshot};
use crate::db::{allocation_repository, connection, transaction_repository};
use crate::error::StoreError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use uuid::Uuid;

struct Subscriber {
    collection: Collection,
    sender: Sender<Snapshot>,
}

/// Record store backed by a local SQLite file.
///
/// Snapshots are pushed after every write made through this handle. Writes
/// made by other processes sharing the file are picked up by
/// [`RecordStore::poll_changes`] through SQLite's `data_version` counter.
pub struct SqliteStore {
    conn: Connection,
    subscribers: Vec<Subscriber>,
    data_version: i64,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = connection::establish_connection(path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = connection::establish_test_connection()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let data_version = read_data_version(&conn)?;
        Ok(Self {
            conn,
            subscribers: Vec::new(),
            data_version,
        })
    }

    fn snapshot(&self, collection: Collection) -> Result<Snapshot, StoreError> {
        Ok(match collection {
            Collection::Allocations => {
                Snapshot::Allocations(allocation_repository::get_all_allocations(&self.conn)?)
            }
            Collection::Transactions => {
                Snapshot::Transactions(transaction_repository::get_all_transactions(&self.conn)?)
            }
        })
    }

    fn publish(&mut self, collection: Collection) -> Result<(), StoreError> {
        if !self.subscribers.iter().any(|s| s.collection == collection) {
            return Ok(());
        }
        let snapshot = self.snapshot(collection)?;

        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| {
            subscriber.collection != collection || subscriber.sender.send(snapshot.clone()).is_ok()
        });
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            tracing::warn!(%collection, dropped, "pruned closed snapshot subscribers");
        }
        tracing::debug!(%collection, "snapshot pushed");
        Ok(())
    }

    /// A committed write is never reported as failed because its snapshot
    /// could not be pushed; listeners catch up on the next push.
    fn publish_after_write(&mut self, collection: Collection) {
        if let Err(e) = self.publish(collection) {
            tracing::error!(%collection, error = %e, "failed to push snapshot");
        }
    }
}

impl RecordStore for SqliteStore {
    fn subscribe(&mut self, collection: Collection) -> Result<Receiver<Snapshot>, StoreError> {
        let (sender, receiver) = mpsc::channel();
        let snapshot = self.snapshot(collection)?;
        // the receiver is still in hand, so this cannot fail
        let _ = sender.send(snapshot);
        self.subscribers.push(Subscriber { collection, sender });
        tracing::debug!(%collection, "subscriber registered");
        Ok(receiver)
    }

    fn create(&mut self, payload: Payload) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        match &payload {
            Payload::Allocation(allocation) => {
                allocation_repository::insert_allocation(&self.conn, &id, allocation)?
            }
            Payload::Transaction(transaction) => {
                transaction_repository::insert_transaction(&self.conn, &id, transaction)?
            }
        }
        self.publish_after_write(payload.collection());
        Ok(id)
    }

    fn replace(&mut self, id: &str, payload: Payload) -> Result<(), StoreError> {
        match &payload {
            Payload::Allocation(allocation) => {
                allocation_repository::replace_allocation(&self.conn, id, allocation)?
            }
            Payload::Transaction(transaction) => {
                transaction_repository::replace_transaction(&self.conn, id, transaction)?
            }
        }
        self.publish_after_write(payload.collection());
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        match collection {
            Collection::Allocations => allocation_repository::delete_allocation(&self.conn, id)?,
            Collection::Transactions => transaction_repository::delete_transaction(&self.conn, id)?,
        }
        self.publish_after_write(collection);
        Ok(())
    }

    fn poll_changes(&mut self) -> Result<(), StoreError> {
        let version = read_data_version(&self.conn)?;
        if version == self.data_version {
            return Ok(());
        }
        self.data_version = version;
        tracing::info!("database changed by another client, refreshing");
        self.publish(Collection::Allocations)?;
        self.publish(Collection::Transactions)
    }
}

fn read_data_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?)
}
