use crate::store::Collection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("Unreadable {collection} row {id}: {reason}")]
    Corrupt {
        collection: Collection,
        id: String,
        reason: String,
    },
}
