use super::notification::Notification;
use crate::forms::{AllocationForm, TransactionForm};
use crate::store::{Collection, Payload, RecordStore};
use chrono::Utc;

/// Creates or, when the form is editing a record, fully replaces an allocation.
///
/// Failures are logged and reported; the caller keeps the form filled so
/// the user can try again.
pub fn save_allocation(store: &mut impl RecordStore, form: &AllocationForm) -> Notification {
    let allocation = match form.validate() {
        Ok(allocation) => allocation,
        Err(message) => return Notification::error(message),
    };

    let result = match form.editing_id.as_deref() {
        Some(id) => store
            .replace(id, Payload::Allocation(allocation))
            .map(|_| id.to_string()),
        None => store.create(Payload::Allocation(allocation)),
    };

    match (result, form.editing_id.is_some()) {
        (Ok(id), true) => {
            tracing::info!(%id, "allocation updated");
            Notification::success("Allocation updated")
        }
        (Ok(id), false) => {
            tracing::info!(%id, "allocation created");
            Notification::success("Allocation saved")
        }
        (Err(e), _) => {
            tracing::error!(error = %e, "failed to save allocation");
            Notification::error("Failed to save allocation")
        }
    }
}

pub fn delete_allocation(store: &mut impl RecordStore, id: &str) -> Notification {
    match store.delete(Collection::Allocations, id) {
        Ok(()) => {
            tracing::info!(%id, "allocation deleted");
            Notification::success("Allocation deleted")
        }
        Err(e) => {
            tracing::error!(%id, error = %e, "failed to delete allocation");
            Notification::error("Failed to delete allocation")
        }
    }
}

pub fn save_transaction(store: &mut impl RecordStore, form: &TransactionForm) -> Notification {
    let transaction = match form.validate(Utc::now()) {
        Ok(transaction) => transaction,
        Err(message) => return Notification::error(message),
    };

    let result = match form.editing_id() {
        Some(id) => store
            .replace(id, Payload::Transaction(transaction))
            .map(|_| id.to_string()),
        None => store.create(Payload::Transaction(transaction)),
    };

    match (result, form.editing.is_some()) {
        (Ok(id), true) => {
            tracing::info!(%id, "budget control entry updated");
            Notification::success("Budget control entry updated")
        }
        (Ok(id), false) => {
            tracing::info!(%id, "budget control entry created");
            Notification::success("Budget control entry saved")
        }
        (Err(e), _) => {
            tracing::error!(error = %e, "failed to save budget control entry");
            Notification::error("Failed to save budget control entry")
        }
    }
}

pub fn delete_transaction(store: &mut impl RecordStore, id: &str) -> Notification {
    match store.delete(Collection::Transactions, id) {
        Ok(()) => {
            tracing::info!(%id, "budget control entry deleted");
            Notification::success("Budget control entry deleted")
        }
        Err(e) => {
            tracing::error!(%id, error = %e, "failed to delete budget control entry");
            Notification::error("Failed to delete budget control entry")
        }
    }
}
