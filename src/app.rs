use crate::aggregation::{BudgetSummary, aggregate};
use crate::error::StoreError;
use crate::models::allocation::Allocation;
use crate::models::record::Record;
use crate::models::transaction::Transaction;
use crate::report::{Views, project_options, render_views};
use crate::store::{Collection, RecordStore, Snapshot};
use std::sync::mpsc::{Receiver, TryRecvError};

/// Owns the store handle, the two collection caches and everything derived
/// from them.
///
/// Caches are only replaced wholesale from snapshots; derived data is
/// recomputed from scratch after every replacement.
pub struct AppContext<S: RecordStore> {
    store: S,
    receivers: Vec<Receiver<Snapshot>>,
    allocations: Vec<Record<Allocation>>,
    transactions: Vec<Record<Transaction>>,
    summary: BudgetSummary,
    views: Views,
    projects: Vec<String>,
}

impl<S: RecordStore> AppContext<S> {
    /// Subscribes to both collections and applies their initial snapshots.
    pub fn new(mut store: S) -> Result<Self, StoreError> {
        let receivers = vec![
            store.subscribe(Collection::Allocations)?,
            store.subscribe(Collection::Transactions)?,
        ];
        let summary = BudgetSummary::default();
        let views = render_views(&[], &[], &summary);
        let mut ctx = Self {
            store,
            receivers,
            allocations: Vec::new(),
            transactions: Vec::new(),
            summary,
            views,
            projects: Vec::new(),
        };
        ctx.pump_snapshots();
        Ok(ctx)
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn allocations(&self) -> &[Record<Allocation>] {
        &self.allocations
    }

    pub fn transactions(&self) -> &[Record<Transaction>] {
        &self.transactions
    }

    pub fn summary(&self) -> &BudgetSummary {
        &self.summary
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    /// Project names offered by the transaction form.
    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// Asks the store for changes made elsewhere; failures are logged only.
    pub fn poll_store(&mut self) {
        if let Err(e) = self.store.poll_changes() {
            tracing::error!(error = %e, "failed to poll store for changes");
        }
    }

    /// Applies every pending snapshot and recomputes once if any arrived.
    /// Returns whether anything changed.
    pub fn pump_snapshots(&mut self) -> bool {
        let mut changed = false;
        for receiver in &self.receivers {
            loop {
                match receiver.try_recv() {
                    Ok(snapshot) => {
                        let collection = snapshot.collection();
                        match snapshot {
                            Snapshot::Allocations(records) => self.allocations = records,
                            Snapshot::Transactions(records) => self.transactions = records,
                        }
                        tracing::debug!(%collection, "cache replaced from snapshot");
                        changed = true;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::warn!("snapshot channel closed");
                        break;
                    }
                }
            }
        }
        if changed {
            self.recompute();
        }
        changed
    }

    fn recompute(&mut self) {
        self.summary = aggregate(&self.allocations, &self.transactions);
        self.views = render_views(&self.allocations, &self.transactions, &self.summary);
        self.projects = project_options(&self.allocations);
    }
}
