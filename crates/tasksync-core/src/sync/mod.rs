//! Remote task table synchronization.
//!
//! Writes go out through `RemoteSyncClient` and always settle; reads come
//! back as snapshots that `reconcile::ReconciliationLoop` merges into the
//! local store on a fixed interval.

pub mod backend;
pub mod client;
pub mod pending;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod client_tests;

pub use backend::{PostgrestBackend, RestEndpoint, TaskBackend, TaskPatch};
pub use client::{RemoteOutcome, RemoteSyncClient, SnapshotOutcome};
pub use pending::{Expected, PendingMutations};
pub use reconcile::{ReconcileHandle, ReconciliationLoop, DEFAULT_POLL_INTERVAL};
