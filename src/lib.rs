//! storesync — dual-store synchronization engine.
//!
//! Keeps a local persistent key-value cache and a hosted relational remote
//! store consistent for a closed set of collections. The remote may be
//! unreachable or entirely unconfigured at any time; every public operation
//! decides per call whether to take the remote path or degrade to
//! local-only, and always returns a usable result instead of raising.
//!
//! Entry point is [`SyncOrchestrator`], which owns per-collection sync
//! status and exposes `push` / `pull` / `sync_all`. The network and cache
//! seams are the [`remote::RemoteStore`] and [`cache::LocalCache`] traits.

pub mod error;
pub mod types;

pub mod batch;
pub mod cache;
pub mod collection;
pub mod events;
pub mod fallback;
pub mod orchestrator;
pub mod realtime;
pub mod remote;
pub mod transcode;

pub use collection::Collection;
pub use error::{Result, SyncEngineError};
pub use orchestrator::SyncOrchestrator;
pub use types::{SyncDirection, SyncOutcome};
