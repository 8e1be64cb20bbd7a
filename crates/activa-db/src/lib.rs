//! Activa DB - Storage for the activation key directory using native_db
//!
//! Provides:
//! - `Store`, a native_db (redb) database with one table per record kind
//! - Atomic key writes that resolve Namespace, Library and Project rows
//! - Post-commit backfill of dimension ids onto orphaned keys
//! - Append-only activation events with a per-key counter cache
//! - Search, ecosystem filtering and sorting over committed rows
//!
//! Keys and events are never deleted; the destroy operations exist only to
//! refuse.

mod backfill;
mod config;
mod error;
mod events;
mod keys;
mod models;
mod queries;
mod resolver;
mod store;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use events::EVENT_NOT_DELETABLE;
pub use keys::KEY_NOT_DELETABLE;
pub use resolver::Resolved;
pub use store::Store;
