//! Database store wrapper.
//!
//! All writes go through [`Store::write`]: one read-write transaction per
//! unit of work, committed as a whole. Dimension rows created inside it are
//! backfilled after the commit, in their own transactions.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::models::*;
use activa_core::Dimension;
use native_db::transaction::RwTransaction;
use native_db::*;
use std::fmt::Display;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredNamespace>().unwrap();
    models.define::<StoredLibrary>().unwrap();
    models.define::<StoredProject>().unwrap();
    models.define::<StoredActivationKey>().unwrap();
    models.define::<StoredActivationEvent>().unwrap();
    models.define::<StoredSequence>().unwrap();
    models
});

/// Database store for the activation key directory.
pub struct Store {
    pub(crate) db: Database<'static>,
    pub(crate) config: StoreConfig,
}

/// An open unit of work.
pub(crate) struct Writer<'db> {
    pub(crate) rw: RwTransaction<'db>,
    /// Dimension rows inserted so far, backfilled after commit.
    pub(crate) created: Vec<Dimension>,
}

impl Writer<'_> {
    /// Allocate the next id of `table`.
    pub(crate) fn next_id(&self, table: &str) -> Result<u64> {
        let current: Option<StoredSequence> = self.rw.get().primary(table.to_string())?;
        let next = current.map(|s| s.next).unwrap_or(1);
        self.rw.upsert(StoredSequence {
            table: table.to_string(),
            next: next + 1,
        })?;
        Ok(next)
    }
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(StoreConfig::at(path.as_ref()))
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::with_config(StoreConfig::in_memory())
    }

    /// Open the database described by `config`.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        let db = match &config.path {
            Some(path) => Builder::new().create(&MODELS, path)?,
            None => Builder::new().create_in_memory(&MODELS)?,
        };
        info!(
            path = ?config.path,
            write_attempts = config.write_attempts(),
            backfill = config.backfill,
            "opened store"
        );
        Ok(Self { db, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run `work` as one atomic unit.
    ///
    /// A unit that loses a uniqueness race is rolled back and run again;
    /// its lookups then see the row the other writer committed.
    pub(crate) fn write<T>(&self, mut work: impl FnMut(&mut Writer<'_>) -> Result<T>) -> Result<T> {
        let attempts = self.config.write_attempts();
        let mut conflict = String::new();
        for attempt in 1..=attempts {
            let mut writer = Writer {
                rw: self.db.rw_transaction()?,
                created: Vec::new(),
            };
            match work(&mut writer) {
                Ok(value) => {
                    let Writer { rw, created } = writer;
                    rw.commit()?;
                    self.after_commit(&created);
                    return Ok(value);
                }
                Err(Error::UniquenessRace(detail)) => {
                    // Dropping the transaction aborts it.
                    drop(writer);
                    debug!(attempt, %detail, "unit of work lost a uniqueness race, retrying");
                    conflict = detail;
                }
                Err(err) => return Err(err),
            }
        }
        warn!(attempts, %conflict, "unit of work kept losing uniqueness races");
        Err(Error::Database(format!(
            "write abandoned after {} conflicting attempts: {}",
            attempts, conflict
        )))
    }

    fn after_commit(&self, created: &[Dimension]) {
        if !self.config.backfill {
            return;
        }
        for dimension in created {
            if let Err(err) = self.backfill(dimension) {
                warn!(
                    kind = %dimension.kind,
                    id = dimension.id,
                    error = %err,
                    "backfill failed"
                );
            }
        }
    }
}

/// Collect a scan, surfacing the first row error.
pub(crate) fn collect_rows<T, E: Display>(
    iter: impl Iterator<Item = std::result::Result<T, E>>,
) -> Result<Vec<T>> {
    iter.collect::<std::result::Result<Vec<T>, E>>()
        .map_err(|e| Error::Database(e.to_string()))
}

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
#[cfg(test)]
pub(crate) fn trace_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_ids_are_sequential_per_table() {
        let store = Store::in_memory().unwrap();
        let ids = store
            .write(|w| Ok((w.next_id("a")?, w.next_id("a")?, w.next_id("b")?)))
            .unwrap();
        assert_eq!(ids, (1, 2, 1));
        let next = store.write(|w| w.next_id("a")).unwrap();
        assert_eq!(next, 3);
    }

    #[test]
    fn test_race_is_retried_in_fresh_transaction() {
        trace_tests();
        let store = Store::in_memory().unwrap();
        let calls = Cell::new(0);
        let id = store
            .write(|w| {
                calls.set(calls.get() + 1);
                let id = w.next_id("a")?;
                if calls.get() == 1 {
                    return Err(Error::UniquenessRace("lookup".into()));
                }
                Ok(id)
            })
            .unwrap();
        assert_eq!(calls.get(), 2);
        // The first attempt's id allocation was rolled back.
        assert_eq!(id, 1);
    }

    #[test]
    fn test_race_gives_up_after_configured_attempts() {
        let store = Store::with_config(StoreConfig::in_memory().with_write_attempts(2)).unwrap();
        let calls = Cell::new(0);
        let result: Result<()> = store.write(|_| {
            calls.set(calls.get() + 1);
            Err(Error::UniquenessRace("lookup".into()))
        });
        assert_eq!(calls.get(), 2);
        match result {
            Err(Error::Database(message)) => assert!(message.ends_with(": lookup"), "{}", message),
            other => panic!("expected Database error, got {:?}", other),
        }
    }

    #[test]
    fn test_persistent_duplicate_names_the_key() {
        let store = Store::with_config(StoreConfig::in_memory().with_write_attempts(2)).unwrap();
        let row = |id: u64| StoredNamespace {
            id,
            lookup: "ruby:acme".into(),
            name: "acme".into(),
            ecosystem: activa_core::Ecosystem::Ruby,
            created_at: chrono::Utc::now(),
        };
        store.write(|w| Ok(w.rw.insert(row(1))?)).unwrap();

        let err = store.write(|w| Ok(w.rw.insert(row(2))?)).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::Database(_)));
        assert!(message.contains("after 2 conflicting attempts"), "{}", message);
        // The engine's duplicate-key detail follows the attempt count.
        assert!(!message.trim_end().ends_with(':'), "{}", message);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let store = Store::in_memory().unwrap();
        let calls = Cell::new(0);
        let result: Result<()> = store.write(|_| {
            calls.set(calls.get() + 1);
            Err(Error::NotFound("x".into()))
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_failed_unit_leaves_no_trace() {
        let store = Store::in_memory().unwrap();
        let result: Result<()> = store.write(|w| {
            w.next_id("a")?;
            Err(Error::NotFound("x".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.write(|w| w.next_id("a")).unwrap(), 1);
    }
}
