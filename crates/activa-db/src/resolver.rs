//! Dimension resolution
//!
//! Maps the free-text namespace, library and project names on a key write
//! to dimension rows, creating rows on first use. The lookup is by
//! `(lowercase name, ecosystem)`, so "Acme" and "acme" resolve to the same
//! row.
//!
//! Two writers can both miss the lookup for a brand-new name. The loser's
//! insert trips the unique `lookup` key and comes back as
//! [`Error::UniquenessRace`]; [`Store::write`] rolls that unit back and runs
//! it again, and the second lookup finds the winner's row.

use crate::error::{Error, Result};
use crate::models::with_dimension_model;
use crate::store::{Store, Writer};
use activa_core::validation::TAKEN;
use activa_core::{
    lookup_key, Dimension, DimensionKind, DimensionParams, Ecosystem, ValidationErrors,
};
use chrono::Utc;
use tracing::debug;

/// Lookup and insert for the three dimension tables.
pub(crate) trait DimensionTable {
    /// Row matching `name` case-insensitively within `ecosystem`.
    fn find(
        &self,
        kind: DimensionKind,
        ecosystem: Ecosystem,
        name: &str,
    ) -> Result<Option<Dimension>>;

    /// Insert a new row. A case-insensitive duplicate fails with
    /// [`Error::UniquenessRace`].
    fn insert(
        &mut self,
        kind: DimensionKind,
        ecosystem: Ecosystem,
        name: &str,
    ) -> Result<Dimension>;
}

/// Outcome of [`resolve_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub dimension: Dimension,
    /// The row did not exist before this call.
    pub created: bool,
}

/// Find the row for `name` or create it.
pub(crate) fn resolve_or_create<T: DimensionTable + ?Sized>(
    table: &mut T,
    kind: DimensionKind,
    ecosystem: Ecosystem,
    name: &str,
) -> Result<Resolved> {
    if let Some(dimension) = table.find(kind, ecosystem, name)? {
        return Ok(Resolved {
            dimension,
            created: false,
        });
    }
    let dimension = table.insert(kind, ecosystem, name)?;
    Ok(Resolved {
        dimension,
        created: true,
    })
}

impl DimensionTable for Writer<'_> {
    fn find(
        &self,
        kind: DimensionKind,
        ecosystem: Ecosystem,
        name: &str,
    ) -> Result<Option<Dimension>> {
        let key = lookup_key(ecosystem, name);
        with_dimension_model!(kind, Stored, by_lookup => {
            let found: Option<Stored> = self.rw.get().secondary(by_lookup, key)?;
            Ok(found.map(|row| row.to_dimension()))
        })
    }

    fn insert(
        &mut self,
        kind: DimensionKind,
        ecosystem: Ecosystem,
        name: &str,
    ) -> Result<Dimension> {
        let dimension = Dimension {
            id: self.next_id(kind.as_str())?,
            kind,
            name: name.to_string(),
            ecosystem,
            created_at: Utc::now(),
        };
        with_dimension_model!(kind, Stored, _lookup => {
            self.rw.insert(Stored::from_dimension(&dimension))?;
        });
        debug!(%kind, id = dimension.id, name, %ecosystem, "created dimension row");
        self.created.push(dimension.clone());
        Ok(dimension)
    }
}

impl Store {
    /// Find or create a dimension row as its own unit of work.
    pub fn resolve_dimension(
        &self,
        kind: DimensionKind,
        name: &str,
        ecosystem: Ecosystem,
    ) -> Result<Resolved> {
        kind.name_errors(name).into_result()?;
        self.write(|w| resolve_or_create(w, kind, ecosystem, name))
    }

    /// Create a dimension row explicitly, rejecting case-insensitive
    /// duplicates.
    pub fn create_dimension(
        &self,
        kind: DimensionKind,
        params: &DimensionParams,
    ) -> Result<Dimension> {
        params.validate(kind).into_result()?;
        let ecosystem: Ecosystem = params.ecosystem.parse()?;
        self.write(|w| {
            if w.find(kind, ecosystem, &params.name)?.is_some() {
                let mut errors = ValidationErrors::new();
                errors.add("name", TAKEN);
                return Err(Error::Validation(errors));
            }
            w.insert(kind, ecosystem, &params.name)
        })
    }

    /// Load one dimension row.
    pub fn dimension(&self, kind: DimensionKind, id: u64) -> Result<Dimension> {
        let r = self.db.r_transaction()?;
        let found = with_dimension_model!(kind, Stored, _lookup => {
            let row: Option<Stored> = r.get().primary(id)?;
            row.map(|row| row.to_dimension())
        });
        found.ok_or_else(|| Error::NotFound(format!("{}:{}", kind, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// In-memory table that can pretend another writer got there first.
    #[derive(Default)]
    struct FakeTable {
        rows: HashMap<String, Dimension>,
        next: u64,
        lose_next_insert: bool,
    }

    impl DimensionTable for FakeTable {
        fn find(
            &self,
            kind: DimensionKind,
            ecosystem: Ecosystem,
            name: &str,
        ) -> Result<Option<Dimension>> {
            let key = format!("{}/{}", kind, lookup_key(ecosystem, name));
            Ok(self.rows.get(&key).cloned())
        }

        fn insert(
            &mut self,
            kind: DimensionKind,
            ecosystem: Ecosystem,
            name: &str,
        ) -> Result<Dimension> {
            if self.lose_next_insert {
                self.lose_next_insert = false;
                return Err(Error::UniquenessRace("lookup".into()));
            }
            self.next += 1;
            let dimension = Dimension {
                id: self.next,
                kind,
                name: name.to_string(),
                ecosystem,
                created_at: Utc::now(),
            };
            let key = format!("{}/{}", kind, dimension.lookup_key());
            self.rows.insert(key, dimension.clone());
            Ok(dimension)
        }
    }

    fn resolve(
        table: &mut FakeTable,
        kind: DimensionKind,
        ecosystem: Ecosystem,
        name: &str,
    ) -> Resolved {
        resolve_or_create(table, kind, ecosystem, name).unwrap()
    }

    #[test]
    fn test_creates_then_reuses() {
        let mut table = FakeTable::default();
        let first = resolve(&mut table, DimensionKind::Library, Ecosystem::Ruby, "Lib");
        assert!(first.created);

        let second = resolve(&mut table, DimensionKind::Library, Ecosystem::Ruby, "LIB");
        assert!(!second.created);
        assert_eq!(second.dimension.id, first.dimension.id);
        assert_eq!(second.dimension.name, "Lib");
    }

    #[test]
    fn test_scoped_by_kind_and_ecosystem() {
        let mut table = FakeTable::default();
        let ruby = resolve(&mut table, DimensionKind::Library, Ecosystem::Ruby, "lib");
        let python = resolve(&mut table, DimensionKind::Library, Ecosystem::Python, "lib");
        let project = resolve(&mut table, DimensionKind::Project, Ecosystem::Ruby, "lib");
        assert!(ruby.created && python.created && project.created);
        assert_ne!(ruby.dimension.id, python.dimension.id);
    }

    #[test]
    fn test_lost_race_is_reported_for_retry() {
        let mut table = FakeTable {
            lose_next_insert: true,
            ..Default::default()
        };
        let err = resolve_or_create(&mut table, DimensionKind::Namespace, Ecosystem::Go, "acme")
            .unwrap_err();
        assert!(matches!(err, Error::UniquenessRace(_)));
    }

    #[test]
    fn test_store_resolve_is_idempotent() {
        let store = Store::in_memory().unwrap();
        let first = store
            .resolve_dimension(DimensionKind::Namespace, "Acme", Ecosystem::Ruby)
            .unwrap();
        let second = store
            .resolve_dimension(DimensionKind::Namespace, "acme", Ecosystem::Ruby)
            .unwrap();
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.dimension, second.dimension);
        assert_eq!(
            store.dimension(DimensionKind::Namespace, first.dimension.id).unwrap(),
            first.dimension
        );
    }

    #[test]
    fn test_engine_duplicate_is_retried_and_reread() {
        let store = Store::in_memory().unwrap();
        let existing = store
            .resolve_dimension(DimensionKind::Namespace, "acme", Ecosystem::Ruby)
            .unwrap()
            .dimension;

        let calls = Cell::new(0);
        let resolved = store
            .write(|w| {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    // Behaves like a writer that missed the committed row.
                    w.insert(DimensionKind::Namespace, Ecosystem::Ruby, "ACME")?;
                }
                resolve_or_create(w, DimensionKind::Namespace, Ecosystem::Ruby, "ACME")
            })
            .unwrap();

        assert_eq!(calls.get(), 2);
        assert!(!resolved.created);
        assert_eq!(resolved.dimension, existing);
        assert_eq!(store.dimensions(DimensionKind::Namespace).unwrap().len(), 1);
    }

    #[test]
    fn test_store_resolve_rejects_blank() {
        let store = Store::in_memory().unwrap();
        let err = store
            .resolve_dimension(DimensionKind::Namespace, "  ", Ecosystem::Ruby)
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains("name"));
    }

    #[test]
    fn test_create_dimension_rejects_duplicates() {
        let store = Store::in_memory().unwrap();
        let lib = store
            .create_dimension(DimensionKind::Library, &DimensionParams::new("Lib", "ruby"))
            .unwrap();
        assert_eq!(lib.name, "Lib");

        let err = store
            .create_dimension(DimensionKind::Library, &DimensionParams::new("lib", "ruby"))
            .unwrap_err();
        assert_eq!(err.validation_errors().unwrap().get("name"), &[TAKEN.to_string()]);

        // Same name in another ecosystem or table is fine.
        store
            .create_dimension(DimensionKind::Library, &DimensionParams::new("lib", "python"))
            .unwrap();
        store
            .create_dimension(DimensionKind::Project, &DimensionParams::new("lib", "ruby"))
            .unwrap();
    }

    #[test]
    fn test_create_dimension_validates() {
        let store = Store::in_memory().unwrap();
        let err = store
            .create_dimension(DimensionKind::Project, &DimensionParams::new("p", "cobol"))
            .unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.contains("name"));
        assert!(errors.contains("ecosystem"));
    }

    #[test]
    fn test_missing_dimension() {
        let store = Store::in_memory().unwrap();
        let err = store.dimension(DimensionKind::Project, 99).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
