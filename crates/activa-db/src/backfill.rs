//! Backfill of dimension ids onto activation keys
//!
//! A key can name a namespace, library or project that has no row yet, or
//! whose row was recreated out of band. When a dimension row is created,
//! every key of the same ecosystem whose text column names it is pointed
//! at the new row, whatever id it held before.

use crate::error::Result;
use crate::models::StoredActivationKey;
use crate::store::{collect_rows, Store};
use activa_core::Dimension;
use tracing::{debug, info};

impl Store {
    /// Point matching activation keys at `dimension`. Returns how many keys
    /// changed.
    pub fn backfill(&self, dimension: &Dimension) -> Result<usize> {
        let rw = self.db.rw_transaction()?;
        // Prefix scan; longer names sharing the prefix are filtered below.
        let lookup = dimension.lookup_key();
        let column = StoredActivationKey::lookup_key_for(dimension.kind);
        let rows: Vec<StoredActivationKey> = {
            let scan = rw.scan().secondary::<StoredActivationKey>(column)?;
            let iter = scan.start_with(lookup.as_str())?;
            collect_rows(iter)?
        };

        let mut linked = 0;
        for row in rows {
            let names_dimension = row
                .dimension_text(dimension.kind)
                .is_some_and(|text| dimension.matches(row.ecosystem, text));
            if !names_dimension || row.dimension_id(dimension.kind) == Some(dimension.id) {
                continue;
            }
            let mut updated = row.clone();
            updated.set_dimension_id(dimension.kind, Some(dimension.id));
            rw.update(row, updated)?;
            linked += 1;
        }
        rw.commit()?;

        if linked > 0 {
            info!(
                kind = %dimension.kind,
                id = dimension.id,
                name = %dimension.name,
                linked,
                "backfilled activation keys"
            );
        } else {
            debug!(kind = %dimension.kind, id = dimension.id, "nothing to backfill");
        }
        Ok(linked)
    }
}
