//! Listing queries over committed rows.

use crate::error::Result;
use crate::models::*;
use crate::store::{collect_rows, Store};
use activa_core::search::sort_rows;
use activa_core::{ActivationKey, Dimension, DimensionKind, Ecosystem, Query, Sort};

impl Store {
    /// Every activation key, by id.
    pub fn activation_keys(&self) -> Result<Vec<ActivationKey>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<StoredActivationKey>()?;
        let iter = scan.all()?;
        let rows: Vec<StoredActivationKey> = collect_rows(iter)?;
        Ok(rows.iter().map(|row| row.to_activation_key()).collect())
    }

    /// Search, filter and order activation keys.
    pub fn search_activation_keys(&self, query: &Query) -> Result<Vec<ActivationKey>> {
        Ok(query.apply(self.activation_keys()?))
    }

    /// Every row of one dimension table, by id.
    pub fn dimensions(&self, kind: DimensionKind) -> Result<Vec<Dimension>> {
        let r = self.db.r_transaction()?;
        with_dimension_model!(kind, Stored, _lookup => {
            let scan = r.scan().primary::<Stored>()?;
            let iter = scan.all()?;
            let rows: Vec<Stored> = collect_rows(iter)?;
            Ok(rows.iter().map(|row| row.to_dimension()).collect())
        })
    }

    /// Search, filter and order one dimension table.
    pub fn search_dimensions(&self, kind: DimensionKind, query: &Query) -> Result<Vec<Dimension>> {
        Ok(query.apply(self.dimensions(kind)?))
    }

    /// Dimension rows of one ecosystem, alphabetically.
    pub fn dimensions_in(
        &self,
        kind: DimensionKind,
        ecosystem: Ecosystem,
    ) -> Result<Vec<Dimension>> {
        let r = self.db.r_transaction()?;
        let prefix = format!("{}:", ecosystem.as_str());
        let mut found: Vec<Dimension> = with_dimension_model!(kind, Stored, by_lookup => {
            let scan = r.scan().secondary::<Stored>(by_lookup)?;
            let iter = scan.start_with(prefix.as_str())?;
            let rows: Vec<Stored> = collect_rows(iter)?;
            rows.iter().map(|row| row.to_dimension()).collect()
        });
        sort_rows(&mut found, Sort::AZ);
        Ok(found)
    }

    /// Ecosystems with at least one activation key, in list order.
    pub fn ecosystems_in_use(&self) -> Result<Vec<Ecosystem>> {
        let keys = self.activation_keys()?;
        Ok(Ecosystem::list()
            .iter()
            .copied()
            .filter(|ecosystem| keys.iter().any(|key| key.ecosystem == *ecosystem))
            .collect())
    }
}
