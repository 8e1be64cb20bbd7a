//! Dimension table models.
//!
//! Namespace, Library and Project are separate tables with the same
//! columns. `lookup` is `"{ecosystem}:{lowercase name}"` and carries the
//! case-insensitive uniqueness constraint.

use activa_core::{Dimension, DimensionKind, Ecosystem};
use chrono::{DateTime, Utc};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored namespace row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredNamespace {
    /// Primary key - namespace ID.
    #[primary_key]
    pub id: u64,
    /// Case-insensitive identity within the ecosystem.
    #[secondary_key(unique)]
    pub lookup: String,
    /// Name as first entered.
    pub name: String,
    pub ecosystem: Ecosystem,
    pub created_at: DateTime<Utc>,
}

/// Stored library row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredLibrary {
    /// Primary key - library ID.
    #[primary_key]
    pub id: u64,
    /// Case-insensitive identity within the ecosystem.
    #[secondary_key(unique)]
    pub lookup: String,
    /// Name as first entered.
    pub name: String,
    pub ecosystem: Ecosystem,
    pub created_at: DateTime<Utc>,
}

/// Stored project row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredProject {
    /// Primary key - project ID.
    #[primary_key]
    pub id: u64,
    /// Case-insensitive identity within the ecosystem.
    #[secondary_key(unique)]
    pub lookup: String,
    /// Name as first entered.
    pub name: String,
    pub ecosystem: Ecosystem,
    pub created_at: DateTime<Utc>,
}

macro_rules! dimension_conversions {
    ($model:ident, $kind:expr) => {
        impl $model {
            /// Create from a domain row.
            pub fn from_dimension(dimension: &Dimension) -> Self {
                Self {
                    id: dimension.id,
                    lookup: dimension.lookup_key(),
                    name: dimension.name.clone(),
                    ecosystem: dimension.ecosystem,
                    created_at: dimension.created_at,
                }
            }

            /// Convert to a domain row.
            pub fn to_dimension(&self) -> Dimension {
                Dimension {
                    id: self.id,
                    kind: $kind,
                    name: self.name.clone(),
                    ecosystem: self.ecosystem,
                    created_at: self.created_at,
                }
            }
        }
    };
}

dimension_conversions!(StoredNamespace, DimensionKind::Namespace);
dimension_conversions!(StoredLibrary, DimensionKind::Library);
dimension_conversions!(StoredProject, DimensionKind::Project);

/// Run `$body` with `$model` aliased to the stored type of `$kind` and
/// `$lookup` bound to its lookup key definition.
macro_rules! with_dimension_model {
    ($kind:expr, $model:ident, $lookup:ident => $body:expr) => {
        match $kind {
            activa_core::DimensionKind::Namespace => {
                type $model = $crate::models::StoredNamespace;
                #[allow(unused_variables)]
                let $lookup = $crate::models::StoredNamespaceKey::lookup;
                $body
            }
            activa_core::DimensionKind::Library => {
                type $model = $crate::models::StoredLibrary;
                #[allow(unused_variables)]
                let $lookup = $crate::models::StoredLibraryKey::lookup;
                $body
            }
            activa_core::DimensionKind::Project => {
                type $model = $crate::models::StoredProject;
                #[allow(unused_variables)]
                let $lookup = $crate::models::StoredProjectKey::lookup;
                $body
            }
        }
    };
}

pub(crate) use with_dimension_model;
