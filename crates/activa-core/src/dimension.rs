//! Namespace, Library and Project rows
//!
//! The three tables share one shape: a name unique per ecosystem, compared
//! case-insensitively. [`DimensionKind`] names the table.

use crate::ecosystem::Ecosystem;
use crate::identity::{LibraryId, NamespaceId, ProjectId};
use crate::validation::{
    check_length, is_blank, ValidationErrors, BLANK, MAX_NAME_LEN, NOT_INCLUDED,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which dimension table a row lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    Namespace,
    Library,
    Project,
}

impl DimensionKind {
    pub const ALL: [DimensionKind; 3] = [
        DimensionKind::Namespace,
        DimensionKind::Library,
        DimensionKind::Project,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKind::Namespace => "namespace",
            DimensionKind::Library => "library",
            DimensionKind::Project => "project",
        }
    }

    /// Shortest accepted name
    pub fn min_name_len(&self) -> usize {
        match self {
            DimensionKind::Project => 2,
            DimensionKind::Namespace | DimensionKind::Library => 1,
        }
    }

    /// The activation key column holding this dimension's name as text
    pub fn key_field(&self) -> &'static str {
        match self {
            DimensionKind::Namespace => "namespace",
            DimensionKind::Library => "library_name",
            DimensionKind::Project => "project_name",
        }
    }

    /// Presence and length problems with `name`, reported under `name`.
    pub fn name_errors(&self, name: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if is_blank(name) {
            errors.add("name", BLANK);
        } else {
            check_length(&mut errors, "name", name, self.min_name_len(), MAX_NAME_LEN);
        }
        errors
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive identity of a dimension row within its table.
pub fn lookup_key(ecosystem: Ecosystem, name: &str) -> String {
    format!("{}:{}", ecosystem.as_str(), name.to_lowercase())
}

/// A Namespace, Library or Project row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: u64,
    pub kind: DimensionKind,
    pub name: String,
    pub ecosystem: Ecosystem,
    pub created_at: DateTime<Utc>,
}

impl Dimension {
    pub fn lookup_key(&self) -> String {
        lookup_key(self.ecosystem, &self.name)
    }

    /// Whether `name` refers to this row (same ecosystem, case-insensitive).
    pub fn matches(&self, ecosystem: Ecosystem, name: &str) -> bool {
        self.ecosystem == ecosystem && self.name.to_lowercase() == name.to_lowercase()
    }

    pub fn namespace_id(&self) -> Option<NamespaceId> {
        (self.kind == DimensionKind::Namespace).then(|| NamespaceId::new(self.id))
    }

    pub fn library_id(&self) -> Option<LibraryId> {
        (self.kind == DimensionKind::Library).then(|| LibraryId::new(self.id))
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        (self.kind == DimensionKind::Project).then(|| ProjectId::new(self.id))
    }
}

/// Raw input for an explicit dimension create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionParams {
    pub name: String,
    pub ecosystem: String,
}

impl DimensionParams {
    pub fn new(name: impl Into<String>, ecosystem: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ecosystem: ecosystem.into(),
        }
    }

    /// The parsed ecosystem, when valid
    pub fn ecosystem(&self) -> Option<Ecosystem> {
        self.ecosystem.parse().ok()
    }

    /// Everything that can be checked without the store.
    pub fn validate(&self, kind: DimensionKind) -> ValidationErrors {
        let mut errors = kind.name_errors(&self.name);
        if is_blank(&self.ecosystem) {
            errors.add("ecosystem", BLANK);
        } else if self.ecosystem().is_none() {
            errors.add("ecosystem", NOT_INCLUDED);
        }
        errors
    }
}
