//! Activation keys
//!
//! The free-text columns (`namespace`, `library_name`, `project_name`) are
//! the source of truth; the id columns are derived from them on every
//! write.

use crate::dimension::DimensionKind;
use crate::ecosystem::Ecosystem;
use crate::identity::{ActivationKeyId, LibraryId, NamespaceId, ProjectId};
use crate::validation::{
    check_length, is_blank, is_valid_project_name, present, ValidationErrors, BLANK,
    MAX_NAME_LEN, NOT_INCLUDED, PROJECT_NAME_FORMAT, TAKEN,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Case-insensitive identity of `namespace/key`.
///
/// The namespace length prefix keeps the encoding unambiguous when either
/// part contains a `/`.
pub fn handle(namespace: &str, key: &str) -> String {
    let namespace = namespace.to_lowercase();
    format!("{}:{}/{}", namespace.len(), namespace, key.to_lowercase())
}

/// A stored activation key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationKey {
    pub id: ActivationKeyId,
    pub namespace: String,
    pub key: String,
    pub ecosystem: Ecosystem,
    pub library_name: String,
    pub project_name: Option<String>,
    pub project_url: Option<String>,
    pub featured: bool,
    pub free_for_open_source: bool,
    pub retired: bool,
    pub activation_event_count: u64,
    /// Always set by the write path; `None` only on rows that predate their
    /// Namespace row and await backfill.
    pub namespace_id: Option<NamespaceId>,
    pub library_id: Option<LibraryId>,
    pub project_id: Option<ProjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivationKey {
    /// `namespace/key` as shown to users
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.namespace, self.key)
    }

    pub fn handle(&self) -> String {
        handle(&self.namespace, &self.key)
    }

    /// Denormalized text for the given dimension.
    pub fn dimension_name(&self, kind: DimensionKind) -> Option<&str> {
        match kind {
            DimensionKind::Namespace => Some(self.namespace.as_str()),
            DimensionKind::Library => Some(self.library_name.as_str()),
            DimensionKind::Project => self.project_name.as_deref(),
        }
    }

    /// Raw id stored for the given dimension.
    pub fn dimension_id(&self, kind: DimensionKind) -> Option<u64> {
        match kind {
            DimensionKind::Namespace => self.namespace_id.map(|id| id.raw()),
            DimensionKind::Library => self.library_id.map(|id| id.raw()),
            DimensionKind::Project => self.project_id.map(|id| id.raw()),
        }
    }
}

/// Values submitted to create an activation key, or the merged values of
/// an update. Kept as entered so a rejected write can be redisplayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationKeyParams {
    pub namespace: String,
    pub key: String,
    pub ecosystem: String,
    pub library_name: String,
    pub project_name: Option<String>,
    pub project_url: Option<String>,
    pub featured: bool,
    pub free_for_open_source: bool,
    pub retired: bool,
}

impl ActivationKeyParams {
    pub fn new(
        namespace: impl Into<String>,
        key: impl Into<String>,
        ecosystem: impl Into<String>,
        library_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            ecosystem: ecosystem.into(),
            library_name: library_name.into(),
            ..Self::default()
        }
    }

    pub fn with_project(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self.project_url = Some(url.into());
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn free_for_open_source(mut self, value: bool) -> Self {
        self.free_for_open_source = value;
        self
    }

    pub fn featured(mut self, value: bool) -> Self {
        self.featured = value;
        self
    }

    pub fn retired(mut self, value: bool) -> Self {
        self.retired = value;
        self
    }

    /// The parsed ecosystem, when valid
    pub fn ecosystem(&self) -> Option<Ecosystem> {
        self.ecosystem.parse().ok()
    }

    pub fn project_name(&self) -> Option<&str> {
        present(self.project_name.as_deref())
    }

    pub fn project_url(&self) -> Option<&str> {
        present(self.project_url.as_deref())
    }

    pub fn handle(&self) -> String {
        handle(&self.namespace, &self.key)
    }

    /// Text for the given dimension, `None` when blank.
    pub fn dimension_name(&self, kind: DimensionKind) -> Option<&str> {
        match kind {
            DimensionKind::Namespace => present(Some(self.namespace.as_str())),
            DimensionKind::Library => present(Some(self.library_name.as_str())),
            DimensionKind::Project => self.project_name(),
        }
    }

    /// Validate in write order: presence, key uniqueness, project rules,
    /// then dimension name limits. `key_taken` comes from the store.
    pub fn validate(&self, key_taken: bool) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if is_blank(&self.namespace) {
            errors.add("namespace", BLANK);
        }
        if is_blank(&self.key) {
            errors.add("key", BLANK);
        }
        if is_blank(&self.ecosystem) {
            errors.add("ecosystem", BLANK);
        } else if self.ecosystem().is_none() {
            errors.add("ecosystem", NOT_INCLUDED);
        }
        if is_blank(&self.library_name) {
            errors.add("library_name", BLANK);
        }

        if key_taken && !is_blank(&self.key) {
            errors.add("key", TAKEN);
        }

        match self.project_name() {
            Some(name) => {
                check_length(&mut errors, "project_name", name, 2, MAX_NAME_LEN);
                if !is_valid_project_name(name) {
                    errors.add("project_name", PROJECT_NAME_FORMAT);
                }
            }
            None if self.free_for_open_source => errors.add("project_name", BLANK),
            None => {}
        }
        if self.free_for_open_source && self.project_url().is_none() {
            errors.add("project_url", BLANK);
        }

        for kind in [DimensionKind::Namespace, DimensionKind::Library] {
            if let Some(name) = self.dimension_name(kind) {
                errors.merge_as(kind.key_field(), kind.name_errors(name));
            }
        }

        errors
    }

    /// Apply a partial update on top of these values.
    pub fn apply(mut self, changes: &ActivationKeyChanges) -> Self {
        if let Some(namespace) = &changes.namespace {
            self.namespace = namespace.clone();
        }
        if let Some(key) = &changes.key {
            self.key = key.clone();
        }
        if let Some(ecosystem) = &changes.ecosystem {
            self.ecosystem = ecosystem.clone();
        }
        if let Some(library_name) = &changes.library_name {
            self.library_name = library_name.clone();
        }
        if let Some(project_name) = &changes.project_name {
            self.project_name = present(Some(project_name.as_str())).map(str::to_string);
        }
        if let Some(project_url) = &changes.project_url {
            self.project_url = present(Some(project_url.as_str())).map(str::to_string);
        }
        if let Some(featured) = changes.featured {
            self.featured = featured;
        }
        if let Some(free) = changes.free_for_open_source {
            self.free_for_open_source = free;
        }
        if let Some(retired) = changes.retired {
            self.retired = retired;
        }
        self
    }
}

impl From<&ActivationKey> for ActivationKeyParams {
    fn from(key: &ActivationKey) -> Self {
        Self {
            namespace: key.namespace.clone(),
            key: key.key.clone(),
            ecosystem: key.ecosystem.as_str().to_string(),
            library_name: key.library_name.clone(),
            project_name: key.project_name.clone(),
            project_url: key.project_url.clone(),
            featured: key.featured,
            free_for_open_source: key.free_for_open_source,
            retired: key.retired,
        }
    }
}

/// A partial update. `None` leaves a field alone; a blank `project_name`
/// or `project_url` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationKeyChanges {
    pub namespace: Option<String>,
    pub key: Option<String>,
    pub ecosystem: Option<String>,
    pub library_name: Option<String>,
    pub project_name: Option<String>,
    pub project_url: Option<String>,
    pub featured: Option<bool>,
    pub free_for_open_source: Option<bool>,
    pub retired: Option<bool>,
}
