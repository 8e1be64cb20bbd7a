//! Activation key, activation event and id sequence models.

use activa_core::{
    lookup_key, AccountId, ActivationEvent, ActivationEventId, ActivationKey, ActivationKeyId,
    ActivationKeyParams, DimensionKind, Ecosystem, EventFlags, KeyFlags, LibraryId, NamespaceId,
    ProjectId,
};
use chrono::{DateTime, Utc};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored activation key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct StoredActivationKey {
    /// Primary key - activation key ID.
    #[primary_key]
    pub id: u64,
    /// `namespace/key`, case-insensitive. Keys are unique per namespace.
    #[secondary_key(unique)]
    pub handle: String,
    pub namespace: String,
    pub key: String,
    pub ecosystem: Ecosystem,
    pub library_name: String,
    pub project_name: Option<String>,
    pub project_url: Option<String>,
    /// Packed [`KeyFlags`].
    pub flags: u8,
    pub retired: bool,
    pub activation_event_count: u64,
    pub namespace_id: Option<u64>,
    pub library_id: Option<u64>,
    pub project_id: Option<u64>,
    /// Dimension lookups of the text columns, in the form of
    /// [`lookup_key`]. Empty when the key names no project.
    #[secondary_key]
    pub namespace_lookup: String,
    #[secondary_key]
    pub library_lookup: String,
    #[secondary_key]
    pub project_lookup: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolved dimension ids for a key write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
    pub namespace_id: Option<u64>,
    pub library_id: Option<u64>,
    pub project_id: Option<u64>,
}

impl StoredActivationKey {
    /// Sequence name for key ids.
    pub const TABLE: &'static str = "activation_key";

    /// Build a row from validated params.
    pub fn from_params(
        id: u64,
        params: &ActivationKeyParams,
        ecosystem: Ecosystem,
        links: Links,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            handle: params.handle(),
            namespace: params.namespace.clone(),
            key: params.key.clone(),
            ecosystem,
            library_name: params.library_name.clone(),
            project_name: params.project_name().map(str::to_string),
            project_url: params.project_url().map(str::to_string),
            flags: KeyFlags::pack(params.featured, params.free_for_open_source).bits(),
            retired: params.retired,
            activation_event_count: 0,
            namespace_id: links.namespace_id,
            library_id: links.library_id,
            project_id: links.project_id,
            namespace_lookup: lookup_key(ecosystem, &params.namespace),
            library_lookup: lookup_key(ecosystem, &params.library_name),
            project_lookup: params
                .project_name()
                .map(|name| lookup_key(ecosystem, name))
                .unwrap_or_default(),
            created_at,
            updated_at: created_at,
        }
    }

    pub fn links(&self) -> Links {
        Links {
            namespace_id: self.namespace_id,
            library_id: self.library_id,
            project_id: self.project_id,
        }
    }

    /// Denormalized text for the given dimension.
    pub fn dimension_text(&self, kind: DimensionKind) -> Option<&str> {
        match kind {
            DimensionKind::Namespace => Some(self.namespace.as_str()),
            DimensionKind::Library => Some(self.library_name.as_str()),
            DimensionKind::Project => self.project_name.as_deref(),
        }
    }

    /// Secondary key holding the lookup of the given dimension.
    pub fn lookup_key_for(kind: DimensionKind) -> StoredActivationKeyKey {
        match kind {
            DimensionKind::Namespace => StoredActivationKeyKey::namespace_lookup,
            DimensionKind::Library => StoredActivationKeyKey::library_lookup,
            DimensionKind::Project => StoredActivationKeyKey::project_lookup,
        }
    }

    pub fn dimension_id(&self, kind: DimensionKind) -> Option<u64> {
        match kind {
            DimensionKind::Namespace => self.namespace_id,
            DimensionKind::Library => self.library_id,
            DimensionKind::Project => self.project_id,
        }
    }

    pub fn set_dimension_id(&mut self, kind: DimensionKind, id: Option<u64>) {
        match kind {
            DimensionKind::Namespace => self.namespace_id = id,
            DimensionKind::Library => self.library_id = id,
            DimensionKind::Project => self.project_id = id,
        }
    }

    /// Convert to the domain type.
    pub fn to_activation_key(&self) -> ActivationKey {
        let flags = KeyFlags::from_bits_truncate(self.flags);
        ActivationKey {
            id: ActivationKeyId::new(self.id),
            namespace: self.namespace.clone(),
            key: self.key.clone(),
            ecosystem: self.ecosystem,
            library_name: self.library_name.clone(),
            project_name: self.project_name.clone(),
            project_url: self.project_url.clone(),
            featured: flags.contains(KeyFlags::FEATURED),
            free_for_open_source: flags.contains(KeyFlags::FREE_FOR_OPEN_SOURCE),
            retired: self.retired,
            activation_event_count: self.activation_event_count,
            namespace_id: self.namespace_id.map(NamespaceId::new),
            library_id: self.library_id.map(LibraryId::new),
            project_id: self.project_id.map(ProjectId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Stored activation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 5, version = 1)]
#[native_db]
pub struct StoredActivationEvent {
    /// Primary key - event ID.
    #[primary_key]
    pub id: u64,
    /// Parent key.
    #[secondary_key]
    pub activation_key_id: u64,
    pub account_id: Option<u64>,
    /// Packed [`EventFlags`].
    pub flags: u8,
    pub donation_currency: String,
    pub created_at: DateTime<Utc>,
}

impl StoredActivationEvent {
    /// Sequence name for event ids.
    pub const TABLE: &'static str = "activation_event";

    /// Convert to the domain type.
    pub fn to_event(&self) -> ActivationEvent {
        ActivationEvent {
            id: ActivationEventId::new(self.id),
            activation_key_id: ActivationKeyId::new(self.activation_key_id),
            account_id: self.account_id.map(AccountId::new),
            donation_affirmed: EventFlags::from_bits_truncate(self.flags)
                .contains(EventFlags::DONATION_AFFIRMED),
            donation_currency: self.donation_currency.clone(),
            created_at: self.created_at,
        }
    }
}

/// Next id for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 6, version = 1)]
#[native_db]
pub struct StoredSequence {
    /// Primary key - table name.
    #[primary_key]
    pub table: String,
    pub next: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_flags_unpack() {
        let params = ActivationKeyParams::new("org", "lib", "ruby", "Lib")
            .with_project("Proj", "https://example.com")
            .featured(true);
        let stored = StoredActivationKey::from_params(
            9,
            &params,
            Ecosystem::Ruby,
            Links::default(),
            Utc::now(),
        );
        assert_eq!(stored.flags, KeyFlags::FEATURED.bits());

        let key = stored.to_activation_key();
        assert!(key.featured);
        assert!(!key.free_for_open_source);
        assert_eq!(key.id, ActivationKeyId::new(9));
        assert_eq!(key.project_name.as_deref(), Some("Proj"));
    }

    #[test]
    fn test_blank_project_fields_are_not_stored() {
        let params = ActivationKeyParams::new("org", "lib", "ruby", "Lib").with_project(" ", "");
        let stored = StoredActivationKey::from_params(
            1,
            &params,
            Ecosystem::Ruby,
            Links::default(),
            Utc::now(),
        );
        assert_eq!(stored.project_name, None);
        assert_eq!(stored.project_url, None);
        assert_eq!(stored.project_lookup, "");
    }

    #[test]
    fn test_lookups_follow_text_columns() {
        let params = ActivationKeyParams::new("Acme", "lib", "go", "Left-Pad")
            .with_project_name("Rocket");
        let stored = StoredActivationKey::from_params(
            1,
            &params,
            Ecosystem::Go,
            Links::default(),
            Utc::now(),
        );
        assert_eq!(stored.namespace_lookup, "go:acme");
        assert_eq!(stored.library_lookup, "go:left-pad");
        assert_eq!(stored.project_lookup, "go:rocket");
    }
}
