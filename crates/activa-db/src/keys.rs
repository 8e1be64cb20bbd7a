//! Activation key writes and reads
//!
//! A create or update validates, resolves up to three dimension rows and
//! writes the key, all inside one unit of work. Keys are never deleted.

use crate::error::{Error, Result};
use crate::models::{StoredActivationKey, StoredActivationKeyKey};
use crate::resolver::resolve_or_create;
use crate::store::{Store, Writer};
use activa_core::search::sort_rows;
use activa_core::{
    ActivationKey, ActivationKeyChanges, ActivationKeyId, ActivationKeyParams, DimensionKind,
    Ecosystem, LibraryId, NamespaceId, ProjectId, Sort, ValidationErrors,
};
use chrono::Utc;
use tracing::{debug, info};

/// Base message of a refused key deletion.
pub const KEY_NOT_DELETABLE: &str = "Activation keys cannot be deleted";

impl Writer<'_> {
    pub(crate) fn key_row(&self, id: u64) -> Result<StoredActivationKey> {
        let row: Option<StoredActivationKey> = self.rw.get().primary(id)?;
        row.ok_or_else(|| Error::NotFound(ActivationKeyId::new(id).to_string()))
    }

    /// Whether another key already owns `handle`.
    fn handle_taken(&self, handle: &str, except: Option<u64>) -> Result<bool> {
        let row: Option<StoredActivationKey> = self
            .rw
            .get()
            .secondary(StoredActivationKeyKey::handle, handle.to_string())?;
        Ok(row.is_some_and(|row| Some(row.id) != except))
    }

    /// Point `row` at its dimension rows. With a `previous` version only
    /// dimensions whose text or ecosystem changed, or whose id is missing,
    /// are resolved again.
    fn link_dimensions(
        &mut self,
        row: &mut StoredActivationKey,
        previous: Option<&StoredActivationKey>,
    ) -> Result<()> {
        for kind in DimensionKind::ALL {
            let stale = previous.map_or(true, |prev| {
                prev.ecosystem != row.ecosystem
                    || prev.dimension_text(kind) != row.dimension_text(kind)
                    || prev.dimension_id(kind).is_none()
            });
            if !stale {
                continue;
            }
            let id = match row.dimension_text(kind) {
                Some(name) => {
                    let resolved = resolve_or_create(self, kind, row.ecosystem, name)?;
                    Some(resolved.dimension.id)
                }
                None => None,
            };
            row.set_dimension_id(kind, id);
        }
        Ok(())
    }
}

/// Validate `params` against the stored handles and parse the ecosystem.
fn check(w: &Writer<'_>, params: &ActivationKeyParams, except: Option<u64>) -> Result<Ecosystem> {
    let taken = w.handle_taken(&params.handle(), except)?;
    params.validate(taken).into_result()?;
    Ok(params.ecosystem.parse::<Ecosystem>()?)
}

impl Store {
    /// Create a key, resolving its namespace, library and project rows.
    pub fn create_activation_key(&self, params: &ActivationKeyParams) -> Result<ActivationKey> {
        let key = self.write(|w| {
            let ecosystem = check(w, params, None)?;
            let id = w.next_id(StoredActivationKey::TABLE)?;
            let mut row = StoredActivationKey::from_params(
                id,
                params,
                ecosystem,
                Default::default(),
                Utc::now(),
            );
            w.link_dimensions(&mut row, None)?;
            w.rw.insert(row.clone())?;
            Ok(row.to_activation_key())
        })?;
        info!(
            id = %key.id,
            key = %key.display_name(),
            ecosystem = %key.ecosystem,
            "created activation key"
        );
        Ok(key)
    }

    /// Apply `changes` to a key.
    pub fn update_activation_key(
        &self,
        id: ActivationKeyId,
        changes: &ActivationKeyChanges,
    ) -> Result<ActivationKey> {
        let key = self.write(|w| {
            let current = w.key_row(id.raw())?;
            let params = ActivationKeyParams::from(&current.to_activation_key()).apply(changes);
            let ecosystem = check(w, &params, Some(current.id))?;

            let mut row = StoredActivationKey::from_params(
                current.id,
                &params,
                ecosystem,
                current.links(),
                current.created_at,
            );
            row.activation_event_count = current.activation_event_count;
            row.updated_at = Utc::now();
            w.link_dimensions(&mut row, Some(&current))?;
            w.rw.update(current, row.clone())?;
            Ok(row.to_activation_key())
        })?;
        debug!(id = %key.id, key = %key.display_name(), "updated activation key");
        Ok(key)
    }

    /// Always refused; an unknown id is reported as missing.
    pub fn destroy_activation_key(&self, id: ActivationKeyId) -> Result<()> {
        let key = self.activation_key(id)?;
        debug!(id = %key.id, "refused to delete activation key");
        Err(Error::Protected(ValidationErrors::base(KEY_NOT_DELETABLE)))
    }

    pub fn activation_key(&self, id: ActivationKeyId) -> Result<ActivationKey> {
        let r = self.db.r_transaction()?;
        let row: Option<StoredActivationKey> = r.get().primary(id.raw())?;
        row.map(|row| row.to_activation_key())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Active keys of a namespace, by namespace then key.
    pub fn keys_for_namespace(&self, id: NamespaceId) -> Result<Vec<ActivationKey>> {
        self.keys_where(|key| key.namespace_id == Some(id) && !key.retired)
    }

    /// Active keys of a library, by namespace then key.
    pub fn keys_for_library(&self, id: LibraryId) -> Result<Vec<ActivationKey>> {
        self.keys_where(|key| key.library_id == Some(id) && !key.retired)
    }

    /// Every key of a project, retired ones included.
    pub fn keys_for_project(&self, id: ProjectId) -> Result<Vec<ActivationKey>> {
        self.keys_where(|key| key.project_id == Some(id))
    }

    fn keys_where(&self, keep: impl Fn(&ActivationKey) -> bool) -> Result<Vec<ActivationKey>> {
        let mut keys: Vec<ActivationKey> = self
            .activation_keys()?
            .into_iter()
            .filter(|key| keep(key))
            .collect();
        sort_rows(&mut keys, Sort::AZ);
        Ok(keys)
    }
}
