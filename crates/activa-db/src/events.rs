//! Activation events and the per-key counter cache.

use crate::error::{Error, Result};
use crate::models::{StoredActivationEvent, StoredActivationEventKey, StoredActivationKey};
use crate::store::{collect_rows, Store};
use activa_core::validation::MUST_EXIST;
use activa_core::{
    AccountId, ActivationEvent, ActivationEventId, ActivationKeyId, EventFlags,
    NewActivationEvent, ValidationErrors,
};
use chrono::Utc;
use tracing::{debug, info};

/// Base message of a refused event deletion.
pub const EVENT_NOT_DELETABLE: &str = "Activation events cannot be deleted";

impl Store {
    /// Record an activation and bump the key's counter in the same unit.
    pub fn create_activation_event(&self, event: &NewActivationEvent) -> Result<ActivationEvent> {
        let created = self.write(|w| {
            let parent: Option<StoredActivationKey> =
                w.rw.get().primary(event.activation_key_id.raw())?;

            let mut errors = ValidationErrors::new();
            if parent.is_none() {
                errors.add("activation_key", MUST_EXIST);
            }
            errors.append(event.validate());
            errors.into_result()?;
            let parent =
                parent.ok_or_else(|| Error::NotFound(event.activation_key_id.to_string()))?;

            let mut flags = EventFlags::empty();
            flags.set(EventFlags::DONATION_AFFIRMED, event.donation_affirmed);
            let row = StoredActivationEvent {
                id: w.next_id(StoredActivationEvent::TABLE)?,
                activation_key_id: parent.id,
                account_id: event.account_id.map(|id| id.raw()),
                flags: flags.bits(),
                donation_currency: event.donation_currency.clone(),
                created_at: Utc::now(),
            };
            w.rw.insert(row.clone())?;

            let mut counted = parent.clone();
            counted.activation_event_count += 1;
            w.rw.update(parent, counted)?;
            Ok(row.to_event())
        })?;
        debug!(id = %created.id, key = %created.activation_key_id, "recorded activation");
        Ok(created)
    }

    /// Always refused; an unknown id is reported as missing.
    pub fn destroy_activation_event(&self, id: ActivationEventId) -> Result<()> {
        let r = self.db.r_transaction()?;
        let row: Option<StoredActivationEvent> = r.get().primary(id.raw())?;
        if row.is_none() {
            return Err(Error::NotFound(id.to_string()));
        }
        debug!(%id, "refused to delete activation event");
        Err(Error::Protected(ValidationErrors::base(EVENT_NOT_DELETABLE)))
    }

    /// Events of one key, oldest first.
    pub fn activation_events_for_key(&self, id: ActivationKeyId) -> Result<Vec<ActivationEvent>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredActivationEvent>(StoredActivationEventKey::activation_key_id)?;
        let iter = scan.start_with(id.raw())?;
        let rows: Vec<StoredActivationEvent> = collect_rows(iter)?;
        let mut events: Vec<ActivationEvent> = rows.iter().map(|row| row.to_event()).collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    /// Drop the account reference from every event of `account_id`.
    /// Returns how many events changed.
    pub fn detach_account(&self, account_id: AccountId) -> Result<usize> {
        let detached = self.write(|w| {
            let rows: Vec<StoredActivationEvent> = {
                let scan = w.rw.scan().primary::<StoredActivationEvent>()?;
                let iter = scan.all()?;
                collect_rows(iter)?
            };
            let mut detached = 0;
            for row in rows {
                if row.account_id != Some(account_id.raw()) {
                    continue;
                }
                let mut anonymous = row.clone();
                anonymous.account_id = None;
                w.rw.update(row, anonymous)?;
                detached += 1;
            }
            Ok(detached)
        })?;
        info!(%account_id, detached, "detached account from activation events");
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activa_core::validation::BLANK;
    use activa_core::ActivationKeyParams;
    use rstest::rstest;

    fn store_with_key() -> (Store, ActivationKeyId) {
        let store = Store::in_memory().unwrap();
        let key = store
            .create_activation_key(&ActivationKeyParams::new("org", "lib", "ruby", "Lib"))
            .unwrap();
        (store, key.id)
    }

    #[test]
    fn test_event_bumps_counter_by_one() {
        let (store, key) = store_with_key();
        let event = store
            .create_activation_event(
                &NewActivationEvent::new(key, "EUR")
                    .account(AccountId::new(3))
                    .donation_affirmed(true),
            )
            .unwrap();
        assert_eq!(event.activation_key_id, key);
        assert_eq!(event.account_id, Some(AccountId::new(3)));
        assert!(event.donation_affirmed);
        assert_eq!(store.activation_key(key).unwrap().activation_event_count, 1);
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(12)]
    fn test_counter_matches_event_count(#[case] count: u64) {
        let (store, key) = store_with_key();
        for _ in 0..count {
            store
                .create_activation_event(&NewActivationEvent::new(key, "USD"))
                .unwrap();
        }
        let stored = store.activation_key(key).unwrap();
        assert_eq!(stored.activation_event_count, count);
        assert_eq!(store.activation_events_for_key(key).unwrap().len() as u64, count);
    }

    #[test]
    fn test_events_are_counted_per_key() {
        let (store, first) = store_with_key();
        let second = store
            .create_activation_key(&ActivationKeyParams::new("org", "other", "ruby", "Lib"))
            .unwrap()
            .id;
        for key in [first, second, first] {
            store
                .create_activation_event(&NewActivationEvent::new(key, "USD"))
                .unwrap();
        }
        assert_eq!(store.activation_key(first).unwrap().activation_event_count, 2);
        assert_eq!(store.activation_key(second).unwrap().activation_event_count, 1);

        let events = store.activation_events_for_key(first).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].id < events[1].id);
        assert!(events.iter().all(|e| e.activation_key_id == first));
    }

    #[test]
    fn test_missing_key_and_currency() {
        let (store, _) = store_with_key();
        let err = store
            .create_activation_event(&NewActivationEvent::new(ActivationKeyId::new(42), ""))
            .unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.get("activation_key"), &[MUST_EXIST.to_string()]);
        assert_eq!(errors.get("donation_currency"), &[BLANK.to_string()]);
    }

    #[test]
    fn test_rejected_event_leaves_counter() {
        let (store, key) = store_with_key();
        store
            .create_activation_event(&NewActivationEvent::new(key, " "))
            .unwrap_err();
        assert_eq!(store.activation_key(key).unwrap().activation_event_count, 0);
        assert!(store.activation_events_for_key(key).unwrap().is_empty());
    }

    #[test]
    fn test_destroy_is_always_refused() {
        let (store, key) = store_with_key();
        let event = store
            .create_activation_event(&NewActivationEvent::new(key, "USD"))
            .unwrap();

        let err = store.destroy_activation_event(event.id).unwrap_err();
        assert!(err.is_protected());
        assert_eq!(
            err.validation_errors().unwrap().base_messages(),
            &[EVENT_NOT_DELETABLE.to_string()]
        );
        assert_eq!(store.activation_events_for_key(key).unwrap().len(), 1);

        let err = store
            .destroy_activation_event(ActivationEventId::new(99))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_detach_account_keeps_events() {
        let (store, key) = store_with_key();
        let gone = AccountId::new(1);
        let kept = AccountId::new(2);
        for account in [gone, kept, gone] {
            store
                .create_activation_event(&NewActivationEvent::new(key, "USD").account(account))
                .unwrap();
        }

        assert_eq!(store.detach_account(gone).unwrap(), 2);
        assert_eq!(store.detach_account(gone).unwrap(), 0);

        let events = store.activation_events_for_key(key).unwrap();
        assert_eq!(events.len(), 3);
        let accounts: Vec<_> = events.iter().map(|e| e.account_id).collect();
        assert_eq!(accounts, vec![None, Some(kept), None]);
        assert_eq!(store.activation_key(key).unwrap().activation_event_count, 3);
    }
}
