//! Activation events
//!
//! One row per use of an activation key. Events are append-only.

use crate::identity::{AccountId, ActivationEventId, ActivationKeyId};
use crate::validation::{is_blank, ValidationErrors, BLANK};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationEvent {
    pub id: ActivationEventId,
    pub activation_key_id: ActivationKeyId,
    /// `None` for anonymous activations and after the account was removed.
    pub account_id: Option<AccountId>,
    pub donation_affirmed: bool,
    pub donation_currency: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivationEvent {
    pub activation_key_id: ActivationKeyId,
    pub account_id: Option<AccountId>,
    pub donation_affirmed: bool,
    pub donation_currency: String,
}

impl NewActivationEvent {
    pub fn new(activation_key_id: ActivationKeyId, donation_currency: impl Into<String>) -> Self {
        Self {
            activation_key_id,
            account_id: None,
            donation_affirmed: false,
            donation_currency: donation_currency.into(),
        }
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn donation_affirmed(mut self, value: bool) -> Self {
        self.donation_affirmed = value;
        self
    }

    /// Field checks; key existence is checked by the store.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if is_blank(&self.donation_currency) {
            errors.add("donation_currency", BLANK);
        }
        errors
    }
}
