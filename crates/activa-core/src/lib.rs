//! Activa Core - Domain model for the activation key directory
//!
//! This crate holds everything that does not touch storage:
//! - `Ecosystem`, the closed set of package registries
//! - Typed record identifiers
//! - `ActivationKey`, `ActivationEvent` and the three dimension tables
//!   (Namespace, Library, Project) as plain data
//! - Field validation with form-style error maps
//! - Open source badge markdown
//! - Search, ecosystem filtering and deterministic sorting
//!
//! Persistence, dimension resolution and backfill live in `activa-db`.

mod badge;
mod dimension;
mod ecosystem;
mod error;
mod event;
mod flags;
mod identity;
mod key;
pub mod search;
pub mod validation;

pub use dimension::{lookup_key, Dimension, DimensionKind, DimensionParams};
pub use ecosystem::Ecosystem;
pub use error::{Error, Result};
pub use event::{ActivationEvent, NewActivationEvent};
pub use flags::{EventFlags, KeyFlags};
pub use identity::{
    AccountId, ActivationEventId, ActivationKeyId, LibraryId, NamespaceId, ProjectId,
};
pub use key::{handle, ActivationKey, ActivationKeyChanges, ActivationKeyParams};
pub use search::{Query, Searchable, Sort};
pub use validation::ValidationErrors;
