//! Database models for persistent storage.

mod activation;
mod dimension;

pub use activation::*;
pub use dimension::*;
pub(crate) use dimension::with_dimension_model;
