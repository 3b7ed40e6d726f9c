//! Persistence for a collection of favorite movies kept under a single slot
//! of a key-value settings store.

pub mod error;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
