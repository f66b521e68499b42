//! Core types and error taxonomy for the analytics engine.

pub mod error;
pub mod events;
pub mod filters;

pub use error::{Error, Result};
pub use events::*;
pub use filters::*;
