//! Core types for Pharma Direct.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod area;
pub mod email;
pub mod role;
pub mod uid;

pub use area::{Area, Destination};
pub use email::{Email, EmailError};
pub use role::Role;
pub use uid::Uid;
