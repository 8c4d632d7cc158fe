//! Pharma Direct Core - Shared types library.
//!
//! This crate provides common types used across all Pharma Direct components:
//! - `auth` - Session, authentication, and role routing
//! - host applications embedding the session library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no vendor SDK access,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and enums for uids, emails, roles, and
//!   storefront areas

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
