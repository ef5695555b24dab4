//! Grocery Core - Shared domain types.
//!
//! This crate provides the types shared by the web binary and the CLI:
//! - `web` - Store/item catalog with per-user shopping lists
//! - `cli` - Migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no database
//! access, no HTTP. Field validation returns structured [`FieldErrors`] so the
//! presentation layer can map each message onto the matching form field.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, usernames, prices and item categories
//! - [`validation`] - Per-entity field validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{
    Credentials, FieldErrors, INVALID_CHOICE, ItemFields, ItemInput, MIN_PASSWORD_LENGTH, REQUIRED,
    SignupFields, StoreFields,
};
