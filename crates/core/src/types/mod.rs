//! Core types for the grocery catalog.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod id;
pub mod price;
pub mod username;

pub use category::{CategoryError, ItemCategory};
pub use id::*;
pub use price::{Price, PriceError};
pub use username::{Username, UsernameError};
