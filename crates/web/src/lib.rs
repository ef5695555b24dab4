//! Grocery web application library.
//!
//! The binary in `main.rs` wires this library to `PostgreSQL`; the
//! integration tests wire the same router to in-memory storage.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
