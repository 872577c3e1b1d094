//! Shelfwise reader site library.
//!
//! This crate provides the reader-facing site as a library, allowing it to
//! be tested and reused. The binary in `main.rs` wires it to a server.

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
