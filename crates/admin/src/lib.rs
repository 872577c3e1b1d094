//! Shelfwise admin library.
//!
//! This crate provides the admin area as a library so the CLI can reuse
//! its repositories and password hashing, and so it can be tested.
//!
//! # Security
//!
//! Admins can restrict and delete reader accounts and edit the shared
//! catalog. Sessions are separate from the reader site (own schema, own
//! cookie, `SameSite=Strict`).

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
