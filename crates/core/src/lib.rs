//! Shelfwise Core - Shared types library.
//!
//! This crate provides common types used across all Shelfwise components:
//! - `web` - Public reader site (catalog, bookshelf, goals, clubs)
//! - `admin` - Administration area for users and the book catalog
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, statuses and book details

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
