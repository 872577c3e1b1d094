//! Core types for Shelfwise.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod book;
pub mod email;
pub mod id;
pub mod status;

pub use book::{BookDetails, BookDetailsError, normalize_isbn};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
