//! # Scolara Core
//!
//! Core types, errors, and utilities for the Scolara API.
//!
//! This crate provides foundational types used throughout the Scolara
//! application:
//!
//! - [`errors`]: Application error types with HTTP response conversion
//! - [`scope`]: Roles, caller context, and the row-scoping calculator
//! - [`admission`]: Admission number parsing, formatting, and sequencing
//! - [`pagination`]: Pagination utilities for list endpoints
//! - [`password`]: Secure password hashing and verification
//! - [`file_storage`]: Storage backend abstraction for logos and avatars
//!
//! Everything in this crate is independent of the database and the web
//! framework internals; the scoping calculator in particular is pure with
//! respect to an already-fetched [`scope::CallerContext`].

pub mod admission;
pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod response;
pub mod scope;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError, image_extension, validate_image};
pub use pagination::PaginationParams;
pub use password::{DEFAULT_PASSWORD, hash_password, verify_password};
pub use response::{BlockedDelete, DeleteReport};
pub use scope::{
    CallerContext, Resource, Role, Scope, ScopeDenied, resolve_read_scope, resolve_write_scope,
};
