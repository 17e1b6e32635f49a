//! Configuration modules for the Scolara API.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables with sensible defaults for development:
//!
//! - [`cors`]: allowed origins for cross-origin requests
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token secret and expiry
//! - [`storage`]: upload directory and public file URL

pub mod cors;
pub mod database;
pub mod jwt;
pub mod storage;
