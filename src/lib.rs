//! # Scolara API
//!
//! A multi-tenant school-management REST API built with Axum and PostgreSQL.
//!
//! Every resource handler follows the same control flow: authenticate the
//! caller (JWT bearer token), load a [`scolara_core::CallerContext`], derive
//! a row [`scolara_core::Scope`] from the caller's role and school
//! association, translate it into a SQL predicate, execute, and format the
//! response. The scope calculator itself lives in the `scolara-core` crate
//! and is pure; everything in this crate is request plumbing around it.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── cli.rs            # create-super seeding command
//! ├── config/           # env-driven configuration (db, jwt, cors, storage)
//! ├── middleware/       # AuthUser extractor, caller context loading
//! ├── modules/          # one feature module per resource
//! │   └── <resource>/   # controller / service / model / router
//! ├── docs.rs           # OpenAPI document
//! ├── router.rs         # main router, CORS, request logging
//! └── utils/            # scope-to-SQL, authz helpers, jwt, uploads
//! ```
//!
//! ## Roles
//!
//! | Role | Scope |
//! |------|-------|
//! | super | unrestricted, CLI-created only |
//! | management / admin | own school(s) |
//! | teacher | form-master classes, owned subjects/lessons/grades |
//! | student | self, own class |
//! | parent | own children |

pub mod cli;
pub mod config;
pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

pub use scolara_core;
