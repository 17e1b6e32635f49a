//! Feature modules.
//!
//! Each resource follows the same structure:
//!
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: business logic and queries
//! - `model.rs`: entities, DTOs, and filter parameters
//! - `router.rs`: route wiring

pub mod administrations;
pub mod announcements;
pub mod auth;
pub mod classes;
pub mod events;
pub mod gallery;
pub mod grades;
pub mod lessons;
pub mod parents;
pub mod schools;
pub mod students;
pub mod subjects;
pub mod teachers;
