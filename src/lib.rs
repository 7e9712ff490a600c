//! Core library for a video learning portal: a SQLite-backed catalog of
//! experts, trails, categories, and videos, plus the rating, view-count,
//! and related-content operations the portal pages are built from.

pub mod admin;
pub mod database;
pub mod embed;
pub mod error;
pub mod portal;
pub mod related;

pub use database::Database;
pub use error::PortalError;
