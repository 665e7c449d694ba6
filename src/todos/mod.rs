//! To-do List Module
//!
//! CRUD operations for the to-do list: list, create, complete, delete.
//! Completion is a one-way mutation; everything else about a todo is
//! immutable through the API.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the todos module.
///
/// These should be run during application startup to ensure the database
/// schema is up to date.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "todos_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
