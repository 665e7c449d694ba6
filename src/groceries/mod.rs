//! Grocery List Module
//!
//! The running shopping list: items are added with an optional quantity and
//! note, listed newest first, and removed once bought.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the groceries module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "groceries_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
