//! Activity Log Module
//!
//! Insert-only audit trail of mutations made through the API. Writes are
//! best-effort: a failed log entry never fails the request that produced it.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the activity module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "activity_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
