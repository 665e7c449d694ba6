//! Blog Module
//!
//! File-backed blog: markdown files with YAML front matter are the source of
//! truth, and a database table mirrors their metadata so listings don't touch
//! the filesystem. The sync operation reconciles the table with the posts
//! directory; fetching a single post re-reads its file and renders the body
//! to HTML.
//!
//! # Front matter
//!
//! ```text
//! ---
//! title: A post
//! slug: a-post
//! excerpt: One-line teaser
//! tags: [notes, rust]
//! date: 2025-06-01
//! published: true
//! ---
//! Body in markdown...
//! ```
//!
//! Files without `published: true` are treated as drafts and never synced.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the blog module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "blog_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
