//! `tulista` - A local shopping-list engine
//!
//! This crate provides the state core of a shopping-list application: a merged
//! product catalog (static source plus user-created products), a per-product
//! selection state for the active shopping run, derived totals and per-mode
//! views, and an append-only purchase history with restore support. All state
//! is persisted to a local `SQLite` key/value store after every mutation.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Application state and user-facing operations (check, quantity, finalize, restore)
pub mod app;
/// Configuration loading for database path, catalog source, and behavior policies
pub mod config;
/// Core business logic - catalog merging, selection state, view projection, history
pub mod core;
/// Database connection and schema setup
pub mod db;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Typed key/value persistence over the database
pub mod store;

#[cfg(test)]
pub mod test_utils;
