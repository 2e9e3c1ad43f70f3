//! Core business logic - framework-agnostic and synchronous.
//!
//! Everything in here operates on plain in-memory values; persistence and
//! user interaction live in the layers above.

pub mod catalog;
pub mod history;
pub mod normalize;
pub mod selection;
pub mod view;
