//! # Sliceworks Core
//!
//! Document-agnostic editing machinery:
//!
//! - [`abstract_editor`]: reversible actions, atomic transactions and the
//!   linear undo/redo history
//! - [`access`]: a document shared between threads behind read/write
//!   guards with bounded write waits

pub mod abstract_editor;
pub mod access;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
