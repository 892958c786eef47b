//! # Sliceworks Document
//!
//! The sprite document model and the reversible commands that edit it.
//!
//! A [`Document`] holds frames, layers and [`Slice`]s. Each slice carries
//! per-frame [`SliceKey`]s and lives in the document only while it has at
//! least one key. All changes meant to be undoable go through
//! [`SliceCommand`], which implements
//! [`EditAction`](sliceworks_core::abstract_editor::EditAction) for
//! [`Document`].

pub mod commands;
pub mod document;
pub mod geometry;
pub mod keyframes;
pub mod object_id;
pub mod slice;

pub use commands::SliceCommand;
pub use document::{Document, DocumentError, Layer, Slices};
pub use geometry::{Point, Rect};
pub use keyframes::{FrameIndex, Keyframes};
pub use object_id::{ObjectId, ParseObjectIdError};
pub use slice::{KeyRemoval, Slice, SliceKey};
