//! # Sliceworks Editor
//!
//! User-facing editor commands over shared sprite documents.
//!
//! A command is configured with [`Params`], checked against an
//! [`EditContext`] and executed through [`command::run`]. Commands inspect
//! the document under a read guard, take the write guard within the
//! configured bound, and apply their edit as one transaction so it undoes
//! as a single step.

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod params;
pub mod remove_slice;
pub mod status;
pub mod undo;

pub use command::{EditorCommand, run};
pub use config::{ConfigError, EditorConfig, load_config, load_or_default};
pub use context::{ContextFlags, EditContext, SharedSprite, share};
pub use error::EditError;
pub use params::Params;
pub use remove_slice::{BeforeWriteHook, REMOVE_SLICE_LABEL, RemoveSliceCommand, SliceSelector};
pub use status::{LogStatusSink, StatusBuffer, StatusSink, StatusTip};
pub use undo::{RedoCommand, UndoCommand};
