//! Editable targets and reversible editor actions.
//!
//! - [`Editable`]: marker trait for types that actions mutate
//! - [`EditAction`]: a reversible edit operation (Command pattern)
//! - [`EditActionError`] / [`EditActionResult`]: why an action refused to run
//!
//! Actions are self-contained: each one stores the identifiers of its
//! targets plus whatever "before" state it needs to reverse itself. Targets
//! are re-resolved on every `apply`/`undo`, so an action whose target has
//! disappeared reports [`EditActionError::StaleReference`] instead of
//! touching the wrong object.

use std::fmt;

use thiserror::Error;

/// Marker trait for types that serve as editing targets.
///
/// ```ignore
/// struct Sprite { /* ... */ }
/// impl Editable for Sprite {}
/// ```
pub trait Editable: 'static {}

/// Error type for action execution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditActionError {
    /// A target referenced by the action no longer resolves in the document.
    #[error("stale reference: {0}")]
    StaleReference(String),
    /// The target exists but is in a state the action cannot handle.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl EditActionError {
    /// Returns `true` for [`StaleReference`](Self::StaleReference).
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleReference(_))
    }
}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// A reversible editor action (Command pattern).
///
/// `apply` must either fully succeed or leave the target untouched and
/// return an error; the same holds for `undo`. Applying and then undoing an
/// action restores a target that is observationally identical to the one
/// before `apply`.
///
/// The trait is dyn-compatible so heterogeneous actions can live together
/// in a [`Transaction`](super::Transaction) or in the
/// [`EditActionHistory`](super::EditActionHistory) as
/// `Box<dyn EditAction<T>>`. Actions are `Send + Sync` so a history can
/// live inside a [`SharedDocument`](crate::access::SharedDocument) that is
/// shared between threads.
pub trait EditAction<T: Editable>: fmt::Debug + Send + Sync {
    /// Applies the action to the target (forward / redo direction).
    fn apply(&mut self, target: &mut T) -> EditActionResult;

    /// Reverses the action (undo direction).
    fn undo(&mut self, target: &mut T) -> EditActionResult;

    /// A short, human-readable description, e.g. `"Remove Slice"`.
    fn description(&self) -> &str;
}

impl<T: Editable> EditAction<T> for Box<dyn EditAction<T>> {
    fn apply(&mut self, target: &mut T) -> EditActionResult {
        (**self).apply(target)
    }

    fn undo(&mut self, target: &mut T) -> EditActionResult {
        (**self).undo(target)
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
