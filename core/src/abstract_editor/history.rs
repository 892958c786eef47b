//! Linear undo/redo history.
//!
//! [`EditActionHistory`] keeps the actions that make up the document's past
//! (the undo stack) and the ones that were undone and can be re-applied (the
//! redo stack). Recording a new entry after undoing discards the redo tail,
//! so the history never branches.

use std::collections::VecDeque;
use std::fmt;

use super::action::{EditAction, EditActionResult, Editable};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Manages an undo/redo stack of editor actions.
///
/// Every entry is one user-visible step. A committed
/// [`Transaction`](super::Transaction) is recorded as a single
/// [`TransactionRecord`](super::TransactionRecord) entry no matter how many
/// actions it executed.
///
/// The undo stack is bounded: once it holds more than `max_undo` entries the
/// oldest one is forgotten.
pub struct EditActionHistory<T: Editable> {
    undo_stack: VecDeque<Box<dyn EditAction<T>>>,
    redo_stack: Vec<Box<dyn EditAction<T>>>,
    max_undo: usize,
    /// Distance from the saved state.
    ///
    /// - `Some(0)`: the current state matches the last save.
    /// - `Some(n)` where `n > 0`: `n` undos reach the saved state.
    /// - `Some(n)` where `n < 0`: `|n|` redos reach the saved state.
    /// - `None`: the save point can no longer be reached.
    save_distance: Option<i64>,
}

impl<T: Editable> EditActionHistory<T> {
    /// Creates an empty history that keeps at most `max_undo` entries.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo,
            save_distance: Some(0),
        }
    }

    /// Applies `action` to the target and records it as a new entry.
    ///
    /// If the action refuses to apply nothing is recorded and the redo stack
    /// is left alone.
    pub fn execute(
        &mut self,
        mut action: Box<dyn EditAction<T>>,
        target: &mut T,
    ) -> EditActionResult {
        action.apply(target)?;
        self.record(action);
        Ok(())
    }

    /// Records an action whose effect is already present in the target.
    ///
    /// Used by [`Transaction::commit`](super::Transaction::commit), which
    /// applies its actions while it runs and publishes them afterwards.
    pub fn record(&mut self, action: Box<dyn EditAction<T>>) {
        if !self.redo_stack.is_empty() {
            log::debug!(
                "Discarding {} redo entries after new edit '{}'",
                self.redo_stack.len(),
                action.description()
            );
            self.redo_stack.clear();
        }
        // A save point in the discarded redo tail is gone for good.
        if let Some(d) = self.save_distance
            && d < 0
        {
            self.save_distance = None;
        }
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }

        self.undo_stack.push_back(action);
        self.enforce_capacity();
    }

    /// Undoes the most recent entry.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. When the entry
    /// refuses to undo it stays on the undo stack and the error is returned.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        if let Err(e) = action.undo(target) {
            self.undo_stack.push_back(action);
            return Err(e);
        }
        log::debug!("Undo '{}'", action.description());
        self.redo_stack.push(action);
        if let Some(d) = &mut self.save_distance {
            *d -= 1;
        }
        Ok(true)
    }

    /// Re-applies the most recently undone entry.
    ///
    /// Returns `Ok(false)` when there is nothing to redo. When the entry
    /// refuses to apply it stays on the redo stack and the error is returned.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(mut action) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = action.apply(target) {
            self.redo_stack.push(action);
            return Err(e);
        }
        log::debug!("Redo '{}'", action.description());
        self.undo_stack.push_back(action);
        if let Some(d) = &mut self.save_distance {
            *d += 1;
        }
        self.enforce_capacity();
        Ok(true)
    }

    fn enforce_capacity(&mut self) {
        while self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
            if let Some(d) = self.save_distance
                && d > self.undo_stack.len() as i64
            {
                self.save_distance = None;
            }
        }
    }

    /// Returns `true` if there are entries that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are entries that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo entry descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|a| a.description())
    }

    /// Redo entry descriptions, next-to-redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|a| a.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.save_distance = Some(0);
    }

    /// Returns `true` if the current state differs from the last saved state
    /// or the save point is unreachable.
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_distance != Some(0)
    }

    /// Forgets every entry. The saved state survives only if it is the
    /// current one.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        if self.save_distance != Some(0) {
            self.save_distance = None;
        }
    }
}

impl<T: Editable> Default for EditActionHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl<T: Editable> fmt::Debug for EditActionHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .field("save_distance", &self.save_distance)
            .finish()
    }
}
