//! Atomic groups of actions.
//!
//! A [`Transaction`] runs actions immediately against the live target and
//! remembers them. Committing publishes the whole group to the history as a
//! single [`TransactionRecord`]; anything else (a refused action, an early
//! return, a panic unwinding through the edit) reverses every action the
//! transaction ran, newest first.

use std::fmt;

use thiserror::Error;

use super::action::{EditAction, EditActionError, EditActionResult, Editable};
use super::history::EditActionHistory;

/// Lifecycle of a [`Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting actions.
    Open,
    /// Published to the history. Terminal.
    Committed,
    /// Every executed action was reversed. Terminal.
    RolledBack,
}

/// Error type for transaction operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// `execute` or `commit` was called after the transaction finished.
    #[error("transaction is not open (state: {0:?})")]
    NotOpen(TransactionState),
    /// An action refused to apply; the transaction was rolled back.
    #[error("'{action}' rejected, transaction rolled back: {source}")]
    Rejected {
        action: String,
        #[source]
        source: EditActionError,
    },
}

impl TransactionError {
    /// The action error that caused the rollback, if any.
    pub fn action_error(&self) -> Option<&EditActionError> {
        match self {
            Self::Rejected { source, .. } => Some(source),
            Self::NotOpen(_) => None,
        }
    }
}

/// An ordered set of actions applied as one atomic, undoable unit.
///
/// ```ignore
/// let mut tx = Transaction::new(&mut sprite, &mut history, "Remove Slice");
/// tx.execute(SliceCommand::remove_slice(id))?;
/// tx.commit()?;
/// ```
pub struct Transaction<'a, T: Editable> {
    target: &'a mut T,
    history: &'a mut EditActionHistory<T>,
    label: String,
    executed: Vec<Box<dyn EditAction<T>>>,
    state: TransactionState,
}

impl<'a, T: Editable> Transaction<'a, T> {
    /// Opens a transaction that edits `target` and commits into `history`.
    pub fn new(
        target: &'a mut T,
        history: &'a mut EditActionHistory<T>,
        label: impl Into<String>,
    ) -> Self {
        let label = label.into();
        log::debug!("Transaction '{label}' opened");
        Self {
            target,
            history,
            label,
            executed: Vec::new(),
            state: TransactionState::Open,
        }
    }

    /// Applies `action` now and keeps it for commit or rollback.
    ///
    /// If the action refuses to apply, every action executed so far is
    /// reversed, the transaction becomes [`RolledBack`](TransactionState::RolledBack)
    /// and the refusal is returned.
    pub fn execute(
        &mut self,
        action: impl EditAction<T> + 'static,
    ) -> Result<(), TransactionError> {
        if self.state != TransactionState::Open {
            return Err(TransactionError::NotOpen(self.state));
        }

        let mut action: Box<dyn EditAction<T>> = Box::new(action);
        match action.apply(self.target) {
            Ok(()) => {
                self.executed.push(action);
                Ok(())
            }
            Err(source) => {
                log::warn!(
                    "'{}' rejected in transaction '{}': {source}",
                    action.description(),
                    self.label
                );
                self.rollback();
                Err(TransactionError::Rejected {
                    action: action.description().to_owned(),
                    source,
                })
            }
        }
    }

    /// Publishes the executed actions as one history entry.
    ///
    /// A transaction that executed nothing commits without touching the
    /// history.
    pub fn commit(&mut self) -> Result<(), TransactionError> {
        if self.state != TransactionState::Open {
            return Err(TransactionError::NotOpen(self.state));
        }
        self.state = TransactionState::Committed;

        if self.executed.is_empty() {
            log::debug!("Transaction '{}' committed with no actions", self.label);
            return Ok(());
        }

        let record = TransactionRecord {
            label: self.label.clone(),
            actions: std::mem::take(&mut self.executed),
        };
        log::debug!(
            "Transaction '{}' committed ({} actions)",
            record.label,
            record.actions.len()
        );
        self.history.record(Box::new(record));
        Ok(())
    }

    /// Reverses every executed action, newest first. No-op unless open.
    pub fn rollback(&mut self) {
        if self.state != TransactionState::Open {
            return;
        }
        self.state = TransactionState::RolledBack;

        let count = self.executed.len();
        while let Some(mut action) = self.executed.pop() {
            if let Err(e) = action.undo(self.target) {
                log::error!(
                    "Rollback of '{}' in transaction '{}' failed: {e}",
                    action.description(),
                    self.label
                );
            }
        }
        log::debug!("Transaction '{}' rolled back ({count} actions)", self.label);
    }

    /// Read access to the target as the transaction currently sees it.
    pub fn target(&self) -> &T {
        &*self.target
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of actions executed and not yet rolled back.
    pub fn len(&self) -> usize {
        self.executed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executed.is_empty()
    }
}

impl<T: Editable> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        if self.state == TransactionState::Open {
            if !self.executed.is_empty() {
                log::debug!("Transaction '{}' dropped without commit", self.label);
            }
            self.rollback();
        }
    }
}

impl<T: Editable> fmt::Debug for Transaction<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("executed", &self.executed)
            .finish()
    }
}

/// A committed transaction as it lives in the history.
///
/// Undo reverses the actions newest first and redo re-applies them in their
/// original order. Both steps are atomic: if one action refuses midway, the
/// ones already stepped are put back and the error is returned.
pub struct TransactionRecord<T: Editable> {
    label: String,
    actions: Vec<Box<dyn EditAction<T>>>,
}

impl<T: Editable> fmt::Debug for TransactionRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionRecord")
            .field("label", &self.label)
            .field("actions", &self.actions)
            .finish()
    }
}

impl<T: Editable> TransactionRecord<T> {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<T: Editable> EditAction<T> for TransactionRecord<T> {
    fn apply(&mut self, target: &mut T) -> EditActionResult {
        for i in 0..self.actions.len() {
            if let Err(e) = self.actions[i].apply(target) {
                for done in self.actions[..i].iter_mut().rev() {
                    if let Err(undo_err) = done.undo(target) {
                        log::error!("Reverting '{}' failed: {undo_err}", done.description());
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut T) -> EditActionResult {
        let len = self.actions.len();
        for i in (0..len).rev() {
            if let Err(e) = self.actions[i].undo(target) {
                for done in self.actions[i + 1..].iter_mut() {
                    if let Err(apply_err) = done.apply(target) {
                        log::error!("Restoring '{}' failed: {apply_err}", done.description());
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.label
    }
}
