use std::time::Duration;

use sliceworks_core::abstract_editor::{EditActionError, TransactionError};
use sliceworks_core::access::LockError;
use thiserror::Error;

/// Why an editor command did not change the document.
///
/// Every variant is local to one edit attempt: the document and its history
/// are left as they were before the command ran.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The selector did not resolve to a slice.
    #[error("no slice matches {0}")]
    NotFound(String),
    /// Write access was not granted within the configured bound.
    #[error("document busy, write access not granted within {waited:?}")]
    LockTimeout { waited: Duration },
    /// A command's target vanished before it applied; the edit was rolled back.
    #[error("edit rolled back: {0}")]
    StaleReference(TransactionError),
    /// A command refused to apply for another reason; the edit was rolled back.
    #[error("edit failed: {0}")]
    Transaction(TransactionError),
    /// Stepping the undo history failed; the entry was left in place.
    #[error("history step failed: {0}")]
    History(#[from] EditActionError),
    /// The command is not enabled in the current context.
    #[error("'{0}' is not enabled in the current context")]
    Disabled(&'static str),
    #[error("document is closed")]
    DocumentClosed,
}

impl From<LockError> for EditError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { waited } => Self::LockTimeout { waited },
            LockError::Closed => Self::DocumentClosed,
        }
    }
}

impl From<TransactionError> for EditError {
    fn from(err: TransactionError) -> Self {
        match err.action_error() {
            Some(action) if action.is_stale() => Self::StaleReference(err),
            _ => Self::Transaction(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_errors_map_to_edit_errors() {
        let waited = Duration::from_millis(500);
        assert_eq!(
            EditError::from(LockError::Timeout { waited }),
            EditError::LockTimeout { waited }
        );
        assert_eq!(EditError::from(LockError::Closed), EditError::DocumentClosed);
    }

    #[test]
    fn stale_rejections_are_told_apart() {
        let stale = TransactionError::Rejected {
            action: "Remove Slice".into(),
            source: EditActionError::StaleReference("slice 7".into()),
        };
        assert!(matches!(
            EditError::from(stale),
            EditError::StaleReference(_)
        ));

        let invalid = TransactionError::Rejected {
            action: "Add Slice".into(),
            source: EditActionError::InvalidState("empty".into()),
        };
        assert!(matches!(EditError::from(invalid), EditError::Transaction(_)));
    }
}
