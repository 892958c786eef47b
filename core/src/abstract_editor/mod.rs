//! Abstract editor framework for reversible editing operations.
//!
//! This module is decoupled from any concrete document type so that
//! higher-level crates can plug in their own editable targets:
//!
//! - [`Editable`]: marker trait for types that can be edited
//! - [`EditAction`]: a reversible edit operation (Command pattern)
//! - [`Transaction`]: several actions applied as one atomic unit
//! - [`EditActionHistory`]: linear undo/redo stack of committed edits
//!
//! # Atomicity
//!
//! Actions run immediately when executed inside a [`Transaction`]. If one of
//! them refuses to apply, or the transaction goes out of scope without
//! [`commit`](Transaction::commit), everything it ran is reversed. A
//! committed transaction becomes exactly one history entry, so a single undo
//! reverses the whole edit.

mod action;
mod history;
mod transaction;

pub use action::{EditAction, EditActionError, EditActionResult, Editable};
pub use history::{DEFAULT_MAX_UNDO, EditActionHistory};
pub use transaction::{Transaction, TransactionError, TransactionRecord, TransactionState};
