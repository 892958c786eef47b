//! Guarded access to a shared, editable document.
//!
//! A [`SharedDocument`] owns an editable target together with its undo
//! history behind a single reader/writer lock:
//!
//! - [`ReadGuard`]: shared access. Any number may be held at once, by any
//!   thread. Nothing can be mutated through it.
//! - [`WriteGuard`]: exclusive access. Granted only when no other guard of
//!   either kind is outstanding, and only within a caller-supplied bound.
//!
//! Both guards release their lock when dropped, on every exit path.
//!
//! # Upgrading
//!
//! There is no in-place upgrade. [`ReadGuard::upgrade`] releases the read
//! lock and then competes for the write lock like any other writer, so the
//! state inspected under the read guard may have changed by the time the
//! write guard is granted. Actions re-resolve their targets when applied.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::abstract_editor::{
    DEFAULT_MAX_UNDO, EditActionHistory, EditActionResult, Editable, Transaction,
};

/// Error type for guard acquisition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// Other guards were still outstanding when the bound elapsed.
    #[error("write access not granted within {waited:?}")]
    Timeout { waited: Duration },
    /// The document was closed.
    #[error("document is closed")]
    Closed,
}

/// Receives a notification after a committed change to a document.
///
/// Observers run on the writer's thread while its [`WriteGuard`] is still
/// held, so they must not try to lock the same document.
pub trait DocumentObserver: Send + Sync {
    fn on_general_update(&self);
}

struct DocumentState<T: Editable> {
    target: T,
    history: EditActionHistory<T>,
}

/// An editable target plus its undo history, guarded by a reader/writer lock.
///
/// Share it between threads as `Arc<SharedDocument<T>>`.
pub struct SharedDocument<T: Editable> {
    state: RwLock<DocumentState<T>>,
    closed: AtomicBool,
    observers: Mutex<Vec<Arc<dyn DocumentObserver>>>,
}

impl<T: Editable> SharedDocument<T> {
    /// Wraps `target` with an empty history of [`DEFAULT_MAX_UNDO`] steps.
    pub fn new(target: T) -> Self {
        Self::with_max_undo(target, DEFAULT_MAX_UNDO)
    }

    pub fn with_max_undo(target: T, max_undo: usize) -> Self {
        Self {
            state: RwLock::new(DocumentState {
                target,
                history: EditActionHistory::new(max_undo),
            }),
            closed: AtomicBool::new(false),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Acquires shared read access.
    ///
    /// Waits only while a writer holds the document, which never takes longer
    /// than one edit.
    pub fn read(&self) -> Result<ReadGuard<'_, T>, LockError> {
        if self.is_closed() {
            return Err(LockError::Closed);
        }
        let guard = self.state.read();
        Ok(ReadGuard {
            guard,
            document: self,
        })
    }

    /// Acquires exclusive write access, waiting at most `timeout`.
    ///
    /// On [`LockError::Timeout`] nothing was touched; callers skip the edit.
    pub fn write_for(&self, timeout: Duration) -> Result<WriteGuard<'_, T>, LockError> {
        if self.is_closed() {
            return Err(LockError::Closed);
        }
        let started = Instant::now();
        match self.state.try_write_for(timeout) {
            Some(guard) => {
                log::debug!("Write access granted after {:?}", started.elapsed());
                Ok(WriteGuard {
                    guard,
                    document: self,
                })
            }
            None => {
                let waited = started.elapsed();
                log::warn!("Write access not granted within {timeout:?}");
                Err(LockError::Timeout { waited })
            }
        }
    }

    /// Returns `true` while a [`WriteGuard`] is outstanding.
    pub fn is_write_locked(&self) -> bool {
        self.state.is_locked_exclusive()
    }

    /// Returns `true` while any guard is outstanding.
    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Refuses every later acquisition with [`LockError::Closed`].
    ///
    /// Guards that are already held stay valid until dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::debug!("Document closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Registers an observer for [`WriteGuard::notify_general_update`].
    pub fn add_observer(&self, observer: Arc<dyn DocumentObserver>) {
        self.observers.lock().push(observer);
    }

    /// Unregisters an observer previously passed to [`add_observer`](Self::add_observer).
    pub fn remove_observer(&self, observer: &Arc<dyn DocumentObserver>) {
        self.observers.lock().retain(|o| !Arc::ptr_eq(o, observer));
    }

    fn notify_observers(&self) {
        let observers = self.observers.lock().clone();
        for observer in &observers {
            observer.on_general_update();
        }
    }
}

impl<T: Editable> fmt::Debug for SharedDocument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDocument")
            .field("locked", &self.is_locked())
            .field("write_locked", &self.is_write_locked())
            .field("closed", &self.is_closed())
            .field("observers", &self.observers.lock().len())
            .finish()
    }
}

/// Shared read access to a [`SharedDocument`]. Released on drop.
pub struct ReadGuard<'a, T: Editable> {
    guard: RwLockReadGuard<'a, DocumentState<T>>,
    document: &'a SharedDocument<T>,
}

impl<'a, T: Editable> ReadGuard<'a, T> {
    pub fn history(&self) -> &EditActionHistory<T> {
        &self.guard.history
    }

    /// Releases read access, then waits up to `timeout` for write access.
    pub fn upgrade(self, timeout: Duration) -> Result<WriteGuard<'a, T>, LockError> {
        let document = self.document;
        drop(self);
        document.write_for(timeout)
    }
}

impl<T: Editable> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard.target
    }
}

/// Exclusive write access to a [`SharedDocument`]. Released on drop.
///
/// Edits go through [`transaction`](Self::transaction) so they land in the
/// history; [`target_mut`](Self::target_mut) bypasses it and is meant for
/// building a document before it is shown to the user.
pub struct WriteGuard<'a, T: Editable> {
    guard: RwLockWriteGuard<'a, DocumentState<T>>,
    document: &'a SharedDocument<T>,
}

impl<T: Editable> WriteGuard<'_, T> {
    /// Opens a transaction on the guarded target and its history.
    pub fn transaction(&mut self, label: impl Into<String>) -> Transaction<'_, T> {
        let state = &mut *self.guard;
        Transaction::new(&mut state.target, &mut state.history, label)
    }

    /// Undoes the latest history entry. `Ok(false)` when there is none.
    pub fn undo(&mut self) -> EditActionResult<bool> {
        let state = &mut *self.guard;
        state.history.undo(&mut state.target)
    }

    /// Redoes the latest undone entry. `Ok(false)` when there is none.
    pub fn redo(&mut self) -> EditActionResult<bool> {
        let state = &mut *self.guard;
        state.history.redo(&mut state.target)
    }

    pub fn history(&self) -> &EditActionHistory<T> {
        &self.guard.history
    }

    pub fn history_mut(&mut self) -> &mut EditActionHistory<T> {
        &mut self.guard.history
    }

    /// Direct mutable access that is not recorded in the history.
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.guard.target
    }

    /// Tells every registered [`DocumentObserver`] that the document changed.
    pub fn notify_general_update(&self) {
        self.document.notify_observers();
    }
}

impl<T: Editable> fmt::Debug for WriteGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteGuard").finish_non_exhaustive()
    }
}

impl<T: Editable> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard.target
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::abstract_editor::{EditAction, EditActionResult};

    #[derive(Debug, Default)]
    struct Counter {
        value: i32,
    }

    impl Editable for Counter {}

    #[derive(Debug)]
    struct Add(i32);

    impl EditAction<Counter> for Add {
        fn apply(&mut self, target: &mut Counter) -> EditActionResult {
            target.value += self.0;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> EditActionResult {
            target.value -= self.0;
            Ok(())
        }

        fn description(&self) -> &str {
            "Add"
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        calls: AtomicUsize,
    }

    impl DocumentObserver for CountingObserver {
        fn on_general_update(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn readers_share_access() {
        let doc = SharedDocument::new(Counter::default());
        let a = doc.read().unwrap();
        let b = doc.read().unwrap();
        assert_eq!(a.value, b.value);
        assert!(doc.is_locked());
        assert!(!doc.is_write_locked());
    }

    #[test]
    fn write_times_out_while_read_held() {
        let doc = SharedDocument::new(Counter::default());
        let reader = doc.read().unwrap();

        let err = doc.write_for(SHORT).unwrap_err();
        match err {
            LockError::Timeout { waited } => assert!(waited >= SHORT),
            other => panic!("unexpected error: {other:?}"),
        }

        drop(reader);
        assert!(doc.write_for(SHORT).is_ok());
    }

    #[test]
    fn second_writer_times_out() {
        let doc = SharedDocument::new(Counter::default());
        let _writer = doc.write_for(SHORT).unwrap();
        assert!(doc.is_write_locked());
        assert!(matches!(
            doc.write_for(SHORT),
            Err(LockError::Timeout { .. })
        ));
    }

    #[test]
    fn guard_released_on_early_return() {
        fn bail(doc: &SharedDocument<Counter>) -> Result<(), LockError> {
            let guard = doc.write_for(SHORT)?;
            if guard.value == 0 {
                return Ok(());
            }
            unreachable!()
        }

        let doc = SharedDocument::new(Counter::default());
        bail(&doc).unwrap();
        assert!(!doc.is_locked());
    }

    #[test]
    fn upgrade_releases_read_first() {
        let doc = SharedDocument::new(Counter::default());
        let reader = doc.read().unwrap();
        let mut writer = reader.upgrade(SHORT).unwrap();
        writer.target_mut().value = 4;
        drop(writer);
        assert_eq!(doc.read().unwrap().value, 4);
    }

    #[test]
    fn upgrade_blocked_by_other_reader() {
        let doc = SharedDocument::new(Counter::default());
        let _other = doc.read().unwrap();
        let reader = doc.read().unwrap();
        assert!(matches!(
            reader.upgrade(SHORT),
            Err(LockError::Timeout { .. })
        ));
    }

    #[test]
    fn writer_waits_for_reader_on_other_thread() {
        let doc = Arc::new(SharedDocument::new(Counter::default()));
        let (held_tx, held_rx) = mpsc::channel();

        let background = {
            let doc = Arc::clone(&doc);
            thread::spawn(move || {
                let guard = doc.read().unwrap();
                held_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                drop(guard);
            })
        };

        held_rx.recv().unwrap();
        let writer = doc.write_for(Duration::from_secs(5));
        assert!(writer.is_ok());
        drop(writer);
        background.join().unwrap();
    }

    #[test]
    fn closed_document_refuses_guards() {
        let doc = SharedDocument::new(Counter::default());
        doc.close();
        assert!(doc.is_closed());
        assert!(matches!(doc.read(), Err(LockError::Closed)));
        assert!(matches!(doc.write_for(SHORT), Err(LockError::Closed)));
    }

    #[test]
    fn transaction_undo_redo_through_guard() {
        let doc = SharedDocument::new(Counter::default());
        let mut writer = doc.write_for(SHORT).unwrap();

        let mut tx = writer.transaction("Add twice");
        tx.execute(Add(2)).unwrap();
        tx.execute(Add(3)).unwrap();
        tx.commit().unwrap();
        drop(tx);

        assert_eq!(writer.value, 5);
        assert_eq!(writer.history().undo_count(), 1);

        assert!(writer.undo().unwrap());
        assert_eq!(writer.value, 0);
        assert!(writer.redo().unwrap());
        assert_eq!(writer.value, 5);
        assert!(!writer.redo().unwrap());
    }

    #[test]
    fn observers_notified() {
        let doc = SharedDocument::new(Counter::default());
        let observer = Arc::new(CountingObserver::default());
        let handle: Arc<dyn DocumentObserver> = observer.clone();
        doc.add_observer(Arc::clone(&handle));

        let writer = doc.write_for(SHORT).unwrap();
        writer.notify_general_update();
        drop(writer);
        assert_eq!(observer.calls.load(Ordering::SeqCst), 1);

        doc.remove_observer(&handle);
        doc.write_for(SHORT).unwrap().notify_general_update();
        assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shared_document_is_thread_safe() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<SharedDocument<Counter>>();
    }
}
