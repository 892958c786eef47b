//! Reversible slice edits.
//!
//! [`SliceCommand`] is the closed set of primitive slice mutations. Each
//! variant resolves its target by [`ObjectId`] every time it is applied or
//! undone, and refuses with [`EditActionError::StaleReference`] when the
//! target is gone, leaving the document untouched.

use sliceworks_core::abstract_editor::{EditAction, EditActionError, EditActionResult};

use crate::document::{Document, DocumentError};
use crate::keyframes::FrameIndex;
use crate::object_id::ObjectId;
use crate::slice::{Slice, SliceKey};

fn stale_slice(id: ObjectId) -> EditActionError {
    EditActionError::StaleReference(format!("slice {id} is not in the document"))
}

fn invalid(err: DocumentError) -> EditActionError {
    EditActionError::InvalidState(err.to_string())
}

/// A primitive, reversible slice edit.
#[derive(Debug)]
pub enum SliceCommand {
    AddSlice(AddSlice),
    RemoveSlice(RemoveSlice),
    SetSliceKey(SetSliceKey),
}

impl SliceCommand {
    /// Adds `slice` (which must have at least one key) after the existing ones.
    pub fn add_slice(slice: Slice) -> Self {
        Self::AddSlice(AddSlice {
            slice_id: slice.id(),
            index: None,
            pending: Some(slice),
        })
    }

    /// Adds `slice` at display position `index`.
    pub fn add_slice_at(index: usize, slice: Slice) -> Self {
        Self::AddSlice(AddSlice {
            slice_id: slice.id(),
            index: Some(index),
            pending: Some(slice),
        })
    }

    /// Removes the slice with `slice_id` together with all of its keys.
    pub fn remove_slice(slice_id: ObjectId) -> Self {
        Self::RemoveSlice(RemoveSlice {
            slice_id,
            removed: None,
        })
    }

    /// Sets the key of a slice at `frame`; the empty key clears it.
    pub fn set_slice_key(slice_id: ObjectId, frame: FrameIndex, key: SliceKey) -> Self {
        Self::SetSliceKey(SetSliceKey {
            slice_id,
            frame,
            key,
            previous: None,
            detached: None,
        })
    }

    /// Clears the key of a slice at `frame`.
    pub fn clear_slice_key(slice_id: ObjectId, frame: FrameIndex) -> Self {
        Self::set_slice_key(slice_id, frame, SliceKey::EMPTY)
    }

    /// The slice this command targets.
    pub fn slice_id(&self) -> ObjectId {
        match self {
            Self::AddSlice(c) => c.slice_id,
            Self::RemoveSlice(c) => c.slice_id,
            Self::SetSliceKey(c) => c.slice_id,
        }
    }
}

impl EditAction<Document> for SliceCommand {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult {
        match self {
            Self::AddSlice(c) => c.apply(doc),
            Self::RemoveSlice(c) => c.apply(doc),
            Self::SetSliceKey(c) => c.apply(doc),
        }
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        match self {
            Self::AddSlice(c) => c.undo(doc),
            Self::RemoveSlice(c) => c.undo(doc),
            Self::SetSliceKey(c) => c.undo(doc),
        }
    }

    fn description(&self) -> &str {
        match self {
            Self::AddSlice(_) => "Add Slice",
            Self::RemoveSlice(_) => "Remove Slice",
            Self::SetSliceKey(_) => "Set Slice Key",
        }
    }
}

/// Inserts a slice. The slice is held here whenever it is not in the document.
#[derive(Debug)]
pub struct AddSlice {
    slice_id: ObjectId,
    index: Option<usize>,
    pending: Option<Slice>,
}

impl AddSlice {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult {
        let slice = self.pending.take().ok_or_else(|| {
            EditActionError::InvalidState(format!("slice {} already added", self.slice_id))
        })?;
        let index = self.index.unwrap_or(doc.slices().len());
        if let Err(e) = doc.insert_slice(index, slice.clone()) {
            self.pending = Some(slice);
            return Err(invalid(e));
        }
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let (index, slice) = doc
            .detach_slice(self.slice_id)
            .ok_or_else(|| stale_slice(self.slice_id))?;
        self.index = Some(index);
        self.pending = Some(slice);
        Ok(())
    }
}

/// Detaches a slice with all of its keys, keeping it and its position for undo.
#[derive(Debug)]
pub struct RemoveSlice {
    slice_id: ObjectId,
    removed: Option<(usize, Slice)>,
}

impl RemoveSlice {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult {
        let removed = doc
            .detach_slice(self.slice_id)
            .ok_or_else(|| stale_slice(self.slice_id))?;
        log::debug!(
            "Removed slice {} '{}' ({} keys)",
            self.slice_id,
            removed.1.name(),
            removed.1.key_count()
        );
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        let (index, slice) = self.removed.take().ok_or_else(|| {
            EditActionError::InvalidState(format!("slice {} was not removed", self.slice_id))
        })?;
        if let Err(e) = doc.insert_slice(index, slice.clone()) {
            self.removed = Some((index, slice));
            return Err(invalid(e));
        }
        Ok(())
    }
}

/// Sets or clears the key of one slice at one frame.
///
/// Clearing the last key also detaches the slice, since a slice without keys
/// cannot stay in the document; undo puts both back.
#[derive(Debug)]
pub struct SetSliceKey {
    slice_id: ObjectId,
    frame: FrameIndex,
    key: SliceKey,
    previous: Option<SliceKey>,
    detached: Option<(usize, Slice)>,
}

impl SetSliceKey {
    fn apply(&mut self, doc: &mut Document) -> EditActionResult {
        if !doc.has_frame(self.frame) {
            return Err(EditActionError::StaleReference(format!(
                "frame {} is outside the sprite ({} frames)",
                self.frame,
                doc.total_frames()
            )));
        }
        let slice = doc
            .slice_mut(self.slice_id)
            .ok_or_else(|| stale_slice(self.slice_id))?;

        let emptied = if self.key.is_empty() {
            let removal = slice.remove_key(self.frame);
            self.previous = removal.map(|r| r.key);
            removal.is_some_and(|r| r.emptied)
        } else {
            self.previous = slice.set_key(self.frame, self.key);
            false
        };
        if emptied {
            self.detached = doc.detach_slice(self.slice_id);
            log::debug!(
                "Cleared last key of slice {}, slice detached",
                self.slice_id
            );
        }
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> EditActionResult {
        if let Some((index, mut slice)) = self.detached.take() {
            if let Some(previous) = self.previous {
                slice.set_key(self.frame, previous);
            }
            if let Err(e) = doc.insert_slice(index, slice.clone()) {
                slice.set_key(self.frame, SliceKey::EMPTY);
                self.detached = Some((index, slice));
                return Err(invalid(e));
            }
            return Ok(());
        }

        let slice = doc
            .slice_mut(self.slice_id)
            .ok_or_else(|| stale_slice(self.slice_id))?;
        // No previous key: the empty key clears the frame again.
        slice.set_key(self.frame, self.previous.unwrap_or(SliceKey::EMPTY));
        Ok(())
    }
}
