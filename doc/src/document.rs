//! The sprite document graph.
//!
//! A [`Document`] owns its layers and slices and resolves them by stable
//! [`ObjectId`] or by display name. Mutating methods here are the
//! primitives that [`SliceCommand`](crate::SliceCommand)s are built from;
//! they are not recorded in any history on their own.

use sliceworks_core::abstract_editor::Editable;
use thiserror::Error;

use crate::keyframes::FrameIndex;
use crate::object_id::ObjectId;
use crate::slice::Slice;

/// Error type for document graph mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("slice {0} has no keys")]
    EmptySlice(ObjectId),
    #[error("slice {0} is already in the document")]
    DuplicateSlice(ObjectId),
}

/// A layer of the sprite. Only its identity matters to slice editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    id: ObjectId,
    name: String,
}

impl Layer {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The slices of a document, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slices {
    items: Vec<Slice>,
}

impl Slices {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slice> {
        self.items.iter()
    }

    /// The first slice, in display order, named `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&Slice> {
        self.items.iter().find(|s| s.name() == name)
    }

    pub fn get_by_id(&self, id: ObjectId) -> Option<&Slice> {
        self.items.iter().find(|s| s.id() == id)
    }

    /// Display position of the slice with `id`.
    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.items.iter().position(|s| s.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.position(id).is_some()
    }

    fn get_by_id_mut(&mut self, id: ObjectId) -> Option<&mut Slice> {
        self.items.iter_mut().find(|s| s.id() == id)
    }
}

/// A sprite document: frames, layers and slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: ObjectId,
    name: String,
    total_frames: FrameIndex,
    layers: Vec<Layer>,
    slices: Slices,
}

impl Editable for Document {}

impl Document {
    /// Creates an empty document with `total_frames` frames (at least one).
    pub fn new(name: impl Into<String>, total_frames: FrameIndex) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            total_frames: total_frames.max(1),
            layers: Vec::new(),
            slices: Slices::default(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_frames(&self) -> FrameIndex {
        self.total_frames
    }

    /// Changes the frame count (at least one). Keys beyond the new range are
    /// kept but can no longer be edited.
    pub fn set_total_frames(&mut self, total_frames: FrameIndex) {
        self.total_frames = total_frames.max(1);
    }

    pub fn has_frame(&self, frame: FrameIndex) -> bool {
        frame < self.total_frames
    }

    /// Appends a layer and returns its identifier.
    pub fn add_layer(&mut self, name: impl Into<String>) -> ObjectId {
        let id = ObjectId::next();
        self.layers.push(Layer {
            id,
            name: name.into(),
        });
        id
    }

    pub fn layer(&self, id: ObjectId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn slices(&self) -> &Slices {
        &self.slices
    }

    /// Appends a slice and returns its identifier.
    pub fn push_slice(&mut self, slice: Slice) -> Result<ObjectId, DocumentError> {
        let id = slice.id();
        self.insert_slice(self.slices.len(), slice)?;
        Ok(id)
    }

    /// Inserts a slice at display position `index` (clamped to the end).
    ///
    /// Slices without keys are refused: a slice exists in the document only
    /// while it has at least one key.
    pub fn insert_slice(&mut self, index: usize, slice: Slice) -> Result<(), DocumentError> {
        if slice.key_count() == 0 {
            return Err(DocumentError::EmptySlice(slice.id()));
        }
        if self.slices.contains(slice.id()) {
            return Err(DocumentError::DuplicateSlice(slice.id()));
        }
        let index = index.min(self.slices.items.len());
        log::trace!("Inserting slice {} at {index}", slice.id());
        self.slices.items.insert(index, slice);
        Ok(())
    }

    /// Detaches the slice with `id`, returning it with its former position.
    pub fn detach_slice(&mut self, id: ObjectId) -> Option<(usize, Slice)> {
        let index = self.slices.position(id)?;
        log::trace!("Detaching slice {id} from {index}");
        Some((index, self.slices.items.remove(index)))
    }

    pub(crate) fn slice_mut(&mut self, id: ObjectId) -> Option<&mut Slice> {
        self.slices.get_by_id_mut(id)
    }
}
