//! Slices: named regions of a sprite whose geometry is keyed per frame.

use crate::geometry::{Point, Rect};
use crate::keyframes::{FrameIndex, Keyframes};
use crate::object_id::ObjectId;

/// Geometry of a slice at one frame.
///
/// A key with empty `bounds` is the empty key. Setting it on a frame clears
/// that frame's key instead of storing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SliceKey {
    /// Area of the slice in sprite coordinates.
    pub bounds: Rect,
    /// 9-slice center, relative to `bounds`. Empty when unused.
    pub center: Rect,
    /// Pivot point, relative to `bounds`.
    pub pivot: Option<Point>,
}

impl SliceKey {
    /// The empty key.
    pub const EMPTY: Self = Self {
        bounds: Rect::new(0, 0, 0, 0),
        center: Rect::new(0, 0, 0, 0),
        pivot: None,
    };

    pub const fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            center: Rect::new(0, 0, 0, 0),
            pivot: None,
        }
    }

    pub const fn with_center(mut self, center: Rect) -> Self {
        self.center = center;
        self
    }

    pub const fn with_pivot(mut self, pivot: Point) -> Self {
        self.pivot = Some(pivot);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub const fn has_center(&self) -> bool {
        !self.center.is_empty()
    }
}

/// Outcome of [`Slice::remove_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRemoval {
    /// The key that was removed.
    pub key: SliceKey,
    /// `true` when that was the slice's last key. A slice without keys must
    /// not stay in a document.
    pub emptied: bool,
}

/// A named, independently addressable region of a sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    id: ObjectId,
    name: String,
    keys: Keyframes<SliceKey>,
}

impl Slice {
    /// Creates a slice with a fresh identifier and no keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            keys: Keyframes::new(),
        }
    }

    /// Builder helper: sets a key and returns the slice.
    pub fn with_key(mut self, frame: FrameIndex, key: SliceKey) -> Self {
        self.set_key(frame, key);
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// The key defined at exactly `frame`.
    pub fn get_key(&self, frame: FrameIndex) -> Option<&SliceKey> {
        self.keys.get(frame)
    }

    /// The key in effect at `frame` (the closest key at or before it).
    pub fn key_at(&self, frame: FrameIndex) -> Option<&SliceKey> {
        self.keys.key_at(frame).map(|(_, key)| key)
    }

    pub fn keys(&self) -> &Keyframes<SliceKey> {
        &self.keys
    }

    /// Inserts or replaces the key at `frame`, returning the previous key.
    ///
    /// The [empty key](SliceKey::EMPTY) clears the frame instead.
    pub fn set_key(&mut self, frame: FrameIndex, key: SliceKey) -> Option<SliceKey> {
        if key.is_empty() {
            self.keys.remove(frame)
        } else {
            self.keys.insert(frame, key)
        }
    }

    /// Removes the key at exactly `frame`.
    pub fn remove_key(&mut self, frame: FrameIndex) -> Option<KeyRemoval> {
        let key = self.keys.remove(frame)?;
        Some(KeyRemoval {
            key,
            emptied: self.keys.is_empty(),
        })
    }
}
