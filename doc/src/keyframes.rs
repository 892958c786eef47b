//! Sparse per-frame property storage.
//!
//! [`Keyframes`] maps frame indices to values. A key stays in effect for the
//! frames after it until the next key ([`Keyframes::key_at`]), while
//! insertion and removal always address one exact frame.

use std::collections::BTreeMap;

/// Index of an animation frame, starting at 0.
pub type FrameIndex = u32;

/// Ordered mapping from frame index to a keyed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyframes<V> {
    keys: BTreeMap<FrameIndex, V>,
}

impl<V> Keyframes<V> {
    pub fn new() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The key defined at exactly `frame`.
    pub fn get(&self, frame: FrameIndex) -> Option<&V> {
        self.keys.get(&frame)
    }

    /// The key in effect at `frame`: the closest key at or before it.
    pub fn key_at(&self, frame: FrameIndex) -> Option<(FrameIndex, &V)> {
        self.keys
            .range(..=frame)
            .next_back()
            .map(|(&f, v)| (f, v))
    }

    /// Inserts or replaces the key at `frame`, returning the previous one.
    pub fn insert(&mut self, frame: FrameIndex, value: V) -> Option<V> {
        self.keys.insert(frame, value)
    }

    /// Removes the key at exactly `frame`.
    pub fn remove(&mut self, frame: FrameIndex) -> Option<V> {
        self.keys.remove(&frame)
    }

    /// Frames that carry a key, in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.keys.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameIndex, &V)> {
        self.keys.iter().map(|(&f, v)| (f, v))
    }
}

impl<V> Default for Keyframes<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(FrameIndex, V)> for Keyframes<V> {
    fn from_iter<I: IntoIterator<Item = (FrameIndex, V)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
