use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a document object (slice, layer, document).
///
/// Identifiers come from a process-wide counter: they are unique for the
/// lifetime of the process and never reused, even after the object they
/// named is destroyed. An object that is detached and later reinserted (by
/// undo, for instance) keeps its identifier.
///
/// Zero is never handed out; it is the "null id" and does not parse.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(NonZeroU64);

impl ObjectId {
    /// Allocates a fresh identifier.
    pub fn next() -> Self {
        let raw = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 allocations to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MAX))
    }

    /// Rebuilds an identifier from its raw value. `None` for the null id.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an [`ObjectId`] from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseObjectIdError {
    #[error("empty object id")]
    Empty,
    #[error("object id 0 is the null id")]
    Null,
    #[error("invalid object id '{0}'")]
    Invalid(String),
}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseObjectIdError::Empty);
        }
        let raw: u64 = s
            .parse()
            .map_err(|_| ParseObjectIdError::Invalid(s.to_owned()))?;
        Self::from_raw(raw).ok_or(ParseObjectIdError::Null)
    }
}
