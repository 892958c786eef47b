//! What an editor command runs against.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use sliceworks_core::access::SharedDocument;
use sliceworks_doc::{Document, FrameIndex, ObjectId};

use crate::config::EditorConfig;
use crate::status::{LogStatusSink, StatusSink};

/// A sprite document shared between the editor and background readers.
pub type SharedSprite = Arc<SharedDocument<Document>>;

/// Wraps `document` for editing with the history bound from `config`.
pub fn share(document: Document, config: &EditorConfig) -> SharedSprite {
    Arc::new(SharedDocument::with_max_undo(
        document,
        config.editing.max_undo,
    ))
}

bitflags! {
    /// Facts about an [`EditContext`] that commands check before running.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u32 {
        /// There is an open active document.
        const HAS_ACTIVE_DOCUMENT = 1 << 0;
        /// No writer holds the active document.
        const ACTIVE_DOCUMENT_IS_READABLE = 1 << 1;
        /// No guard of any kind holds the active document.
        const ACTIVE_DOCUMENT_IS_WRITABLE = 1 << 2;
        /// The active layer exists in the active document.
        const HAS_ACTIVE_LAYER = 1 << 3;
    }
}

/// The active document, frame and layer plus editor settings.
pub struct EditContext {
    document: Option<SharedSprite>,
    frame: FrameIndex,
    active_layer: Option<ObjectId>,
    config: EditorConfig,
    status: Arc<dyn StatusSink>,
}

impl EditContext {
    /// A context with no active document that reports to the log.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            document: None,
            frame: 0,
            active_layer: None,
            config,
            status: Arc::new(LogStatusSink),
        }
    }

    pub fn with_document(mut self, document: SharedSprite) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_frame(mut self, frame: FrameIndex) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_active_layer(mut self, layer: ObjectId) -> Self {
        self.active_layer = Some(layer);
        self
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    pub fn document(&self) -> Option<&SharedSprite> {
        self.document.as_ref()
    }

    pub fn set_document(&mut self, document: Option<SharedSprite>) {
        self.document = document;
    }

    /// The current frame.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn set_frame(&mut self, frame: FrameIndex) {
        self.frame = frame;
    }

    pub fn active_layer(&self) -> Option<ObjectId> {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, layer: Option<ObjectId>) {
        self.active_layer = layer;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn status(&self) -> &dyn StatusSink {
        self.status.as_ref()
    }

    /// Computes the flags that hold right now.
    ///
    /// The layer is only checked while the document is readable, so this
    /// never waits on a writer.
    pub fn flags(&self) -> ContextFlags {
        let mut flags = ContextFlags::empty();
        let Some(document) = &self.document else {
            return flags;
        };
        if document.is_closed() {
            return flags;
        }
        flags |= ContextFlags::HAS_ACTIVE_DOCUMENT;

        if document.is_write_locked() {
            return flags;
        }
        flags |= ContextFlags::ACTIVE_DOCUMENT_IS_READABLE;
        if !document.is_locked() {
            flags |= ContextFlags::ACTIVE_DOCUMENT_IS_WRITABLE;
        }

        if let Some(layer) = self.active_layer
            && let Ok(reader) = document.read()
            && reader.layer(layer).is_some()
        {
            flags |= ContextFlags::HAS_ACTIVE_LAYER;
        }
        flags
    }

    /// Returns `true` if every flag in `required` holds.
    pub fn check_flags(&self, required: ContextFlags) -> bool {
        self.flags().contains(required)
    }
}

impl fmt::Debug for EditContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditContext")
            .field("document", &self.document)
            .field("frame", &self.frame)
            .field("active_layer", &self.active_layer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
