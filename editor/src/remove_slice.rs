//! The "Remove Slice" editor command.
//!
//! When the slice has several keys only the key at the current frame is
//! cleared; a slice with a single key is removed outright. Either way the
//! edit is one undoable "Remove Slice" step. A slice with several keys but
//! none at the current frame is left alone and reported as not found.

use std::fmt;
use std::sync::Arc;

use sliceworks_doc::{Document, ObjectId, Slice, SliceCommand};

use crate::command::EditorCommand;
use crate::context::{ContextFlags, EditContext, SharedSprite};
use crate::error::EditError;
use crate::params::Params;

/// History label of the edit.
pub const REMOVE_SLICE_LABEL: &str = "Remove Slice";

/// Which slice a command targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SliceSelector {
    #[default]
    None,
    Name(String),
    Id(ObjectId),
}

impl SliceSelector {
    /// Reads `name` and `id` from `params`. A non-empty name wins; an id that
    /// does not parse selects nothing.
    pub fn from_params(params: &Params) -> Self {
        let name = params.get("name");
        if !name.is_empty() {
            return Self::Name(name.to_owned());
        }
        match params.get("id").parse::<ObjectId>() {
            Ok(id) => Self::Id(id),
            Err(e) => {
                if params.has("id") {
                    log::debug!("Ignoring slice id '{}': {e}", params.get("id"));
                }
                Self::None
            }
        }
    }

    pub fn resolve<'d>(&self, document: &'d Document) -> Option<&'d Slice> {
        match self {
            Self::None => None,
            Self::Name(name) => document.slices().get_by_name(name),
            Self::Id(id) => document.slices().get_by_id(*id),
        }
    }
}

impl fmt::Display for SliceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("no selector"),
            Self::Name(name) => write!(f, "name '{name}'"),
            Self::Id(id) => write!(f, "id {id}"),
        }
    }
}

/// Called between releasing the read guard and requesting write access.
pub type BeforeWriteHook = Arc<dyn Fn(&SharedSprite) + Send + Sync>;

/// Removes a slice, or its key at the current frame.
#[derive(Default)]
pub struct RemoveSliceCommand {
    selector: SliceSelector,
    before_write: Option<BeforeWriteHook>,
}

impl RemoveSliceCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a hook that runs after the slice was inspected and the read
    /// guard released, before write access is requested. Other edits may land
    /// in that window; the command re-validates its target when applied.
    pub fn with_before_write(
        mut self,
        hook: impl Fn(&SharedSprite) + Send + Sync + 'static,
    ) -> Self {
        self.before_write = Some(Arc::new(hook));
        self
    }

    pub fn selector(&self) -> &SliceSelector {
        &self.selector
    }
}

impl fmt::Debug for RemoveSliceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveSliceCommand")
            .field("selector", &self.selector)
            .field("before_write", &self.before_write.is_some())
            .finish()
    }
}

impl EditorCommand for RemoveSliceCommand {
    fn id(&self) -> &'static str {
        "RemoveSlice"
    }

    fn friendly_name(&self) -> &str {
        REMOVE_SLICE_LABEL
    }

    fn load_params(&mut self, params: &Params) {
        self.selector = SliceSelector::from_params(params);
    }

    fn is_enabled(&self, ctx: &EditContext) -> bool {
        ctx.check_flags(
            ContextFlags::HAS_ACTIVE_DOCUMENT
                | ContextFlags::ACTIVE_DOCUMENT_IS_WRITABLE
                | ContextFlags::HAS_ACTIVE_LAYER,
        )
    }

    fn execute(&mut self, ctx: &EditContext) -> Result<(), EditError> {
        let document = ctx.document().ok_or(EditError::Disabled(self.id()))?;
        let frame = ctx.frame();

        let reader = document.read()?;
        let slice = self
            .selector
            .resolve(&reader)
            .ok_or_else(|| EditError::NotFound(self.selector.to_string()))?;
        let slice_id = slice.id();
        let slice_name = slice.name().to_owned();
        let clears_key = slice.key_count() > 1;
        if clears_key && slice.get_key(frame).is_none() {
            return Err(EditError::NotFound(format!(
                "a key at frame {frame} for {}",
                self.selector
            )));
        }
        let command = if clears_key {
            SliceCommand::clear_slice_key(slice_id, frame)
        } else {
            SliceCommand::remove_slice(slice_id)
        };

        drop(reader);
        if let Some(hook) = &self.before_write {
            hook(document);
        }
        let mut writer = document.write_for(ctx.config().editing.write_lock_timeout())?;
        {
            let mut tx = writer.transaction(REMOVE_SLICE_LABEL);
            tx.execute(command)?;
            tx.commit()?;
        }
        writer.notify_general_update();
        drop(writer);

        if clears_key {
            log::info!("Cleared key of slice {slice_id} '{slice_name}' at frame {frame}");
        } else {
            log::info!("Removed slice {slice_id} '{slice_name}'");
        }

        let status = ctx.status();
        status.invalidate();
        if ctx.config().status.show_tips {
            let text = if slice_name.is_empty() {
                "Slice removed".to_owned()
            } else {
                format!("Slice '{slice_name}' removed")
            };
            status.show_tip(ctx.config().status.tip_duration(), &text);
        }
        Ok(())
    }
}
