//! Undo and Redo editor commands.

use sliceworks_core::abstract_editor::EditActionResult;
use sliceworks_core::access::WriteGuard;
use sliceworks_doc::Document;

use crate::command::EditorCommand;
use crate::context::{ContextFlags, EditContext};
use crate::error::EditError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Undo,
    Redo,
}

impl Step {
    fn verb(self) -> &'static str {
        match self {
            Self::Undo => "Undid",
            Self::Redo => "Redid",
        }
    }

    fn is_available(self, ctx: &EditContext) -> bool {
        let Some(document) = ctx.document() else {
            return false;
        };
        let Ok(reader) = document.read() else {
            return false;
        };
        match self {
            Self::Undo => reader.history().can_undo(),
            Self::Redo => reader.history().can_redo(),
        }
    }

    fn next_description(self, writer: &WriteGuard<'_, Document>) -> Option<String> {
        let history = writer.history();
        let next = match self {
            Self::Undo => history.undo_descriptions().next(),
            Self::Redo => history.redo_descriptions().next(),
        };
        next.map(str::to_owned)
    }

    fn apply(self, writer: &mut WriteGuard<'_, Document>) -> EditActionResult<bool> {
        match self {
            Self::Undo => writer.undo(),
            Self::Redo => writer.redo(),
        }
    }
}

fn step_enabled(step: Step, ctx: &EditContext) -> bool {
    ctx.check_flags(ContextFlags::HAS_ACTIVE_DOCUMENT | ContextFlags::ACTIVE_DOCUMENT_IS_WRITABLE)
        && step.is_available(ctx)
}

fn step_history(step: Step, id: &'static str, ctx: &EditContext) -> Result<(), EditError> {
    let document = ctx.document().ok_or(EditError::Disabled(id))?;
    let mut writer = document.write_for(ctx.config().editing.write_lock_timeout())?;

    let description = step.next_description(&writer);
    if !step.apply(&mut writer)? {
        log::debug!("Nothing to {}", id.to_lowercase());
        return Ok(());
    }
    writer.notify_general_update();
    drop(writer);

    let description = description.unwrap_or_default();
    log::info!("{} '{description}'", step.verb());

    let status = ctx.status();
    status.invalidate();
    if ctx.config().status.show_tips {
        status.show_tip(
            ctx.config().status.tip_duration(),
            &format!("{} {description}", step.verb()),
        );
    }
    Ok(())
}

/// Reverts the latest history entry of the active document.
#[derive(Debug, Default, Clone, Copy)]
pub struct UndoCommand;

impl EditorCommand for UndoCommand {
    fn id(&self) -> &'static str {
        "Undo"
    }

    fn is_enabled(&self, ctx: &EditContext) -> bool {
        step_enabled(Step::Undo, ctx)
    }

    fn execute(&mut self, ctx: &EditContext) -> Result<(), EditError> {
        step_history(Step::Undo, self.id(), ctx)
    }
}

/// Reapplies the latest undone entry of the active document.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedoCommand;

impl EditorCommand for RedoCommand {
    fn id(&self) -> &'static str {
        "Redo"
    }

    fn is_enabled(&self, ctx: &EditContext) -> bool {
        step_enabled(Step::Redo, ctx)
    }

    fn execute(&mut self, ctx: &EditContext) -> Result<(), EditError> {
        step_history(Step::Redo, self.id(), ctx)
    }
}
