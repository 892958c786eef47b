//! The editor command protocol.
//!
//! An [`EditorCommand`] is created once, then for every invocation it
//! receives its [`Params`], is asked whether it is enabled in the current
//! [`EditContext`], and finally executes. [`run`] drives that sequence.

use crate::context::EditContext;
use crate::error::EditError;
use crate::params::Params;

/// A user-invocable editor operation.
pub trait EditorCommand {
    /// Stable identifier, e.g. `"RemoveSlice"`.
    fn id(&self) -> &'static str;

    /// Name shown to the user. Defaults to [`id`](Self::id).
    fn friendly_name(&self) -> &str {
        self.id()
    }

    /// Reads the parameters of the next invocation.
    fn load_params(&mut self, _params: &Params) {}

    fn is_enabled(&self, ctx: &EditContext) -> bool;

    fn execute(&mut self, ctx: &EditContext) -> Result<(), EditError>;
}

/// Loads `params` into `command`, then executes it if it is enabled.
///
/// Failures are logged here. The document is unchanged whenever an error
/// is returned.
pub fn run(
    command: &mut dyn EditorCommand,
    ctx: &EditContext,
    params: &Params,
) -> Result<(), EditError> {
    command.load_params(params);
    if !command.is_enabled(ctx) {
        log::debug!("'{}' is disabled", command.friendly_name());
        return Err(EditError::Disabled(command.id()));
    }

    let result = command.execute(ctx);
    if let Err(e) = &result {
        log::warn!("'{}' skipped: {e}", command.friendly_name());
    }
    result
}
