use std::path::PathBuf;

use crate::cmd::Flow;

use super::{BuiltinCommand, BuiltinError};

#[derive(Debug, Default)]
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, args: &[String]) -> Result<Flow, BuiltinError> {
        trace!("executing cd builtin: {args:?}");

        let path = args
            .first()
            .map(PathBuf::from)
            .ok_or(BuiltinError::MissingArgument {
                builtin: self.name(),
            })?;

        std::env::set_current_dir(&path).map_err(|source| {
            warn!(?path, %source, "failed to cd");
            BuiltinError::ChangeDir { path, source }
        })?;

        debug!(cwd = ?std::env::current_dir().ok(), "changed directory");

        Ok(Flow::Continue)
    }
}
