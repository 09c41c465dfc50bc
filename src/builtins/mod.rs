use std::{io, path::PathBuf};

use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::cmd::Flow;

pub mod cd;
pub mod exit;

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("expected argument to \"{builtin}\"")]
    MissingArgument { builtin: &'static str },
    #[error("cd: {}: {source}", .path.display())]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A command the shell interprets itself instead of spawning.
#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn execute(&self, args: &[String]) -> Result<Flow, BuiltinError>;
}

#[enum_dispatch]
#[derive(Debug, EnumIter)]
pub enum BuiltinCommands {
    Cd(cd::Cd),
    Exit(exit::Exit),
}

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }
}
