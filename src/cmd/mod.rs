use thiserror::Error;

use crate::{
    builtins::BuiltinError,
    process::{launch::LaunchError, wait::WaitError},
};

pub mod execute;
pub mod execution_plan;

/// What the read loop should do after a line has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Wait(#[from] WaitError),
}
