use std::{
    ffi::{CString, NulError},
    os::unix::{
        ffi::OsStrExt,
        io::{AsRawFd, FromRawFd, OwnedFd, RawFd},
    },
    path::Path,
};

use nix::{
    errno::Errno,
    fcntl::{fcntl, FcntlArg, FdFlag},
    unistd::{fork, pipe, ForkResult, Pid},
};
use thiserror::Error;

use crate::cmd::execution_plan::{CommandPlan, Stage};

use super::{
    child::{self, ChildWiring},
    wait, Job,
};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("empty command")]
    EmptyCommand,
    #[error("{word:?}: argument contains a NUL byte")]
    InteriorNul {
        word: String,
        #[source]
        source: NulError,
    },
    #[error("pipe: {0}")]
    Pipe(#[source] Errno),
    #[error("fork: {0}")]
    Fork(#[source] Errno),
}

/// A stage converted to what `execvp` and `open` take, ahead of `fork`.
#[derive(Debug)]
pub(crate) struct PreparedStage {
    pub program: CString,
    pub argv: Vec<CString>,
    /// Null-terminated pointers into `argv`.
    pub argv_ptrs: Vec<*const libc::c_char>,
    pub stdin: Option<CString>,
    pub stdout: Option<CString>,
}

impl PreparedStage {
    fn new(stage: &Stage) -> Result<Self, LaunchError> {
        let argv = stage
            .argv
            .iter()
            .map(|arg| c_string(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        let program = argv.first().cloned().ok_or(LaunchError::EmptyCommand)?;
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();

        Ok(Self {
            program,
            argv,
            argv_ptrs,
            stdin: stage.stdin.as_deref().map(c_path).transpose()?,
            stdout: stage.stdout.as_deref().map(c_path).transpose()?,
        })
    }
}

fn c_string(bytes: &[u8]) -> Result<CString, LaunchError> {
    CString::new(bytes).map_err(|source| LaunchError::InteriorNul {
        word: String::from_utf8_lossy(bytes).into_owned(),
        source,
    })
}

fn c_path(path: &Path) -> Result<CString, LaunchError> {
    c_string(path.as_os_str().as_bytes())
}

/// The pipe between two adjacent stages, as held by the parent.
struct Channel {
    read: OwnedFd,
    write: OwnedFd,
}

impl Channel {
    fn open() -> Result<Self, LaunchError> {
        let (read, write) = pipe().map_err(LaunchError::Pipe)?;

        // SAFETY: both descriptors were just returned by pipe(2) and have no other owner.
        let channel = unsafe {
            Self {
                read: OwnedFd::from_raw_fd(read),
                write: OwnedFd::from_raw_fd(write),
            }
        };

        for fd in [read, write] {
            fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(LaunchError::Pipe)?;
        }

        trace!(read, write, "opened pipe");

        Ok(channel)
    }
}

/// Forks one process per stage, connecting each stage's stdout to the next
/// stage's stdin.
///
/// Returns once every stage is running; the parent holds no pipe
/// descriptors afterwards. If a later stage cannot be started, the stages
/// already running are terminated and reaped before the error is returned.
pub fn launch(plan: &CommandPlan) -> Result<Job, LaunchError> {
    let stages = plan
        .stages
        .iter()
        .map(PreparedStage::new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut pids = Vec::with_capacity(stages.len());

    match spawn_stages(&stages, &mut pids) {
        Ok(()) => {
            debug!(?pids, background = plan.background, "launched job");
            Ok(Job::new(pids, plan.background))
        }
        Err(err) => {
            error!(%err, spawned = pids.len(), "failed to launch job");
            wait::abandon(&pids);
            Err(err)
        }
    }
}

fn spawn_stages(stages: &[PreparedStage], pids: &mut Vec<Pid>) -> Result<(), LaunchError> {
    let mut upstream: Option<OwnedFd> = None;

    for (index, stage) in stages.iter().enumerate() {
        let channel = if index + 1 < stages.len() {
            Some(Channel::open()?)
        } else {
            None
        };

        let stdin = upstream.as_ref().map(AsRawFd::as_raw_fd);
        let stdout = channel.as_ref().map(|c| c.write.as_raw_fd());
        let inherited = stdin
            .into_iter()
            .chain(
                channel
                    .iter()
                    .flat_map(|c| [c.read.as_raw_fd(), c.write.as_raw_fd()]),
            )
            .collect::<Vec<RawFd>>();

        let pid = spawn_stage(
            stage,
            ChildWiring {
                stdin,
                stdout,
                inherited: &inherited,
            },
        )?;
        pids.push(pid);

        // the previous read end and this write end now live only in children
        upstream = channel.map(|c| c.read);
    }

    Ok(())
}

fn spawn_stage(stage: &PreparedStage, wiring: ChildWiring<'_>) -> Result<Pid, LaunchError> {
    trace!(program = ?stage.program, ?wiring, "forking stage");

    // SAFETY: the child only rewires descriptors and calls exec or _exit.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            trace!(pid = %child, "spawned stage");
            Ok(child)
        }
        Ok(ForkResult::Child) => child::exec_stage(stage, wiring),
        Err(errno) => Err(LaunchError::Fork(errno)),
    }
}
