use nix::{
    errno::Errno,
    sys::{
        signal::{kill, Signal},
        wait::{waitpid, WaitPidFlag, WaitStatus},
    },
    unistd::Pid,
};
use thiserror::Error;
use tokio::task::JoinError;

use super::status::ExitStatus;

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("waitpid: {0}")]
    Wait(#[from] Errno),
    #[error("waiter task failed: {0}")]
    Join(#[from] JoinError),
}

/// Blocks until `pid` exits or is killed by a signal.
///
/// A child that merely stops is not finished, so the wait goes on.
pub fn wait_for(pid: Pid) -> Result<ExitStatus, Errno> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(status) => match ExitStatus::from_wait(status) {
                Some(exit) => {
                    debug!(%pid, %exit, "process finished");
                    return Ok(exit);
                }
                None => trace!(%pid, ?status, "process not finished"),
            },
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno),
        }
    }
}

/// Waits for every pid, in order, even if an earlier wait fails.
pub fn wait_all(pids: &[Pid]) -> Result<Vec<ExitStatus>, Errno> {
    let mut statuses = Vec::with_capacity(pids.len());
    let mut first_error = None;

    for &pid in pids {
        match wait_for(pid) {
            Ok(status) => statuses.push(status),
            Err(errno) => {
                warn!(%pid, %errno, "failed to wait for process");
                first_error.get_or_insert(errno);
            }
        }
    }

    match first_error {
        Some(errno) => Err(errno),
        None => Ok(statuses),
    }
}

/// Kills and reaps processes of a job that could not be fully started.
pub fn abandon(pids: &[Pid]) {
    for &pid in pids {
        if let Err(errno) = kill(pid, Signal::SIGKILL) {
            warn!(%pid, %errno, "failed to kill abandoned process");
        }
    }
    let _ = wait_all(pids);
}

/// Collects every child that has already finished, without blocking.
pub fn reap_finished() -> Vec<(Pid, ExitStatus)> {
    let mut finished = Vec::new();

    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(status) => {
                if let (Some(pid), Some(exit)) = (status.pid(), ExitStatus::from_wait(status)) {
                    debug!(%pid, %exit, "reaped background process");
                    finished.push((pid, exit));
                }
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                warn!(%errno, "failed to reap background processes");
                break;
            }
        }
    }

    finished
}
