//! The part of a launch that runs between `fork` and `exec`.
//!
//! Nothing here allocates or formats: paths, program names and the
//! null-terminated argv pointer array are prepared by the parent, and
//! diagnostics are written to fd 2 piece by piece.

use std::{ffi::CStr, os::unix::io::RawFd};

use nix::{
    errno::Errno,
    fcntl::{open, OFlag},
    sys::{
        signal::{signal, SigHandler, Signal},
        stat::Mode,
    },
    unistd::{close, dup2, write},
};

use super::launch::PreparedStage;

const STDIN: RawFd = 0;
const STDOUT: RawFd = 1;
const STDERR: RawFd = 2;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
pub const EXIT_NOT_FOUND: i32 = 127;

/// Pipe descriptors a forked stage starts with.
#[derive(Debug)]
pub(crate) struct ChildWiring<'a> {
    pub stdin: Option<RawFd>,
    pub stdout: Option<RawFd>,
    /// Every pipe end the parent held at fork time.
    pub inherited: &'a [RawFd],
}

/// Wires descriptors and replaces the process image. Never returns.
pub(crate) fn exec_stage(stage: &PreparedStage, wiring: ChildWiring<'_>) -> ! {
    // the Rust runtime ignores SIGPIPE and that disposition survives exec
    // SAFETY: resetting to the default handler installs no Rust code.
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    if let Some(fd) = wiring.stdin {
        duplicate(fd, STDIN, b"dup2");
    }
    if let Some(fd) = wiring.stdout {
        duplicate(fd, STDOUT, b"dup2");
    }
    for &fd in wiring.inherited {
        if fd > STDERR {
            let _ = close(fd);
        }
    }

    if let Some(path) = &stage.stdin {
        redirect(path, OFlag::O_RDONLY, STDIN);
    }
    if let Some(path) = &stage.stdout {
        redirect(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, STDOUT);
    }

    // SAFETY: `program` and every non-null entry of `argv_ptrs` point into
    // C strings owned by `stage`, and the array ends with a null pointer.
    unsafe { libc::execvp(stage.program.as_ptr(), stage.argv_ptrs.as_ptr()) };

    match Errno::last() {
        Errno::ENOENT => {
            report(stage.program.as_bytes(), "command not found");
            exit(EXIT_NOT_FOUND)
        }
        errno => fail(stage.program.as_bytes(), errno, EXIT_NOT_EXECUTABLE),
    }
}

/// Opens `path` onto `target`, closing the temporary descriptor.
fn redirect(path: &CStr, flags: OFlag, target: RawFd) {
    let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
    let fd = open(path, flags, mode)
        .unwrap_or_else(|errno| fail(path.to_bytes(), errno, EXIT_FAILURE));
    if fd != target {
        duplicate(fd, target, path.to_bytes());
        let _ = close(fd);
    }
}

/// `dup2` that leaves a descriptor already in place untouched.
fn duplicate(fd: RawFd, target: RawFd, subject: &[u8]) {
    if fd == target {
        return;
    }
    if let Err(errno) = dup2(fd, target) {
        fail(subject, errno, EXIT_FAILURE);
    }
}

fn fail(subject: &[u8], errno: Errno, code: i32) -> ! {
    report(subject, errno.desc());
    exit(code)
}

fn report(subject: &[u8], reason: &str) {
    for part in [
        b"pipesh: ".as_slice(),
        subject,
        b": ".as_slice(),
        reason.as_bytes(),
        b"\n".as_slice(),
    ] {
        let _ = write(STDERR, part);
    }
}

fn exit(code: i32) -> ! {
    // SAFETY: `_exit` has no preconditions.
    unsafe { libc::_exit(code) }
}
