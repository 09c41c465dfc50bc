use std::fmt;

use nix::sys::{signal::Signal, wait::WaitStatus};

/// How a spawned process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Exited(i32),
    Signaled(Signal),
}

impl ExitStatus {
    /// Stopped, continued and still-running states are not terminal.
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Self::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Self::Signaled(signal)),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Signaled(_) => None,
        }
    }

    pub fn success(&self) -> bool {
        self.code() == Some(0)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit {code}"),
            Self::Signaled(signal) => write!(f, "signal {}", signal.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use nix::unistd::Pid;

    use super::*;

    #[test]
    fn only_terminal_states_convert() {
        let pid = Pid::from_raw(42);

        assert_eq!(
            ExitStatus::from_wait(WaitStatus::Exited(pid, 3)),
            Some(ExitStatus::Exited(3))
        );
        assert_eq!(
            ExitStatus::from_wait(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(ExitStatus::Signaled(Signal::SIGKILL))
        );
        assert_eq!(
            ExitStatus::from_wait(WaitStatus::Stopped(pid, Signal::SIGTSTP)),
            None
        );
        assert_eq!(ExitStatus::from_wait(WaitStatus::StillAlive), None);
    }

    #[test]
    fn success_and_display() {
        assert!(ExitStatus::Exited(0).success());
        assert!(!ExitStatus::Exited(127).success());
        assert!(!ExitStatus::Signaled(Signal::SIGTERM).success());
        assert_eq!(ExitStatus::Exited(1).to_string(), "exit 1");
        assert_eq!(
            ExitStatus::Signaled(Signal::SIGTERM).to_string(),
            "signal SIGTERM"
        );
    }
}
