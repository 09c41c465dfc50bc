use nix::unistd::Pid;

use self::{status::ExitStatus, wait::WaitError};

pub mod child;
pub mod launch;
pub mod status;
pub mod wait;

/// The processes spawned for one command line.
///
/// Nothing keeps a job around: it is consumed either by waiting on it or by
/// detaching it into the background.
#[derive(Debug)]
pub struct Job {
    pids: Vec<Pid>,
    background: bool,
}

impl Job {
    pub fn new(pids: Vec<Pid>, background: bool) -> Self {
        Self { pids, background }
    }

    pub fn pids(&self) -> &[Pid] {
        &self.pids
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    /// Blocks (on the blocking pool) until every stage has terminated.
    pub async fn wait(self) -> Result<Vec<ExitStatus>, WaitError> {
        let pids = self.pids;
        let statuses = tokio::task::spawn_blocking(move || wait::wait_all(&pids)).await??;
        Ok(statuses)
    }

    /// Stops tracking the job and returns every stage's pid, in stage order.
    ///
    /// Each of them is reaped later on its own, so all of them get reported.
    pub fn detach(self) -> Vec<Pid> {
        trace!(pids = ?self.pids, "detaching background job");
        self.pids
    }
}
