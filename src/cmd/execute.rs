use std::io::Write;

use super::{execution_plan::ExecutionPlan, ExecuteError, Flow};
use crate::{builtins::BuiltinCommand, process::launch::launch};

impl ExecutionPlan {
    /// Runs the plan, blocking until a foreground job has terminated.
    ///
    /// Background jobs are reported on `out` as soon as they are running.
    pub async fn execute<W: Write>(self, out: &mut W) -> Result<Flow, ExecuteError> {
        match self {
            Self::NoOp => Ok(Flow::Continue),
            Self::Builtin { builtin, args } => Ok(builtin.execute(&args)?),
            Self::Spawn(plan) => {
                trace!(%plan, "spawning");

                let job = launch(&plan)?;

                if job.is_background() {
                    job.detach()
                        .iter()
                        .try_for_each(|pid| writeln!(out, "Process {pid} running in background"))
                        .and_then(|_| out.flush())
                        .unwrap_or_else(|err| warn!(%err, "failed to report background job"));
                } else {
                    let statuses = job.wait().await?;
                    debug!(?statuses, "foreground job finished");
                }

                Ok(Flow::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use nix::{
        sys::signal::{kill, Signal},
        unistd::Pid,
    };

    use super::*;
    use crate::{builtins::BuiltinError, parse::parse_command, process::wait};

    async fn execute(line: &str) -> (Result<Flow, ExecuteError>, String) {
        let mut out = Vec::new();
        let res = parse_command(line).unwrap().execute(&mut out).await;
        (res, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn blank_line_is_a_noop() {
        let (res, out) = execute("   ").await;
        assert_eq!(res.unwrap(), Flow::Continue);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn exit_stops_the_loop() {
        let (res, _) = execute("exit 1 2 3").await;
        assert_eq!(res.unwrap(), Flow::Exit(0));
    }

    #[tokio::test]
    async fn builtin_errors_are_recoverable() {
        let (res, _) = execute("cd").await;
        assert!(matches!(
            res,
            Err(ExecuteError::Builtin(BuiltinError::MissingArgument { .. }))
        ));
    }

    #[tokio::test]
    async fn failing_commands_still_continue() {
        let (res, out) = execute("pipesh-no-such-command").await;
        assert_eq!(res.unwrap(), Flow::Continue);
        assert!(out.is_empty());

        let (res, _) = execute("false").await;
        assert_eq!(res.unwrap(), Flow::Continue);
    }

    #[tokio::test]
    async fn background_job_reports_pid_without_blocking() {
        let started = Instant::now();
        let (res, out) = execute("sleep 30 &").await;

        assert_eq!(res.unwrap(), Flow::Continue);
        assert!(started.elapsed() < Duration::from_secs(5));

        let pid = out
            .strip_prefix("Process ")
            .and_then(|rest| rest.strip_suffix(" running in background\n"))
            .and_then(|pid| pid.parse::<i32>().ok())
            .map(Pid::from_raw)
            .expect("background pid reported");

        assert!(kill(pid, None::<Signal>).is_ok());
        wait::abandon(&[pid]);
    }

    #[tokio::test]
    async fn background_pipeline_reports_every_stage() {
        let (res, out) = execute("sleep 30 | sleep 30 &").await;
        assert_eq!(res.unwrap(), Flow::Continue);

        let pids: Vec<Pid> = out
            .lines()
            .map(|line| {
                line.strip_prefix("Process ")
                    .and_then(|rest| rest.strip_suffix(" running in background"))
                    .and_then(|pid| pid.parse::<i32>().ok())
                    .map(Pid::from_raw)
                    .unwrap_or_else(|| panic!("unexpected report: {line:?}"))
            })
            .collect();

        assert_eq!(pids.len(), 2, "{out}");
        assert_ne!(pids[0], pids[1]);
        for pid in &pids {
            assert!(kill(*pid, None::<Signal>).is_ok());
        }
        wait::abandon(&pids);
    }
}
