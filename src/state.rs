use std::{
    fmt,
    io::{self, Write},
};

use color_eyre::Result;
use termion::color;

use crate::{
    cmd::Flow,
    config::{Config, SyntaxErrorPolicy},
    input::{self, InputMessage},
    parse::parse_command,
    process::wait,
};

/// The read-execute loop around the engine.
pub struct State {
    pub config: Config,
    interactive: bool,
    colored: bool,
}

impl State {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            interactive: termion::is_tty(&io::stdin()),
            colored: termion::is_tty(&io::stderr()),
        }
    }

    pub fn render<W: Write>(&self, stdout: &mut W) -> io::Result<()> {
        if self.interactive {
            write!(stdout, "{}", self.config.prompt)?;
            stdout.flush()?;
        }

        Ok(())
    }

    /// Reads and executes lines until `exit` or end of input, returning the
    /// status the shell should exit with.
    pub async fn run(&mut self) -> Result<i32> {
        loop {
            self.reap_background();
            self.render(&mut io::stdout().lock())?;

            let line = match input::read_line().await {
                Ok(InputMessage::Line(line)) => line,
                Ok(InputMessage::Eof) => {
                    trace!("end of input");
                    if self.interactive {
                        println!();
                    }
                    return Ok(0);
                }
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    self.report(&err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if let Flow::Exit(code) = self.execute(&line).await {
                trace!(code, "leaving read loop");
                return Ok(code);
            }
        }
    }

    /// Parses and runs one line. Errors are reported here and never escape.
    pub async fn execute(&mut self, line: &str) -> Flow {
        let plan = match parse_command(line) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(%err, ?line, "rejected line");
                self.report(&err);
                return match self.config.syntax_errors {
                    SyntaxErrorPolicy::Recover => Flow::Continue,
                    SyntaxErrorPolicy::Fatal => Flow::Exit(1),
                };
            }
        };

        trace!(?plan, "execution plan");

        match plan.execute(&mut io::stdout()).await {
            Ok(flow) => flow,
            Err(err) => {
                error!(%err, "command failed");
                self.report(&err);
                Flow::Continue
            }
        }
    }

    fn reap_background(&self) {
        for (pid, status) in wait::reap_finished() {
            println!("Process {pid} done ({status})");
        }
    }

    fn report(&self, err: &dyn fmt::Display) {
        let mut stderr = io::stderr().lock();
        let _ = if self.colored {
            writeln!(
                stderr,
                "{}pipesh:{} {err}",
                color::Fg(color::Red),
                color::Fg(color::Reset)
            )
        } else {
            writeln!(stderr, "pipesh: {err}")
        };
    }
}
