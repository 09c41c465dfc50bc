use std::{fmt, path::PathBuf};

use itertools::Itertools;

use crate::builtins::{BuiltinCommand, BuiltinCommands};

/// What one input line resolves to.
#[derive(Debug)]
pub enum ExecutionPlan {
    /// Blank line.
    NoOp,
    /// Runs inside the shell process; never forks.
    Builtin {
        builtin: BuiltinCommands,
        args: Vec<String>,
    },
    /// One or more external programs connected stage to stage.
    Spawn(CommandPlan),
}

/// A single command of a pipeline along with its file redirections.
///
/// A file redirection takes precedence over the pipe connection for the
/// same descriptor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stage {
    pub argv: Vec<String>,
    pub stdin: Option<PathBuf>,
    pub stdout: Option<PathBuf>,
}

impl Stage {
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.iter().join(" "))?;
        if let Some(path) = &self.stdin {
            write!(f, " < {}", path.display())?;
        }
        if let Some(path) = &self.stdout {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

/// The structured form of one command line as produced by the builder.
///
/// There is always at least one stage. Stage `i` writes into stage `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    pub stages: Vec<Stage>,
    pub background: bool,
}

impl Default for CommandPlan {
    fn default() -> Self {
        Self {
            stages: vec![Stage::default()],
            background: false,
        }
    }
}

impl CommandPlan {
    pub fn argv(&self) -> &[String] {
        &self.stages[0].argv
    }

    pub fn redirect_in(&self) -> Option<&PathBuf> {
        self.stages[0].stdin.as_ref()
    }

    pub fn redirect_out(&self) -> Option<&PathBuf> {
        self.stages[0].stdout.as_ref()
    }

    /// Argument vector of the stage fed by the first pipe, if any.
    pub fn pipe_argv(&self) -> Option<&[String]> {
        self.stages.get(1).map(|stage| stage.argv.as_slice())
    }

    pub fn is_pipeline(&self) -> bool {
        self.stages.len() > 1
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.stages.as_slice(), [only] if only.argv.is_empty())
    }

    /// Decides between a no-op, a builtin and external processes.
    ///
    /// Builtins are only recognised when the line is a single command.
    pub fn resolve(self) -> ExecutionPlan {
        if self.is_noop() {
            return ExecutionPlan::NoOp;
        }

        if let [stage] = self.stages.as_slice() {
            if let Some(builtin) = stage.program().and_then(BuiltinCommands::from_name) {
                trace!(name = builtin.name(), "resolved builtin");
                return ExecutionPlan::Builtin {
                    builtin,
                    args: stage.argv[1..].to_vec(),
                };
            }
        }

        ExecutionPlan::Spawn(self)
    }
}

impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stages.iter().join(" | "))?;
        if self.background {
            write!(f, " &")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(argv: &[&str]) -> Stage {
        Stage {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            ..Stage::default()
        }
    }

    #[test]
    fn blank_plan_is_noop() {
        assert!(matches!(CommandPlan::default().resolve(), ExecutionPlan::NoOp));

        let plan = CommandPlan {
            stages: vec![Stage {
                stdout: Some("out.txt".into()),
                ..Stage::default()
            }],
            background: true,
        };
        assert!(matches!(plan.resolve(), ExecutionPlan::NoOp));
    }

    #[test]
    fn single_builtin_resolves_to_builtin() {
        let plan = CommandPlan {
            stages: vec![stage(&["cd", "/tmp"])],
            background: false,
        };
        match plan.resolve() {
            ExecutionPlan::Builtin { builtin, args } => {
                assert_eq!(builtin.name(), "cd");
                assert_eq!(args, vec!["/tmp".to_string()]);
            }
            other => panic!("expected builtin, got {other:?}"),
        }
    }

    #[test]
    fn builtin_names_inside_pipelines_are_external() {
        let plan = CommandPlan {
            stages: vec![stage(&["exit"]), stage(&["cat"])],
            background: false,
        };
        assert!(matches!(plan.resolve(), ExecutionPlan::Spawn(_)));
    }

    #[test]
    fn accessors_follow_first_two_stages() {
        let plan = CommandPlan {
            stages: vec![
                Stage {
                    stdin: Some("in".into()),
                    ..stage(&["sort"])
                },
                stage(&["uniq", "-c"]),
            ],
            background: false,
        };
        assert_eq!(plan.argv(), ["sort".to_string()]);
        assert_eq!(plan.redirect_in(), Some(&PathBuf::from("in")));
        assert_eq!(plan.redirect_out(), None);
        assert_eq!(
            plan.pipe_argv(),
            Some(["uniq".to_string(), "-c".to_string()].as_slice())
        );
        assert!(plan.is_pipeline());
    }

    #[test]
    fn display_renders_the_line() {
        let plan = CommandPlan {
            stages: vec![
                Stage {
                    stdin: Some("in".into()),
                    ..stage(&["sort", "-r"])
                },
                Stage {
                    stdout: Some("out".into()),
                    ..stage(&["head"])
                },
            ],
            background: true,
        };
        assert_eq!(plan.to_string(), "sort -r < in | head > out &");
    }
}
