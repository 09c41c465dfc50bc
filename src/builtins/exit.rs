use crate::cmd::Flow;

use super::{BuiltinCommand, BuiltinError};

#[derive(Debug, Default)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    /// Arguments are ignored; the shell always leaves successfully.
    fn execute(&self, args: &[String]) -> Result<Flow, BuiltinError> {
        trace!(?args, "executing exit builtin");
        Ok(Flow::Exit(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_ignores_arguments() {
        assert_eq!(Exit.execute(&[]).unwrap(), Flow::Exit(0));
        assert_eq!(
            Exit.execute(&["3".into(), "extra".into()]).unwrap(),
            Flow::Exit(0)
        );
    }
}
