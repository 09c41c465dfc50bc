use std::path::PathBuf;

use thiserror::Error;

use crate::cmd::execution_plan::{CommandPlan, ExecutionPlan, Stage};

use self::token::{tokenize, Token};

pub mod token;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("syntax error: expected file name after '{operator}'")]
    MissingRedirectTarget { operator: char },
    #[error("syntax error: missing command around '|'")]
    EmptyPipelineStage,
}

/// Tokenizes and builds one line, then resolves builtins.
pub fn parse_command(line: &str) -> Result<ExecutionPlan, SyntaxError> {
    let plan = build_plan(tokenize(line))?;

    trace!(%plan, background = plan.background, "built command plan");

    Ok(plan.resolve())
}

/// Consumes tokens until they run out or a `&` is seen.
///
/// Words go to the stage currently being built; every `|` closes that stage
/// and opens the next one. Anything after `&` is ignored.
pub fn build_plan<'a, I>(tokens: I) -> Result<CommandPlan, SyntaxError>
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut tokens = tokens.into_iter();
    let mut stages = Vec::new();
    let mut current = Stage::default();
    let mut background = false;

    while let Some(token) = tokens.next() {
        match token {
            Token::Word(word) => current.argv.push(word.to_owned()),
            Token::Background => {
                background = true;
                break;
            }
            op @ Token::RedirectOut => current.stdout = Some(redirect_target(&mut tokens, op)?),
            op @ Token::RedirectIn => current.stdin = Some(redirect_target(&mut tokens, op)?),
            Token::Pipe => {
                if current.argv.is_empty() {
                    return Err(SyntaxError::EmptyPipelineStage);
                }
                stages.push(std::mem::take(&mut current));
            }
        }
    }

    if !stages.is_empty() && current.argv.is_empty() {
        return Err(SyntaxError::EmptyPipelineStage);
    }
    stages.push(current);

    Ok(CommandPlan { stages, background })
}

fn redirect_target<'a, I>(tokens: &mut I, operator: Token<'a>) -> Result<PathBuf, SyntaxError>
where
    I: Iterator<Item = Token<'a>>,
{
    match tokens.next() {
        Some(Token::Word(path)) => Ok(PathBuf::from(path)),
        _ => Err(SyntaxError::MissingRedirectTarget {
            operator: operator.symbol().unwrap_or('?'),
        }),
    }
}
