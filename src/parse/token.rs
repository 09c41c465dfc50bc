use logos::Logos;
use thiserror::Error;

/// Required by logos. Every character is either a delimiter, an operator or
/// part of a word, so the lexer never yields it.
#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unknown token")]
    UnknownToken,
}

/// One lexical unit of a command line.
///
/// Words borrow from the input line; the lexer never mutates it. Operator
/// characters end a word even when they are not surrounded by whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\x07]+", error = LexerError)]
pub enum Token<'a> {
    #[token("&")]
    Background,
    #[token(">")]
    RedirectOut,
    #[token("<")]
    RedirectIn,
    #[token("|")]
    Pipe,

    #[regex(r"[^ \t\r\n\x07&<>|]+", |lex| lex.slice())]
    Word(&'a str),
}

/// Lazily splits `line` into tokens.
pub fn tokenize(line: &str) -> impl Iterator<Item = Token<'_>> {
    Token::lexer(line).filter_map(Result::ok)
}

impl Token<'_> {
    pub fn is_operator(&self) -> bool {
        !matches!(self, Self::Word(_))
    }

    pub fn symbol(&self) -> Option<char> {
        match self {
            Self::Background => Some('&'),
            Self::RedirectOut => Some('>'),
            Self::RedirectIn => Some('<'),
            Self::Pipe => Some('|'),
            Self::Word(_) => None,
        }
    }
}
