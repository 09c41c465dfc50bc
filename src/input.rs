use std::io::{self, BufRead};

#[derive(Debug, PartialEq, Eq)]
pub enum InputMessage {
    Line(String),
    Eof,
}

/// Reads one line from stdin on the blocking pool.
///
/// Only a single line is requested per call, so a foreground child started
/// afterwards is the only reader of the terminal.
pub async fn read_line() -> io::Result<InputMessage> {
    tokio::task::spawn_blocking(|| read_line_from(&mut io::stdin().lock()))
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?
}

pub fn read_line_from<R: BufRead>(reader: &mut R) -> io::Result<InputMessage> {
    let mut line = String::new();

    match reader.read_line(&mut line)? {
        0 => Ok(InputMessage::Eof),
        _ => Ok(InputMessage::Line(line)),
    }
}
