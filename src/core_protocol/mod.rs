// Wire-format translation only: no sockets, no filesystem, no side effects.

pub mod command;
pub mod reply;

use thiserror::Error;

use crate::constants::MAX_ARGUMENT_LENGTH;
use self::command::MftpCommand;

/// A parsed inbound command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub command: MftpCommand,
    pub argument: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command line")]
    EmptyLine,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("argument too long: {0} bytes")]
    ArgumentTooLong(usize),
}

/// Parses one CRLF-stripped command line into `COMMAND [argument]`.
///
/// The command token is case-insensitive and must belong to the fixed
/// command set. The argument is the remainder of the line verbatim (it is
/// not re-tokenized), capped at [`MAX_ARGUMENT_LENGTH`] bytes.
pub fn parse_command_line(line: &str) -> Result<ClientCommand, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::EmptyLine);
    }

    let (token, rest) = match line.split_once(' ') {
        Some((token, rest)) => (token, rest.trim()),
        None => (line, ""),
    };

    let command = MftpCommand::from_str(token)
        .ok_or_else(|| ParseError::UnknownCommand(token.to_string()))?;

    if rest.len() > MAX_ARGUMENT_LENGTH {
        return Err(ParseError::ArgumentTooLong(rest.len()));
    }

    Ok(ClientCommand {
        command,
        argument: rest.to_string(),
    })
}
