//! Per-connection command loop.
//!
//! One task per command connection. Bytes accumulate in a bounded inbound
//! buffer until a CRLF boundary; each complete line is parsed, gated and
//! dispatched. Handlers for one session run serialized, in arrival order;
//! pipelined input simply queues in the buffer.

use std::sync::Arc;

use log::info;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;

use crate::core_command::handlers::{initialize_command_handlers, CommandHandlerMap};
use crate::core_protocol::command::MftpCommand;
use crate::core_protocol;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{CommandWriter, SharedSession};

use crate::constants::COMMAND_READ_BUFFER_SIZE;

pub async fn serve_connection(
    ctx: Arc<ServerContext>,
    session: SharedSession,
    mut reader: OwnedReadHalf,
    writer: CommandWriter,
) -> Result<(), std::io::Error> {
    let handlers = initialize_command_handlers();
    let max_cmd_size = ctx.config.server.max_cmd_size;
    let peer = session.lock().await.peer;

    let mut inbound: Vec<u8> = Vec::new();
    let mut chunk = [0u8; COMMAND_READ_BUFFER_SIZE];

    'connection: loop {
        let bytes_read = reader.read(&mut chunk).await?;
        if bytes_read == 0 {
            // EOF; the caller runs full session cleanup.
            break;
        }
        inbound.extend_from_slice(&chunk[..bytes_read]);

        // A single read may carry several lines, or a fraction of one.
        // Consume every complete line and keep the partial tail buffered.
        while let Some(pos) = find_crlf(&inbound) {
            let line_bytes = inbound[..pos].to_vec();
            inbound.drain(..pos + 2);

            let line = String::from_utf8_lossy(&line_bytes).into_owned();
            if line.trim().is_empty() {
                continue;
            }

            let quit = dispatch_line(&ctx, &session, &writer, &handlers, &line).await?;
            if quit {
                break 'connection;
            }
        }

        if inbound.len() > max_cmd_size {
            send_reply(
                &writer,
                Reply::err(ReplyCode::GeneralFailure, "Command too long - try again"),
            )
            .await?;
            inbound.clear();
        }
    }

    info!("Command loop ended for client {}", peer);
    Ok(())
}

fn find_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\r\n")
}

/// Parses and dispatches one line. Returns true when the session asked to
/// quit.
async fn dispatch_line(
    ctx: &Arc<ServerContext>,
    session: &SharedSession,
    writer: &CommandWriter,
    handlers: &CommandHandlerMap,
    line: &str,
) -> Result<bool, std::io::Error> {
    let peer = session.lock().await.peer;

    let parsed = match core_protocol::parse_command_line(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            info!("Invalid command from client {}: {}", peer, e);
            send_reply(
                writer,
                Reply::err(ReplyCode::InvalidCommand, "Invalid command"),
            )
            .await?;
            return Ok(false);
        }
    };

    // Filter out unauthenticated clients.
    let authenticated = session.lock().await.authenticated;
    if !authenticated
        && !matches!(
            parsed.command,
            MftpCommand::USER | MftpCommand::PASS | MftpCommand::QUIT
        )
    {
        send_reply(writer, Reply::err(ReplyCode::NotLoggedIn, "Not logged in")).await?;
        return Ok(false);
    }

    info!(
        "[CLIENT {}] {} {}",
        peer,
        parsed.command.as_str(),
        if parsed.command == MftpCommand::PASS {
            "********"
        } else {
            parsed.argument.as_str()
        }
    );

    match handlers.get(&parsed.command) {
        Some(handler) => {
            (handler.as_ref())(
                Arc::clone(ctx),
                Arc::clone(session),
                Arc::clone(writer),
                parsed.argument,
            )
            .await?;
        }
        None => {
            send_reply(
                writer,
                Reply::err(ReplyCode::NotImplemented, "Command not implemented"),
            )
            .await?;
        }
    }

    Ok(parsed.command == MftpCommand::QUIT)
}

#[cfg(test)]
mod tests {
    use super::find_crlf;

    #[test]
    fn finds_the_first_boundary() {
        assert_eq!(find_crlf(b"NOOP\r\n"), Some(4));
        assert_eq!(find_crlf(b"NOOP\r\nQUIT\r\n"), Some(4));
        assert_eq!(find_crlf(b"partial lin"), None);
        assert_eq!(find_crlf(b"split\r"), None);
    }
}
