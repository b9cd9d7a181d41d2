use log::info;

use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::CommandWriter;

/// Handles the QUIT command.
///
/// Sends the closing notice; the connection loop tears the session down
/// right after, through the same cleanup path a disconnect takes.
pub async fn handle_quit_command(writer: CommandWriter) -> Result<(), std::io::Error> {
    info!("Received QUIT command. Closing connection.");
    send_reply(&writer, Reply::ok(ReplyCode::ServiceClosing, "Goodbye")).await
}
