use log::info;

use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::{CommandWriter, SharedSession};

/// Handles the ABOR command.
///
/// Routes through the same idempotent cleanup as timeout and disconnect; a
/// transfer has no finer-grained cancellation than "stop and close
/// everything".
pub async fn handle_abor_command(
    session: SharedSession,
    writer: CommandWriter,
) -> Result<(), std::io::Error> {
    let aborted = {
        let mut session = session.lock().await;
        if session.has_transfer() {
            let kind = session.transfer_kind();
            session.cleanup_transfer(true);
            info!(
                "Aborted {} transfer for client {}",
                kind.map(|k| k.as_str()).unwrap_or("?"),
                session.peer
            );
            true
        } else {
            false
        }
    };

    let reply = if aborted {
        Reply::ok(ReplyCode::TransferAborted, "Transfer aborted")
    } else {
        Reply::err(ReplyCode::GeneralFailure, "No transfer in progress")
    };

    send_reply(&writer, reply).await
}
