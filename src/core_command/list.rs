use std::sync::Arc;

use log::warn;

use crate::core_auth::Permissions;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::core_sandbox;
use crate::core_transfer::{self, TransferResource};
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{CommandWriter, SharedSession, TransferKind};

/// Handles the LIST command.
///
/// Opens the current directory, announces a data channel and hands the
/// directory handle to the transfer engine. The listing itself streams on
/// the transfer worker, one `NAME\tTYPE` line per entry.
pub async fn handle_list_command(
    ctx: Arc<ServerContext>,
    session: SharedSession,
    writer: CommandWriter,
) -> Result<(), std::io::Error> {
    let (perms, busy, cwd) = {
        let session = session.lock().await;
        (
            session.credentials.perms,
            session.has_transfer(),
            session.cwd.clone(),
        )
    };

    if !perms.contains(Permissions::LIST) {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::Forbidden, "Permission denied"),
        )
        .await;
    }

    if busy {
        return send_reply(&writer, Reply::err(ReplyCode::Busy, "Transfer in progress")).await;
    }

    let real_path = core_sandbox::to_real(&ctx.root, &cwd);
    let dir = match tokio::fs::read_dir(&real_path).await {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Failed to open {:?} for listing: {}", real_path, e);
            return send_reply(
                &writer,
                Reply::err(ReplyCode::FsReadFailure, "Failed to open directory"),
            )
            .await;
        }
    };

    core_transfer::begin(
        session,
        writer,
        TransferKind::List,
        TransferResource::Listing(dir),
        ctx.config.server.timeout_ms,
    )
    .await
}
