use std::sync::Arc;

use log::warn;
use tokio::fs::File;

use crate::core_auth::Permissions;
use crate::core_command::utils::is_bare_filename;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::core_sandbox;
use crate::core_transfer::{self, TransferResource};
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{CommandWriter, SharedSession, TransferKind};

/// Handles the RETR (retrieve) command.
///
/// Validates the argument before any filesystem touch, opens the file
/// under the sandboxed working directory and hands it to the transfer
/// engine; the bytes stream over the announced data channel.
pub async fn handle_retr_command(
    ctx: Arc<ServerContext>,
    session: SharedSession,
    writer: CommandWriter,
    arg: String,
) -> Result<(), std::io::Error> {
    let name = arg.trim();

    let (perms, busy, cwd) = {
        let session = session.lock().await;
        (
            session.credentials.perms,
            session.has_transfer(),
            session.cwd.clone(),
        )
    };

    if !perms.contains(Permissions::READ) {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::Forbidden, "Permission denied"),
        )
        .await;
    }

    if busy {
        return send_reply(&writer, Reply::err(ReplyCode::Busy, "Transfer in progress")).await;
    }

    if name.is_empty() {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::ExpectedArgument, "Filename not provided"),
        )
        .await;
    }

    if !is_bare_filename(name) {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::InvalidArgument, "Expected filename, got path"),
        )
        .await;
    }

    let virtual_path = match core_sandbox::join(&cwd, name) {
        Ok(path) => path,
        Err(_) => {
            return send_reply(
                &writer,
                Reply::err(ReplyCode::InvalidArgument, "Expected filename, got path"),
            )
            .await;
        }
    };

    let real_path = core_sandbox::to_real(&ctx.root, &virtual_path);
    let file = match File::open(&real_path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open {:?} for reading: {}", real_path, e);
            return send_reply(
                &writer,
                Reply::err(ReplyCode::FsReadFailure, "Failed to open file"),
            )
            .await;
        }
    };

    core_transfer::begin(
        session,
        writer,
        TransferKind::Retr,
        TransferResource::Download(file),
        ctx.config.server.timeout_ms,
    )
    .await
}
