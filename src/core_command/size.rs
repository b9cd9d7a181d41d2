use std::sync::Arc;

use crate::core_auth::Permissions;
use crate::core_command::utils::is_bare_filename;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::core_sandbox;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{CommandWriter, SharedSession};

/// SIZE reports the byte count of a file in the current directory.
pub async fn handle_size_command(
    ctx: Arc<ServerContext>,
    session: SharedSession,
    writer: CommandWriter,
    arg: String,
) -> Result<(), std::io::Error> {
    let name = arg.trim();

    let (perms, cwd) = {
        let session = session.lock().await;
        (session.credentials.perms, session.cwd.clone())
    };

    if !perms.contains(Permissions::READ) {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::Forbidden, "Permission denied"),
        )
        .await;
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
    match tokio::fs::metadata(&real_path).await {
        Ok(metadata) => {
            send_reply(
                &writer,
                Reply::ok(ReplyCode::GeneralSuccess, metadata.len().to_string()),
            )
            .await
        }
        Err(_) => {
            send_reply(
                &writer,
                Reply::err(ReplyCode::FsReadFailure, "Failed to stat file"),
            )
            .await
        }
    }
}
