use std::io::ErrorKind;
use std::sync::Arc;

use log::info;

use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::core_sandbox;
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{CommandWriter, SharedSession};

/// Handles the CHWD (change working directory) command.
///
/// The argument resolves through the sandbox against the current
/// directory; only a path that stays inside the served root and names a
/// readable directory replaces `cwd`.
pub async fn handle_chwd_command(
    ctx: Arc<ServerContext>,
    session: SharedSession,
    writer: CommandWriter,
    arg: String,
) -> Result<(), std::io::Error> {
    let path = arg.trim();

    if path.is_empty() {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::ExpectedArgument, "Path not provided"),
        )
        .await;
    }

    let cwd = session.lock().await.cwd.clone();

    let new_cwd = match core_sandbox::join(&cwd, path) {
        Ok(new_cwd) => new_cwd,
        Err(_) => {
            return send_reply(
                &writer,
                Reply::err(ReplyCode::GeneralFailure, "Cannot leave served directory"),
            )
            .await;
        }
    };

    // Opening the directory for reading doubles as the existence and
    // permission check.
    let real_path = core_sandbox::to_real(&ctx.root, &new_cwd);
    match tokio::fs::read_dir(&real_path).await {
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            send_reply(
                &writer,
                Reply::err(ReplyCode::Forbidden, "Permission denied"),
            )
            .await
        }
        Err(_) => {
            send_reply(
                &writer,
                Reply::err(
                    ReplyCode::FsReadFailure,
                    "Invalid path or non-existent directory",
                ),
            )
            .await
        }
        Ok(_) => {
            session.lock().await.cwd = new_cwd.clone();
            info!("Working directory changed to {}", new_cwd);
            send_reply(&writer, Reply::ok(ReplyCode::FsActionSuccess, new_cwd)).await
        }
    }
}
