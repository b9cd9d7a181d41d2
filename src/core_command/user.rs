use log::{info, warn};

use crate::core_command::utils::valid_username;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::{CommandWriter, Credentials, SharedSession};

/// Handles the USER command.
///
/// Starts (or restarts) the login handshake: any existing authentication
/// is dropped, the username is staged for the PASS that should follow.
pub async fn handle_user_command(
    session: SharedSession,
    writer: CommandWriter,
    arg: String,
) -> Result<(), std::io::Error> {
    let username = arg.trim();

    if username.is_empty() {
        warn!("USER command received with no argument");
        return send_reply(
            &writer,
            Reply::err(ReplyCode::ExpectedArgument, "Username not provided"),
        )
        .await;
    }

    if !valid_username(username) {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::InvalidArgument, "Invalid username"),
        )
        .await;
    }

    {
        let mut session = session.lock().await;
        session.authenticated = false;
        session.credentials = Credentials::unauthenticated();
        session.pending_user = Some(username.to_string());
    }

    info!("Login started for username: {}", username);
    send_reply(
        &writer,
        Reply::ok(ReplyCode::ProvidePassword, "Username OK, provide password"),
    )
    .await
}
