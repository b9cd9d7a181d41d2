use std::sync::Arc;

use log::{info, warn};
use tokio::time::{sleep, Duration, Instant};

use crate::constants::{ANONYMOUS_USERNAME, MAX_PASSWORD_LENGTH};
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::server::ServerContext;
use crate::session::{CommandWriter, Credentials, SharedSession};

/// Handles the PASS command, completing the USER/PASS handshake.
///
/// A failed attempt is padded to at least one second of wall clock before
/// the reply goes out, to blunt timing probes against the credential store.
pub async fn handle_pass_command(
    ctx: Arc<ServerContext>,
    session: SharedSession,
    writer: CommandWriter,
    arg: String,
) -> Result<(), std::io::Error> {
    // An empty password is legal (anonymous logins send none).
    let password = arg;

    if password.len() > MAX_PASSWORD_LENGTH {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::InvalidArgument, "Password too long"),
        )
        .await;
    }

    let (authenticated, pending_user) = {
        let session = session.lock().await;
        (session.authenticated, session.pending_user.clone())
    };

    if authenticated {
        return send_reply(
            &writer,
            Reply::err(ReplyCode::UnexpectedCommand, "Already logged in"),
        )
        .await;
    }

    let username = match pending_user {
        Some(username) => username,
        None => {
            return send_reply(
                &writer,
                Reply::err(ReplyCode::UnexpectedCommand, "Provide username first"),
            )
            .await;
        }
    };

    let started = Instant::now();

    if let Some(perms) = ctx.passwd.lookup(&username, &password) {
        {
            let mut session = session.lock().await;
            session.authenticated = true;
            session.credentials = Credentials {
                username: username.clone(),
                perms,
            };
            session.pending_user = None;
        }
        info!("User {} logged in", username);
        send_reply(
            &writer,
            Reply::ok(ReplyCode::LoggedIn, format!("Logged in as {}", username)),
        )
        .await
    } else if ctx.config.server.allow_anonymous && username == ANONYMOUS_USERNAME {
        {
            let mut session = session.lock().await;
            session.authenticated = true;
            session.credentials = Credentials::anonymous();
            session.pending_user = None;
        }
        info!("Anonymous login");
        send_reply(
            &writer,
            Reply::ok(ReplyCode::LoggedIn, "Logged in anonymously"),
        )
        .await
    } else {
        warn!("Failed login attempt for username: {}", username);

        let elapsed = started.elapsed();
        if elapsed < Duration::from_secs(1) {
            sleep(Duration::from_secs(1) - elapsed).await;
        }

        send_reply(
            &writer,
            Reply::err(ReplyCode::Forbidden, "Invalid credentials"),
        )
        .await
    }
}
