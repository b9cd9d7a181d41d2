use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::{CommandWriter, SharedSession};

/// WAMI reports the logged-in username and its permission string.
/// The dispatcher already filters unauthenticated sessions; the check here
/// is defensive.
pub async fn handle_wami_command(
    session: SharedSession,
    writer: CommandWriter,
) -> Result<(), std::io::Error> {
    let reply = {
        let session = session.lock().await;
        if !session.authenticated {
            Reply::err(ReplyCode::NotLoggedIn, "Not logged in")
        } else {
            Reply::ok(
                ReplyCode::GeneralSuccess,
                format!(
                    "{} {}",
                    session.credentials.username, session.credentials.perms
                ),
            )
        }
    };

    send_reply(&writer, reply).await
}
