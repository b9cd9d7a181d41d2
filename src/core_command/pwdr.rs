use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::{CommandWriter, SharedSession};

pub async fn handle_pwdr_command(
    session: SharedSession,
    writer: CommandWriter,
) -> Result<(), std::io::Error> {
    let cwd = session.lock().await.cwd.clone();
    send_reply(&writer, Reply::ok(ReplyCode::GeneralSuccess, cwd)).await
}
