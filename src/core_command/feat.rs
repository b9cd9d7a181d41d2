use crate::core_protocol::command::ALL_COMMANDS;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::CommandWriter;

/// FEAT lists every token the server recognizes, implemented or reserved.
pub async fn handle_feat_command(writer: CommandWriter) -> Result<(), std::io::Error> {
    let features = ALL_COMMANDS
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(",");

    send_reply(&writer, Reply::ok(ReplyCode::GeneralSuccess, features)).await
}
