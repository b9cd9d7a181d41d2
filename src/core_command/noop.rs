use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::CommandWriter;

pub async fn handle_noop_command(writer: CommandWriter) -> Result<(), std::io::Error> {
    send_reply(&writer, Reply::ok(ReplyCode::Ready, "Ready")).await
}
