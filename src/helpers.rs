use tokio::io::AsyncWriteExt;

use crate::core_protocol::reply::Reply;
use crate::session::CommandWriter;

/// Sends one status line to the client.
pub async fn send_reply(writer: &CommandWriter, reply: Reply) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(reply.encode().as_bytes()).await?;
    Ok(())
}
