//! Data-channel transfer engine.
//!
//! A transfer announces an ephemeral listening socket on the command
//! channel, accepts exactly one peer connection within the configured
//! window, streams the listing or file bytes on its own worker task, and
//! tears everything down through the session's idempotent cleanup routine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info};
use tokio::fs::{File, ReadDir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

use crate::constants::TRANSFER_CHUNK_SIZE;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::{CommandWriter, SharedSession, TransferKind};

/// The filesystem side of a transfer, resolved before the data channel is
/// announced so resolution failures never create transfer state.
pub enum TransferResource {
    Listing(ReadDir),
    Download(File),
    Upload(File),
}

/// Binds the ephemeral data listener, announces it, registers the
/// `TransferState` on the session and spawns the worker.
///
/// Precondition checks (permissions, busy, argument shape) and resource
/// resolution are the calling handler's job. Errors returned here are
/// command-channel write failures; everything else is reported to the
/// client and swallowed.
pub async fn begin(
    session: SharedSession,
    writer: CommandWriter,
    kind: TransferKind,
    resource: TransferResource,
    timeout_ms: u64,
) -> Result<(), std::io::Error> {
    let listener = match TcpListener::bind(("0.0.0.0", 0)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind data channel listener: {}", e);
            send_reply(
                &writer,
                Reply::err(ReplyCode::DataChannelError, "Couldn't open data channel"),
            )
            .await?;
            return Ok(());
        }
    };

    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to read data channel address: {}", e);
            send_reply(
                &writer,
                Reply::err(ReplyCode::DataChannelError, "Couldn't open data channel"),
            )
            .await?;
            return Ok(());
        }
    };

    send_reply(
        &writer,
        Reply::ok(
            ReplyCode::OpeningDataChannel,
            format!("[{}:{}] Opening data channel", addr.ip(), addr.port()),
        ),
    )
    .await?;

    let active = Arc::new(AtomicBool::new(true));

    // Holding the session lock across the spawn guarantees the state is
    // registered before the worker's own cleanup can possibly run.
    let mut locked = session.lock().await;
    let worker = tokio::spawn(run_transfer(
        Arc::clone(&session),
        writer,
        kind,
        resource,
        listener,
        Arc::clone(&active),
        timeout_ms,
    ));
    locked.begin_transfer(kind, active, worker);

    Ok(())
}

/// Worker body: single accept with a fixed window, then streaming.
///
/// Every exit path locks the session and holds it across its closing
/// notice and cleanup. An external abort (ABOR, disconnect, shutdown) also
/// runs under that lock and cancels this task before releasing it, so a
/// worker that acquires the lock knows the transfer is still its own: at
/// most one closing notice ever goes out per transfer.
async fn run_transfer(
    session: SharedSession,
    writer: CommandWriter,
    kind: TransferKind,
    resource: TransferResource,
    listener: TcpListener,
    active: Arc<AtomicBool>,
    timeout_ms: u64,
) {
    let data_stream = match timeout(Duration::from_millis(timeout_ms), listener.accept()).await {
        Err(_) => {
            debug!(
                "{} transfer timed out awaiting data connection",
                kind.as_str()
            );
            let mut locked = session.lock().await;
            locked.cleanup_transfer(false);
            send_reply(&writer, Reply::err(ReplyCode::ClosingDataChannel, "Timeout"))
                .await
                .ok();
            return;
        }
        Ok(Err(e)) => {
            // Readiness fired but the accept failed; the client is left to
            // its own timeout. No reply goes out on this path.
            error!("Failed to accept data connection: {}", e);
            session.lock().await.cleanup_transfer(false);
            return;
        }
        Ok(Ok((stream, peer))) => {
            debug!("Accepted data connection from {}", peer);
            stream
        }
    };
    drop(listener);

    let result = match resource {
        TransferResource::Listing(dir) => stream_listing(dir, data_stream, &active).await,
        TransferResource::Download(file) => stream_download(file, data_stream, &active).await,
        TransferResource::Upload(file) => stream_upload(file, data_stream, &active).await,
    };

    // Acquiring the lock proves no external abort ran: ABOR, disconnect
    // and shutdown all cancel this task under the lock before releasing
    // it, and a cancelled task never resumes. The abort path sends its own
    // reply; this one is only reached for a transfer that is still ours.
    let mut locked = session.lock().await;
    locked.cleanup_transfer(false);

    let reply = match result {
        Ok(()) => {
            info!("{} transfer complete", kind.as_str());
            Reply::ok(ReplyCode::ClosingDataChannel, "Transfer complete")
        }
        Err(e) => {
            error!("{} transfer failed: {}", kind.as_str(), e);
            Reply::err(ReplyCode::ClosingDataChannel, "Data channel error")
        }
    };
    send_reply(&writer, reply).await.ok();
}

/// Writes one `NAME\tTYPE\r\n` line per entry. `.` and `..` never appear;
/// read_dir does not yield them.
async fn stream_listing(
    mut dir: ReadDir,
    mut data_stream: TcpStream,
    active: &AtomicBool,
) -> Result<(), std::io::Error> {
    while let Some(entry) = dir.next_entry().await? {
        if !active.load(Ordering::SeqCst) {
            return Ok(());
        }

        let file_type = entry.file_type().await?;
        let type_name = if file_type.is_dir() {
            "DIRECTORY"
        } else if file_type.is_file() {
            "FILE"
        } else {
            "OTHER"
        };

        let line = format!("{}\t{}\r\n", entry.file_name().to_string_lossy(), type_name);
        data_stream.write_all(line.as_bytes()).await?;
    }

    data_stream.shutdown().await?;
    Ok(())
}

async fn stream_download(
    mut file: File,
    mut data_stream: TcpStream,
    active: &AtomicBool,
) -> Result<(), std::io::Error> {
    let mut buffer = vec![0u8; TRANSFER_CHUNK_SIZE];
    loop {
        if !active.load(Ordering::SeqCst) {
            return Ok(());
        }
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        data_stream.write_all(&buffer[..bytes_read]).await?;
    }

    data_stream.shutdown().await?;
    Ok(())
}

async fn stream_upload(
    mut file: File,
    mut data_stream: TcpStream,
    active: &AtomicBool,
) -> Result<(), std::io::Error> {
    let mut buffer = vec![0u8; TRANSFER_CHUNK_SIZE];
    loop {
        if !active.load(Ordering::SeqCst) {
            return Ok(());
        }
        let bytes_read = data_stream.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read]).await?;
    }

    file.flush().await?;
    Ok(())
}
