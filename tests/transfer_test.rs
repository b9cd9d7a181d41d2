//! Data-channel behavior: LIST/RETR/STOR streaming, the single-transfer
//! rule, accept timeout and abort cleanup.

mod common;

use std::time::Duration;

use common::{data_port, drain_data_channel, start_server, Client, PASSWD_ADMIN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[tokio::test]
async fn list_streams_names_and_types() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    std::fs::write(server.root().join("a.txt"), b"aaa").unwrap();
    std::fs::create_dir(server.root().join("sub")).unwrap();

    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);
    assert!(opening.message.contains("Opening data channel"));

    let listing = String::from_utf8(drain_data_channel(server.addr, &opening).await).unwrap();
    let mut lines: Vec<&str> = listing.split("\r\n").filter(|l| !l.is_empty()).collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["a.txt\tFILE", "sub\tDIRECTORY"]);

    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
    assert_eq!(closing.message, "Transfer complete");
}

#[tokio::test]
async fn list_of_empty_directory_closes_cleanly() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);
    let listing = drain_data_channel(server.addr, &opening).await;
    assert!(listing.is_empty());

    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
}

#[tokio::test]
async fn retr_streams_file_contents() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    let payload: Vec<u8> = (0..100_000u32).flat_map(|i| i.to_le_bytes()).collect();
    std::fs::write(server.root().join("blob.bin"), &payload).unwrap();

    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let opening = client.cmd("RETR blob.bin").await;
    assert_eq!(opening.code.as_u16(), 120);

    let received = drain_data_channel(server.addr, &opening).await;
    assert_eq!(received, payload);

    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
    assert_eq!(closing.message, "Transfer complete");
}

#[tokio::test]
async fn retr_missing_file_creates_no_transfer_state() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let reply = client.cmd("RETR missing.bin").await;
    assert_eq!(reply.code.as_u16(), 410);

    // No transfer was registered, so ABOR has nothing to do.
    let reply = client.cmd("ABOR").await;
    assert_eq!(reply.code.as_u16(), 400);
}

#[tokio::test]
async fn stor_receives_file_contents() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    let (mut client, _) = Client::connect(server.addr).await;
    client.login("admin", "admin123").await;

    let opening = client.cmd("STOR upload.bin").await;
    assert_eq!(opening.code.as_u16(), 120);

    let payload = vec![0x5au8; 300_000];
    let mut data = TcpStream::connect((server.addr.ip(), data_port(&opening)))
        .await
        .unwrap();
    data.write_all(&payload).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);

    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
    assert_eq!(closing.message, "Transfer complete");

    let stored = std::fs::read(server.root().join("upload.bin")).unwrap();
    assert_eq!(stored, payload);
}

#[tokio::test]
async fn stor_requires_write_permission() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let reply = client.cmd("STOR upload.bin").await;
    assert_eq!(reply.code.as_u16(), 430);
    assert!(!server.root().join("upload.bin").exists());
}

#[tokio::test]
async fn transfer_filenames_must_be_bare() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    let (mut client, _) = Client::connect(server.addr).await;
    client.login("admin", "admin123").await;

    let reply = client.cmd("RETR ../escape.bin").await;
    assert_eq!(reply.code.as_u16(), 502);

    let reply = client.cmd("STOR sub/file.bin").await;
    assert_eq!(reply.code.as_u16(), 502);

    let reply = client.cmd("RETR").await;
    assert_eq!(reply.code.as_u16(), 501);
}

#[tokio::test]
async fn second_transfer_while_busy_is_rejected() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    std::fs::write(server.root().join("a.txt"), b"aaa").unwrap();

    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    // First transfer parks in AwaitingDataConnection.
    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);

    let reply = client.cmd("RETR a.txt").await;
    assert_eq!(reply.code.as_u16(), 422);

    // The first transfer is still live and can be aborted.
    let reply = client.cmd("ABOR").await;
    assert_eq!(reply.code.as_u16(), 421);
}

#[tokio::test]
async fn transfer_times_out_without_data_connection() {
    let server = start_server(PASSWD_ADMIN, |config| {
        config.server.timeout_ms = 200;
    })
    .await;

    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);

    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
    assert_eq!(closing.message, "Timeout");

    // The session is idle again: a new transfer starts and completes.
    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);
    drain_data_channel(server.addr, &opening).await;
    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
    assert_eq!(closing.message, "Transfer complete");
}

#[tokio::test]
async fn abor_while_awaiting_data_connection() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);

    let reply = client.cmd("ABOR").await;
    assert_eq!(reply.code.as_u16(), 421);

    // No stray Timeout reply follows; the next command answers directly.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let reply = client.cmd("NOOP").await;
    assert_eq!(reply.code.as_u16(), 220);
}

#[tokio::test]
async fn abor_mid_stream_releases_the_session() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    // Large enough that the worker is still writing when ABOR lands.
    std::fs::write(server.root().join("big.bin"), vec![0u8; 8 * 1024 * 1024]).unwrap();

    let (mut client, _) = Client::connect(server.addr).await;
    client.login_anon().await;

    let opening = client.cmd("RETR big.bin").await;
    assert_eq!(opening.code.as_u16(), 120);

    // Connect the data channel but read only a little, so socket buffers
    // fill and the worker blocks mid-stream.
    let mut data = TcpStream::connect((server.addr.ip(), data_port(&opening)))
        .await
        .unwrap();
    let mut first = [0u8; 4096];
    data.read_exact(&mut first).await.unwrap();

    let reply = client.cmd("ABOR").await;
    assert_eq!(reply.code.as_u16(), 421);
    drop(data);

    // Cleanup fully released the transfer slot: a fresh transfer works.
    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);
    let listing = String::from_utf8(drain_data_channel(server.addr, &opening).await).unwrap();
    assert!(listing.contains("big.bin\tFILE"));
    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
    assert_eq!(closing.message, "Transfer complete");
}

#[tokio::test]
async fn end_to_end_anonymous_scenario() {
    let server = start_server(PASSWD_ADMIN, |_| {}).await;
    std::fs::write(server.root().join("readme.txt"), b"hello").unwrap();

    let (mut client, greeting) = Client::connect(server.addr).await;
    assert_eq!(greeting.code.as_u16(), 220);

    assert_eq!(client.cmd("USER anon").await.code.as_u16(), 630);
    assert_eq!(client.cmd("PASS").await.code.as_u16(), 230);

    let reply = client.cmd("PWDR").await;
    assert_eq!(reply.code.as_u16(), 200);
    assert_eq!(reply.message, "/");

    let opening = client.cmd("LIST").await;
    assert_eq!(opening.code.as_u16(), 120);

    let listing = String::from_utf8(drain_data_channel(server.addr, &opening).await).unwrap();
    assert!(listing.contains("readme.txt\tFILE"));

    let closing = client.read_reply().await;
    assert_eq!(closing.code.as_u16(), 320);
    assert_eq!(closing.message, "Transfer complete");
}
