//! Shared harness for the integration tests: a server on an ephemeral port
//! over a scratch root, and a minimal line-oriented client.

use std::net::SocketAddr;
use std::path::PathBuf;

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use mftpd::config::Config;
use mftpd::core_auth::PasswdStore;
use mftpd::core_protocol::reply::Reply;
use mftpd::server::Server;

pub const PASSWD_ADMIN: &str = "admin:admin123:rwld\n";

pub struct TestServer {
    pub addr: SocketAddr,
    dir: TempDir,
    _task: JoinHandle<()>,
}

impl TestServer {
    /// Served root directory on disk.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("root")
    }
}

pub async fn start_server(passwd: &str, configure: impl FnOnce(&mut Config)) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    std::fs::create_dir(&root).unwrap();
    let passwd_path = dir.path().join("mftp.passwd");
    std::fs::write(&passwd_path, passwd).unwrap();

    let mut config = Config::default();
    config.server.listen_port = 0;
    config.server.root_dir = root.to_str().unwrap().to_string();
    config.server.passwd_file = passwd_path.to_str().unwrap().to_string();
    config.server.timeout_ms = 1000;
    configure(&mut config);

    let store = PasswdStore::load(&config.server.passwd_file).unwrap();
    let bound = Server::new(config, store).unwrap().bind().await.unwrap();
    let mut addr = bound.local_addr().unwrap();
    addr.set_ip("127.0.0.1".parse().unwrap());

    let task = tokio::spawn(async move {
        bound.serve().await.ok();
    });

    TestServer {
        addr,
        dir,
        _task: task,
    }
}

pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    /// Connects and consumes the greeting, which is returned for callers
    /// that care about it.
    pub async fn connect(addr: SocketAddr) -> (Client, Reply) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let mut client = Client {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        let greeting = client.read_reply().await;
        (client, greeting)
    }

    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    pub async fn read_reply(&mut self) -> Reply {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "command channel closed while awaiting a reply");
        Reply::parse(&line).unwrap_or_else(|| panic!("unparseable reply: {:?}", line))
    }

    pub async fn cmd(&mut self, line: &str) -> Reply {
        self.send(line).await;
        self.read_reply().await
    }

    /// USER anon + empty PASS; requires a server with anonymous logins.
    pub async fn login_anon(&mut self) {
        let reply = self.cmd("USER anon").await;
        assert_eq!(reply.code.as_u16(), 630);
        let reply = self.cmd("PASS").await;
        assert_eq!(reply.code.as_u16(), 230);
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        let reply = self.cmd(&format!("USER {}", username)).await;
        assert_eq!(reply.code.as_u16(), 630);
        let reply = self.cmd(&format!("PASS {}", password)).await;
        assert_eq!(reply.code.as_u16(), 230, "login failed: {}", reply);
    }
}

/// Extracts the data-channel port from an OPENING_DATA_CHANNEL message of
/// the form `[host:port] Opening data channel`.
pub fn data_port(reply: &Reply) -> u16 {
    let start = reply.message.rfind(':').unwrap() + 1;
    let end = reply.message.find(']').unwrap();
    reply.message[start..end].parse().unwrap()
}

/// Connects the data channel announced by `reply` and drains it to EOF.
pub async fn drain_data_channel(server_addr: SocketAddr, reply: &Reply) -> Vec<u8> {
    let mut stream = TcpStream::connect((server_addr.ip(), data_port(reply)))
        .await
        .unwrap();
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).await.unwrap();
    bytes
}
