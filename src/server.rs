//! Server lifecycle: initialize, bind, serve, shutdown.
//!
//! The accept loop owns the session registry; sessions deregister
//! themselves when their connection task finishes, and shutdown tears down
//! whatever is still registered.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::core_auth::PasswdStore;
use crate::core_network::network;
use crate::core_protocol::reply::{Reply, ReplyCode};
use crate::helpers::send_reply;
use crate::session::{CommandWriter, Session, SharedSession};

/// Shared immutable server state handed to every handler.
pub struct ServerContext {
    pub config: Arc<Config>,
    pub passwd: Arc<PasswdStore>,
    /// Canonicalized served root; all sandboxed paths map under it.
    pub root: PathBuf,
}

struct SessionHandle {
    session: SharedSession,
    task: JoinHandle<()>,
}

pub struct Server {
    ctx: Arc<ServerContext>,
    sessions: Arc<Mutex<HashMap<SocketAddr, SessionHandle>>>,
}

impl Server {
    pub fn new(config: Config, passwd: PasswdStore) -> Result<Self> {
        let root = PathBuf::from(&config.server.root_dir)
            .canonicalize()
            .with_context(|| {
                format!(
                    "Served root directory is not accessible: {}",
                    config.server.root_dir
                )
            })?;

        Ok(Server {
            ctx: Arc::new(ServerContext {
                config: Arc::new(config),
                passwd: Arc::new(passwd),
                root,
            }),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Binds the command-channel listener. Split from `serve` so callers
    /// (and tests) can learn the actual address before accepting.
    pub async fn bind(self) -> Result<BoundServer> {
        let port = self.ctx.config.server.listen_port;
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("Failed to bind server socket on port {}", port))?;

        info!("Server listening on {}", listener.local_addr()?);
        Ok(BoundServer {
            server: self,
            listener,
        })
    }

    pub async fn run(self) -> Result<()> {
        self.bind().await?.serve().await
    }

    async fn accept_client(&self, socket: TcpStream, addr: SocketAddr) {
        let mut sessions = self.sessions.lock().await;

        // Silent rejection: the socket drops without a reply line.
        if sessions.len() >= self.ctx.config.server.max_clients {
            info!("Max clients reached - rejecting connection from {}", addr);
            return;
        }

        info!("New connection from {}", addr);

        let (read_half, write_half) = socket.into_split();
        let writer: CommandWriter = Arc::new(Mutex::new(write_half));
        let session: SharedSession = Arc::new(Mutex::new(Session::new(
            addr,
            Arc::clone(&writer),
            self.ctx.config.server.allow_anonymous,
        )));

        let greeting = if self.ctx.config.server.allow_anonymous {
            format!("Welcome to mftpd v{}", env!("CARGO_PKG_VERSION"))
        } else {
            format!(
                "Welcome to mftpd v{} - anonymous login disabled, log in to continue",
                env!("CARGO_PKG_VERSION")
            )
        };
        if let Err(e) = send_reply(&writer, Reply::ok(ReplyCode::Ready, greeting)).await {
            error!("Failed to greet client {}: {}", addr, e);
            return;
        }

        let ctx = Arc::clone(&self.ctx);
        let registry = Arc::clone(&self.sessions);
        let session_for_task = Arc::clone(&session);
        let task = tokio::spawn(async move {
            if let Err(e) =
                network::serve_connection(ctx, Arc::clone(&session_for_task), read_half, writer)
                    .await
            {
                info!("Connection error for {}: {}", addr, e);
            }
            session_for_task.lock().await.cleanup_full();
            registry.lock().await.remove(&addr);
            info!("Client {} disconnected", addr);
        });

        sessions.insert(addr, SessionHandle { session, task });
    }

    async fn shutdown(&self) {
        let mut sessions = self.sessions.lock().await;
        info!("Closing {} active session(s)", sessions.len());
        for (_, handle) in sessions.drain() {
            handle.task.abort();
            handle.session.lock().await.cleanup_full();
        }
    }
}

pub struct BoundServer {
    server: Server,
    listener: TcpListener,
}

impl BoundServer {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts command connections until a termination signal arrives,
    /// then runs the global shutdown routine.
    pub async fn serve(self) -> Result<()> {
        let BoundServer { server, listener } = self;

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((socket, addr)) => server.accept_client(socket, addr).await,
                        Err(e) => error!("Failed to accept client connection: {}", e),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Termination signal received. Shutting down...");
                    break;
                }
            }
        }

        server.shutdown().await;
        Ok(())
    }
}
