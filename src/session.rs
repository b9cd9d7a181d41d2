use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::core_auth::Permissions;

/// Write half of the command channel, shared between the connection task
/// and transfer workers so replies interleave without tearing.
pub type CommandWriter = Arc<Mutex<OwnedWriteHalf>>;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub perms: Permissions,
}

impl Credentials {
    pub fn unauthenticated() -> Self {
        Credentials {
            username: String::new(),
            perms: Permissions::empty(),
        }
    }

    pub fn anonymous() -> Self {
        Credentials {
            username: crate::constants::ANONYMOUS_USERNAME.to_string(),
            perms: Permissions::READ | Permissions::LIST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    List,
    Retr,
    Stor,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::List => "LIST",
            TransferKind::Retr => "RETR",
            TransferKind::Stor => "STOR",
        }
    }
}

/// State of the one in-flight transfer a session may own.
///
/// The worker task owns the listener, the resolved filesystem resource and
/// (after accept) the data socket; dropping or aborting it releases them.
/// `active` is shared with the worker, which checks it between chunks.
pub struct TransferState {
    pub kind: TransferKind,
    pub active: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

/// Per-connection state. Owned behind `Arc<Mutex<_>>`; the connection task
/// and the transfer worker are the only parties that lock it.
pub struct Session {
    pub peer: SocketAddr,
    pub writer: CommandWriter,
    pub authenticated: bool,
    pub credentials: Credentials,
    pub pending_user: Option<String>,
    /// Virtual absolute path, always inside the served root.
    pub cwd: String,
    transfer: Option<TransferState>,
    /// Re-entrancy guard for transfer teardown. Checked-and-set under the
    /// session mutex by every cleanup-capable path; a holder in progress
    /// means the caller backs off.
    transfer_lock: bool,
}

impl Session {
    pub fn new(peer: SocketAddr, writer: CommandWriter, allow_anonymous: bool) -> Self {
        let (authenticated, credentials) = if allow_anonymous {
            (true, Credentials::anonymous())
        } else {
            (false, Credentials::unauthenticated())
        };

        Session {
            peer,
            writer,
            authenticated,
            credentials,
            pending_user: None,
            cwd: String::from("/"),
            transfer: None,
            transfer_lock: false,
        }
    }

    /// A transfer in any live state (awaiting its data connection or
    /// streaming) makes the session busy.
    pub fn has_transfer(&self) -> bool {
        self.transfer.is_some()
    }

    pub fn transfer_kind(&self) -> Option<TransferKind> {
        self.transfer.as_ref().map(|t| t.kind)
    }

    /// Registers the in-flight transfer. Caller must hold the session lock
    /// from before the worker is spawned until after this returns, so the
    /// worker's own cleanup cannot run first.
    pub fn begin_transfer(&mut self, kind: TransferKind, active: Arc<AtomicBool>, worker: JoinHandle<()>) {
        debug_assert!(self.transfer.is_none());
        self.transfer = Some(TransferState {
            kind,
            active,
            worker,
        });
    }

    /// Idempotent transfer teardown, shared by ABOR, timeout, disconnect
    /// and natural completion. Returns false when another path already
    /// holds the guard. `abort_worker` is false when the worker itself is
    /// the caller.
    pub fn cleanup_transfer(&mut self, abort_worker: bool) -> bool {
        if self.transfer_lock {
            return false;
        }
        self.transfer_lock = true;

        if let Some(transfer) = self.transfer.take() {
            transfer.active.store(false, Ordering::SeqCst);
            if abort_worker {
                transfer.worker.abort();
            }
            debug!(
                "Cleaned up {} transfer for client {}",
                transfer.kind.as_str(),
                self.peer
            );
        }

        self.transfer_lock = false;
        true
    }

    /// Full teardown on disconnect or server shutdown. The command socket
    /// closes when the last reference to its halves drops.
    pub fn cleanup_full(&mut self) {
        self.cleanup_transfer(true);
        self.authenticated = false;
    }
}
