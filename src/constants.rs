// src/constants.rs

/// Accepted username shape; 31 bytes is the hard cap on the wire.
pub const USERNAME_REGEX: &str = r"^[A-Za-z0-9._-]{1,31}$";

pub const MAX_PASSWORD_LENGTH: usize = 63;
pub const MAX_ARGUMENT_LENGTH: usize = 256;

/// Username that may log in without matching credentials when the server
/// allows anonymous access.
pub const ANONYMOUS_USERNAME: &str = "anon";

/// Chunk size for RETR/STOR streaming.
pub const TRANSFER_CHUNK_SIZE: usize = 4096;

/// Read size for the command channel; commands are tiny, transfers are not.
pub const COMMAND_READ_BUFFER_SIZE: usize = 512;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/mftpd.conf";
