//! Flat-file credential store.
//!
//! One entry per line, `username:password:perms`, where `perms` is a string
//! over {r,w,l,d}. Lines starting with `#` or `;` are comments. The
//! password column may be empty (no password), plaintext, or a bcrypt hash.

use std::fmt;
use std::ops::BitOr;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

/// Per-credential permission bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(u8);

impl Permissions {
    pub const READ: Permissions = Permissions(1);
    pub const WRITE: Permissions = Permissions(1 << 1);
    pub const LIST: Permissions = Permissions(1 << 2);
    pub const DELETE: Permissions = Permissions(1 << 3);

    pub fn empty() -> Permissions {
        Permissions(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses a perms column. Any unknown character invalidates the whole
    /// entry to no permissions, which can never authenticate.
    pub fn parse(s: &str) -> Permissions {
        let mut perms = Permissions::empty();
        for c in s.chars() {
            match c {
                'r' => perms = perms | Permissions::READ,
                'w' => perms = perms | Permissions::WRITE,
                'l' => perms = perms | Permissions::LIST,
                'd' => perms = perms | Permissions::DELETE,
                _ => {
                    warn!("Invalid permission character: {:?}", c);
                    return Permissions::empty();
                }
            }
        }
        perms
    }
}

impl BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        Permissions(self.0 | rhs.0)
    }
}

/// Fixed four-column `rwld` form with `-` for absent bits, e.g. `r-l-`.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.contains(Permissions::READ) { 'r' } else { '-' },
            if self.contains(Permissions::WRITE) { 'w' } else { '-' },
            if self.contains(Permissions::LIST) { 'l' } else { '-' },
            if self.contains(Permissions::DELETE) { 'd' } else { '-' },
        )
    }
}

#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    password: String,
    perms: Permissions,
}

impl PasswdEntry {
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            return None;
        }

        let mut parts = line.splitn(3, ':');
        let username = parts.next()?.to_string();
        let password = parts.next().unwrap_or("").to_string();
        let perms = Permissions::parse(parts.next().unwrap_or(""));

        if username.is_empty() {
            return None;
        }

        Some(PasswdEntry {
            username,
            password,
            perms,
        })
    }

    fn password_matches(&self, given: &str) -> bool {
        if self.password.starts_with("$2") {
            bcrypt::verify(given, &self.password).unwrap_or(false)
        } else {
            self.password == given
        }
    }
}

/// In-memory credential store, loaded once at startup.
#[derive(Debug, Default)]
pub struct PasswdStore {
    entries: Vec<PasswdEntry>,
}

impl PasswdStore {
    /// Loads the passwd file. A missing file yields an empty store so an
    /// anonymous-only server can run without one; an unreadable file is a
    /// startup error.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            warn!("Passwd file {} not found - no user credentials loaded", path);
            return Ok(PasswdStore::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read passwd file: {}", path))?;

        let mut entries = Vec::new();
        for line in content.lines() {
            if let Some(entry) = PasswdEntry::from_line(line) {
                entries.push(entry);
            }
        }

        Ok(PasswdStore { entries })
    }

    /// Returns the permission bitmask for a matching username+password.
    /// An entry with no permissions can never authenticate.
    pub fn lookup(&self, username: &str, password: &str) -> Option<Permissions> {
        self.entries
            .iter()
            .find(|e| e.username == username && e.password_matches(password))
            .map(|e| e.perms)
            .filter(|perms| !perms.is_empty())
    }
}
