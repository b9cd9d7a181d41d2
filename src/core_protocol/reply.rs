use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Ok,
    Error,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Ok => "OK",
            ReplyKind::Error => "ERROR",
        }
    }
}

/// Status codes on the command channel. Clients key behavior off the exact
/// numbers, so this table is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCode {
    OpeningDataChannel = 120,
    GeneralSuccess = 200,
    FsActionSuccess = 210,
    Ready = 220,
    ServiceClosing = 221,
    LoggedIn = 230,
    ClosingDataChannel = 320,
    GeneralFailure = 400,
    FsReadFailure = 410,
    FsWriteFailure = 411,
    FsActionFailure = 412,
    DataChannelError = 420,
    TransferAborted = 421,
    Busy = 422,
    Forbidden = 430,
    InvalidCommand = 500,
    ExpectedArgument = 501,
    InvalidArgument = 502,
    NotImplemented = 503,
    UnexpectedCommand = 504,
    NotLoggedIn = 530,
    ProvidePassword = 630,
}

impl ReplyCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn from_u16(code: u16) -> Option<ReplyCode> {
        match code {
            120 => Some(ReplyCode::OpeningDataChannel),
            200 => Some(ReplyCode::GeneralSuccess),
            210 => Some(ReplyCode::FsActionSuccess),
            220 => Some(ReplyCode::Ready),
            221 => Some(ReplyCode::ServiceClosing),
            230 => Some(ReplyCode::LoggedIn),
            320 => Some(ReplyCode::ClosingDataChannel),
            400 => Some(ReplyCode::GeneralFailure),
            410 => Some(ReplyCode::FsReadFailure),
            411 => Some(ReplyCode::FsWriteFailure),
            412 => Some(ReplyCode::FsActionFailure),
            420 => Some(ReplyCode::DataChannelError),
            421 => Some(ReplyCode::TransferAborted),
            422 => Some(ReplyCode::Busy),
            430 => Some(ReplyCode::Forbidden),
            500 => Some(ReplyCode::InvalidCommand),
            501 => Some(ReplyCode::ExpectedArgument),
            502 => Some(ReplyCode::InvalidArgument),
            503 => Some(ReplyCode::NotImplemented),
            504 => Some(ReplyCode::UnexpectedCommand),
            530 => Some(ReplyCode::NotLoggedIn),
            630 => Some(ReplyCode::ProvidePassword),
            _ => None,
        }
    }
}

/// One outbound status line: `KIND CODE MESSAGE\r\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub code: ReplyCode,
    pub message: String,
}

impl Reply {
    pub fn ok(code: ReplyCode, message: impl Into<String>) -> Self {
        Reply {
            kind: ReplyKind::Ok,
            code,
            message: message.into(),
        }
    }

    pub fn err(code: ReplyCode, message: impl Into<String>) -> Self {
        Reply {
            kind: ReplyKind::Error,
            code,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{} {} {}\r\n",
            self.kind.as_str(),
            self.code.as_u16(),
            self.message
        )
    }

    /// Decodes a single status line. Used by tests and client tooling; the
    /// server itself only encodes.
    pub fn parse(line: &str) -> Option<Reply> {
        let line = line.strip_suffix("\r\n").unwrap_or(line);
        let (kind, rest) = line.split_once(' ')?;
        let kind = match kind {
            "OK" => ReplyKind::Ok,
            "ERROR" => ReplyKind::Error,
            _ => return None,
        };
        let (code, message) = match rest.split_once(' ') {
            Some((code, message)) => (code, message),
            None => (rest, ""),
        };
        let code = ReplyCode::from_u16(code.parse().ok()?)?;
        Some(Reply {
            kind,
            code,
            message: message.to_string(),
        })
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.kind.as_str(),
            self.code.as_u16(),
            self.message
        )
    }
}
