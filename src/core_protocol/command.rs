/// The closed MFTP command set. Tokens without a registered handler (RMDR,
/// MKDR, RNME, MDTM) still parse; the dispatcher answers NOT_IMPLEMENTED
/// for them.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum MftpCommand {
    LIST,
    RETR,
    STOR,
    DELE,
    RMDR,
    MKDR,
    CHWD,
    SIZE,
    USER,
    PASS,
    WAMI,
    QUIT,
    RNME,
    NOOP,
    ABOR,
    MDTM,
    FEAT,
    PWDR,
}

pub const ALL_COMMANDS: [MftpCommand; 18] = [
    MftpCommand::LIST,
    MftpCommand::RETR,
    MftpCommand::STOR,
    MftpCommand::DELE,
    MftpCommand::RMDR,
    MftpCommand::MKDR,
    MftpCommand::CHWD,
    MftpCommand::SIZE,
    MftpCommand::USER,
    MftpCommand::PASS,
    MftpCommand::WAMI,
    MftpCommand::QUIT,
    MftpCommand::RNME,
    MftpCommand::NOOP,
    MftpCommand::ABOR,
    MftpCommand::MDTM,
    MftpCommand::FEAT,
    MftpCommand::PWDR,
];

impl MftpCommand {
    pub fn from_str(cmd: &str) -> Option<MftpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "LIST" => Some(MftpCommand::LIST),
            "RETR" => Some(MftpCommand::RETR),
            "STOR" => Some(MftpCommand::STOR),
            "DELE" => Some(MftpCommand::DELE),
            "RMDR" => Some(MftpCommand::RMDR),
            "MKDR" => Some(MftpCommand::MKDR),
            "CHWD" => Some(MftpCommand::CHWD),
            "SIZE" => Some(MftpCommand::SIZE),
            "USER" => Some(MftpCommand::USER),
            "PASS" => Some(MftpCommand::PASS),
            "WAMI" => Some(MftpCommand::WAMI),
            "QUIT" => Some(MftpCommand::QUIT),
            "RNME" => Some(MftpCommand::RNME),
            "NOOP" => Some(MftpCommand::NOOP),
            "ABOR" => Some(MftpCommand::ABOR),
            "MDTM" => Some(MftpCommand::MDTM),
            "FEAT" => Some(MftpCommand::FEAT),
            "PWDR" => Some(MftpCommand::PWDR),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MftpCommand::LIST => "LIST",
            MftpCommand::RETR => "RETR",
            MftpCommand::STOR => "STOR",
            MftpCommand::DELE => "DELE",
            MftpCommand::RMDR => "RMDR",
            MftpCommand::MKDR => "MKDR",
            MftpCommand::CHWD => "CHWD",
            MftpCommand::SIZE => "SIZE",
            MftpCommand::USER => "USER",
            MftpCommand::PASS => "PASS",
            MftpCommand::WAMI => "WAMI",
            MftpCommand::QUIT => "QUIT",
            MftpCommand::RNME => "RNME",
            MftpCommand::NOOP => "NOOP",
            MftpCommand::ABOR => "ABOR",
            MftpCommand::MDTM => "MDTM",
            MftpCommand::FEAT => "FEAT",
            MftpCommand::PWDR => "PWDR",
        }
    }
}
