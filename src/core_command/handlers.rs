use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::core_protocol::command::MftpCommand;
use crate::server::ServerContext;
use crate::session::{CommandWriter, SharedSession};

type CommandHandler = Box<
    dyn Fn(
            Arc<ServerContext>,
            SharedSession,
            CommandWriter,
            String, // Argument string, verbatim
        ) -> Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>>
        + Send
        + Sync,
>;

pub type CommandHandlerMap = HashMap<MftpCommand, Arc<CommandHandler>>;

/// Builds the dispatch table. Tokens that parse but are absent here (RMDR,
/// MKDR, RNME, MDTM) get a NOT_IMPLEMENTED reply from the connection loop.
pub fn initialize_command_handlers() -> CommandHandlerMap {
    let mut handlers: CommandHandlerMap = HashMap::new();

    handlers.insert(
        MftpCommand::NOOP,
        Arc::new(Box::new(|_ctx, _session, writer, _arg| {
            Box::pin(crate::core_command::noop::handle_noop_command(writer))
        })),
    );

    handlers.insert(
        MftpCommand::QUIT,
        Arc::new(Box::new(|_ctx, _session, writer, _arg| {
            Box::pin(crate::core_command::quit::handle_quit_command(writer))
        })),
    );

    handlers.insert(
        MftpCommand::FEAT,
        Arc::new(Box::new(|_ctx, _session, writer, _arg| {
            Box::pin(crate::core_command::feat::handle_feat_command(writer))
        })),
    );

    handlers.insert(
        MftpCommand::USER,
        Arc::new(Box::new(|_ctx, session, writer, arg| {
            Box::pin(crate::core_command::user::handle_user_command(
                session, writer, arg,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::PASS,
        Arc::new(Box::new(|ctx, session, writer, arg| {
            Box::pin(crate::core_command::pass::handle_pass_command(
                ctx, session, writer, arg,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::WAMI,
        Arc::new(Box::new(|_ctx, session, writer, _arg| {
            Box::pin(crate::core_command::wami::handle_wami_command(
                session, writer,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::PWDR,
        Arc::new(Box::new(|_ctx, session, writer, _arg| {
            Box::pin(crate::core_command::pwdr::handle_pwdr_command(
                session, writer,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::CHWD,
        Arc::new(Box::new(|ctx, session, writer, arg| {
            Box::pin(crate::core_command::chwd::handle_chwd_command(
                ctx, session, writer, arg,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::SIZE,
        Arc::new(Box::new(|ctx, session, writer, arg| {
            Box::pin(crate::core_command::size::handle_size_command(
                ctx, session, writer, arg,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::DELE,
        Arc::new(Box::new(|ctx, session, writer, arg| {
            Box::pin(crate::core_command::dele::handle_dele_command(
                ctx, session, writer, arg,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::LIST,
        Arc::new(Box::new(|ctx, session, writer, _arg| {
            Box::pin(crate::core_command::list::handle_list_command(
                ctx, session, writer,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::RETR,
        Arc::new(Box::new(|ctx, session, writer, arg| {
            Box::pin(crate::core_command::retr::handle_retr_command(
                ctx, session, writer, arg,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::STOR,
        Arc::new(Box::new(|ctx, session, writer, arg| {
            Box::pin(crate::core_command::stor::handle_stor_command(
                ctx, session, writer, arg,
            ))
        })),
    );

    handlers.insert(
        MftpCommand::ABOR,
        Arc::new(Box::new(|_ctx, session, writer, _arg| {
            Box::pin(crate::core_command::abor::handle_abor_command(
                session, writer,
            ))
        })),
    );

    handlers
}
