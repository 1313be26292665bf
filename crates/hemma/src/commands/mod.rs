//! Command handlers, one module per resource.

pub mod authorize;
pub mod context_cmd;
pub mod curl;
pub mod devices;
pub mod hubs;
pub mod listen;
pub mod rooms;
pub mod scenes;
pub mod users;
pub mod util;

use crate::cli::{Command, DeleteCommand, GlobalOpts, ListCommand, ShowCommand};
use crate::error::CliError;

pub async fn dispatch(command: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Authorize(args) => authorize::handle(args, global).await,

        Command::List(args) => match args.command {
            ListCommand::Hubs { timeout } => hubs::list(timeout, global).await,
            ListCommand::Contexts => context_cmd::list(global),
            ListCommand::Devices => devices::list(global).await,
            ListCommand::Rooms => rooms::list(global).await,
            ListCommand::Scenes => scenes::list(global).await,
            ListCommand::Users => users::list(global).await,
        },

        Command::Show(args) => match args.command {
            ShowCommand::Device { id } => devices::show(&id, global).await,
            ShowCommand::Room { id } => rooms::show(&id, global).await,
            ShowCommand::Scene { id } => scenes::show(&id, global).await,
            ShowCommand::User { id, me } => users::show(id.as_deref(), me, global).await,
            ShowCommand::Hub => devices::show_hub(global).await,
            ShowCommand::Token => context_cmd::show_token(global),
        },

        Command::Delete(args) => match args.command {
            DeleteCommand::User { id } => users::delete(&id, global).await,
            DeleteCommand::Context { name } => context_cmd::delete(&name, global),
        },

        Command::Use { name } => context_cmd::use_context(&name),

        Command::Listen(args) => listen::handle(args, global).await,

        Command::Curl { path } => curl::handle(&path, global).await,

        // Handled in main before dispatch.
        Command::Completions(_) => Ok(()),
    }
}
