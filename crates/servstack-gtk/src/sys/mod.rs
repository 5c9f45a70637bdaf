use crate::events::AppEvent;
use strum::{Display, EnumString};

pub mod client;
pub mod runtime;
pub mod server;

pub const SOCKET_PATH: &str = "/tmp/servstack.sock";

/// One line on the control socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ControlCommand {
    Open,
    Close,
    Toggle,
    Project,
}

impl From<ControlCommand> for AppEvent {
    fn from(command: ControlCommand) -> Self {
        match command {
            ControlCommand::Open => AppEvent::Open,
            ControlCommand::Close => AppEvent::Close,
            ControlCommand::Toggle => AppEvent::Toggle,
            ControlCommand::Project => AppEvent::OpenProject,
        }
    }
}
