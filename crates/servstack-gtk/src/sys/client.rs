use super::{ControlCommand, SOCKET_PATH};
use anyhow::Context;
use std::io::Write;
use std::os::unix::net::UnixStream;

/// Sends one command to a running instance.
pub fn send_command(command: ControlCommand) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH)
        .with_context(|| format!("servstack is not running ({} unavailable)", SOCKET_PATH))?;
    writeln!(stream, "{}", command)?;
    Ok(())
}
