use super::{ControlCommand, SOCKET_PATH};
use crate::events::AppEvent;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub async fn run_server(tx: Sender<AppEvent>) {
    // stale socket from a previous run
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut lines = BufReader::new(&mut stream).lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match line.trim().parse::<ControlCommand>() {
                            Ok(command) => {
                                log::debug!("control command: {}", command);
                                if tx.send(command.into()).await.is_err() {
                                    break;
                                }
                            }
                            Err(_) => log::warn!("Unknown control command '{}'", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
