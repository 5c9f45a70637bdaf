use crate::events::AppEvent;
use async_channel::Sender;
use std::thread;
use tokio::runtime::Runtime;

/// Runs the control socket and config watcher on their own Tokio runtime,
/// off the GTK main thread.
pub fn start_background_services(tx: Sender<AppEvent>) -> anyhow::Result<()> {
    let rt = Runtime::new()?;

    thread::spawn(move || {
        rt.block_on(async {
            tokio::spawn(crate::sys::server::run_server(tx.clone()));
            tokio::spawn(crate::config::run_async_watcher(tx));

            std::future::pending::<()>().await;
        });
    });
    Ok(())
}
