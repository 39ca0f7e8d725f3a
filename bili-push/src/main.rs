use std::sync::Arc;

use bili_push::adapters;
use bili_push::config::ConfigStore;
use bili_push::logging::{self, LoggingConfig};
use bili_push::push::PushScheduler;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let log_dir = std::env::var("BILI_PUSH_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let (logging, _guard) = logging::init_logging(log_dir)?;

    let store = Arc::new(ConfigStore::from_env()?);
    logging.apply_debug(store.current().debug);

    let cancel = CancellationToken::new();
    logging.start_retention_cleanup(cancel.child_token());

    let scheduler = PushScheduler::new(adapters::offline::adapters());
    let scheduler_task = tokio::spawn(scheduler.run(store.clone(), cancel.child_token()));

    #[cfg(unix)]
    spawn_reload_listener(store.clone(), logging.clone(), cancel.child_token())?;

    info!("bili-push started");
    shutdown_signal().await?;

    cancel.cancel();
    scheduler_task.await?;
    info!("bili-push stopped");
    Ok(())
}

/// Reload the config file on SIGHUP.
#[cfg(unix)]
fn spawn_reload_listener(
    store: Arc<ConfigStore>,
    logging: Arc<LoggingConfig>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sighup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = sighup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    info!(signal = "SIGHUP", "Reloading config");
                    match store.reload() {
                        Ok(_) => logging.apply_debug(store.current().debug),
                        Err(e) => warn!("Config reload failed, keeping previous config: {}", e),
                    }
                }
            }
        }
    });
    Ok(())
}

/// Wait for Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!(signal = "SIGINT", "Signal received");
            }
            _ = sigterm.recv() => {
                info!(signal = "SIGTERM", "Signal received");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!(signal = "SIGINT", "Signal received");
    }

    Ok(())
}
