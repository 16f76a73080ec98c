use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 等待 Ctrl+C 或 SIGTERM。
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(target: "ems.fleet", error = %err, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(target: "ems.fleet", error = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!(target: "ems.fleet", signal = "SIGINT", "shutdown_signal_received"),
        () = terminate => {
            info!(target: "ems.fleet", signal = "SIGTERM", "shutdown_signal_received")
        }
    }
}

/// 收到关停信号时取消 `cancel`；`cancel` 被其他途径取消时任务随之退出。
pub fn cancel_on_shutdown_signal(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = shutdown_signal() => cancel.cancel(),
            () = cancel.cancelled() => {}
        }
    })
}
