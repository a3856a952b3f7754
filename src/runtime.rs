use crate::controller::PasteEditor;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;

/// The controller shared between timers and user actions. Holding the lock for
/// a whole save keeps a second save from starting while one is in flight.
pub type SharedEditor<S> = Arc<Mutex<PasteEditor<S>>>;

pub fn share<S>(editor: PasteEditor<S>) -> SharedEditor<S> {
    Arc::new(Mutex::new(editor))
}

// https://github.com/tokio-rs/axum/blob/main/examples/graceful-shutdown/src/main.rs
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
