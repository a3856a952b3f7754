use crate::api::PasteService;
use crate::paste::SaveKind;
use crate::runtime::SharedEditor;
use std::future::Future;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub struct Timers {
    pub autosave: Duration,
    pub userlist_refresh: Duration,
}

pub async fn autosave<S: PasteService>(editor: SharedEditor<S>, period: Duration) {
    // The first autosave happens one full period after the page opens
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let outcome = editor.lock().await.send_data(SaveKind::Autosave).await;
        debug!("Autosave tick: {:?}", outcome);
    }
}

pub async fn refresh_recipients<S: PasteService>(editor: SharedEditor<S>, period: Duration) {
    // Refresh right away, then on every period
    let mut ticker = interval_at(Instant::now(), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        editor.lock().await.refresh_recipients().await;
    }
}

/// Runs the periodic work of an editing session until `shutdown` resolves.
pub async fn run<S, F>(editor: SharedEditor<S>, timers: Timers, shutdown: F)
where
    S: PasteService,
    F: Future<Output = ()>,
{
    info!(
        "Editing session started, autosaving every {:?}",
        timers.autosave
    );

    tokio::select! {
        _ = autosave(editor.clone(), timers.autosave) => {},
        _ = refresh_recipients(editor.clone(), timers.userlist_refresh) => {},
        _ = shutdown => info!("Editing session stopping"),
    }
}
