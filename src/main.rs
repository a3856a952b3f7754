use pasty::config::AppConfig;
use pasty::controller::{InitialView, PasteEditor, SaveOutcome};
use pasty::paste::{PostId, SaveKind};
use pasty::session::{self, Timers};
use pasty::{runtime, HttpPasteService};
use tracing::{error, info, warn};
use tracing_subscriber;

#[tokio::main]
async fn main() {
    // Set up the tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init(); // Initialize the subscriber

    let config = AppConfig::new();

    let service = match HttpPasteService::new(&config.server_url, config.request_timeout()) {
        Ok(service) => service,
        Err(err) => {
            error!("Cannot talk to {}: {}", config.server_url, err);
            std::process::exit(1);
        }
    };
    let base = service.base().clone();
    info!("Editing against {}", base);

    let mut editor = PasteEditor::new(service, base.clone(), config.draft(), config.banner_ttl());
    if let Some(id) = config.post_id.as_deref().and_then(PostId::parse) {
        editor = editor.with_post_id(id);
    }
    editor.load_page(InitialView::Edit, base).await;

    let editor = runtime::share(editor);
    let timers = Timers {
        autosave: config.autosave_interval(),
        userlist_refresh: config.userlist_refresh(),
    };
    session::run(editor.clone(), timers, runtime::shutdown_signal()).await;

    if !config.save_on_exit {
        return;
    }

    let mut editor = editor.lock().await;
    match editor.send_data(SaveKind::Save).await {
        SaveOutcome::Saved(id) => {
            let link = editor.view().link.clone().unwrap_or_default();
            info!("Saved paste {} at {}", id, link);
        }
        SaveOutcome::Invalid(invalid) => warn!("Not saving: {}", invalid.message()),
        outcome => error!("Final save did not go through: {:?}", outcome),
    }
}
