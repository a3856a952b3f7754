use crate::api::{ApiError, PasteService, UploadProgress};
use crate::forms::SaveForm;
use crate::paste::{DisplayMode, Draft, PostId, SaveKind, ValidationError};
use crate::recipients;
use crate::render;
use crate::templates::{
    CannotDeleteTemplate, DeleteConfirmTemplate, DeleteSelectedTemplate, FileSlotsTemplate,
    LinkTemplate,
};
use askama::Template;
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

const COMMUNICATION_ERROR: &str = "There was a communication problem with the server";
const NOT_SAVED_WARNING: &str = "This post hasn't been saved yet";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Edit,
    Preview,
}

/// How the page asked to be opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitialView {
    Edit,
    Show,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalAction {
    /// Informational dialog, confirming it does nothing.
    Dismiss,
    DeletePost { path: String, redirect: String },
    DeleteSelected { paths: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedPaste {
    pub link: String,
    pub checked: bool,
}

#[derive(Clone, Debug)]
pub struct Modal {
    pub title: String,
    pub body_html: String,
    pub action: ModalAction,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Autosave had nothing to do.
    Skipped,
    Invalid(ValidationError),
    Saved(PostId),
    Failed,
}

#[derive(Debug)]
pub struct View {
    pub mode: ViewMode,
    pub preview_html: String,
    pub title_readonly: bool,
    pub display_mode_text: String,
    pub irc_selected: Option<String>,
    pub link: Option<String>, // The link panel is shown while this is set
    pub location: Url,        // What the address bar shows
    pub neutral: Option<String>,
    pub banners: Vec<Banner>,
    pub attachments_html: String,
    pub attachments_visible: bool,
    pub file_slots: Vec<Option<PathBuf>>,
    pub upload_progress: Option<UploadProgress>,
    pub modal: Option<Modal>,
    pub redirect: Option<String>,
    pub recipients: Vec<String>,
    pub listing: Vec<ListedPaste>,
    banner_ttl: Duration,
}

impl View {
    fn new(location: Url, banner_ttl: Duration) -> Self {
        View {
            mode: ViewMode::Edit,
            preview_html: String::new(),
            title_readonly: false,
            display_mode_text: DisplayMode::default().label().to_string(),
            irc_selected: None,
            link: None,
            location,
            neutral: None,
            banners: vec![],
            attachments_html: String::new(),
            attachments_visible: false,
            file_slots: vec![None],
            upload_progress: None,
            modal: None,
            redirect: None,
            recipients: vec![],
            listing: vec![],
            banner_ttl,
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        match self.mode {
            ViewMode::Edit => "Preview",
            ViewMode::Preview => "Edit",
        }
    }

    pub fn active_banners(&self) -> impl Iterator<Item = &Banner> {
        let now = Instant::now();
        self.banners.iter().filter(move |b| b.expires_at > now)
    }

    pub fn prune_banners(&mut self) {
        let now = Instant::now();
        self.banners.retain(|b| b.expires_at > now);
    }

    pub fn last_banner(&self, kind: BannerKind) -> Option<&str> {
        self.active_banners()
            .filter(|b| b.kind == kind)
            .last()
            .map(|b| b.message.as_str())
    }

    pub fn link_html(&self) -> Option<String> {
        let link = self.link.as_deref()?;
        Some(render_body(LinkTemplate { link }))
    }

    pub fn files_html(&self) -> String {
        let names: Vec<String> = self
            .file_slots
            .iter()
            .map(|slot| {
                slot.as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect();

        FileSlotsTemplate { names: &names }
            .render()
            .unwrap_or_else(|err| {
                error!("Failed to render file slots: {}", err);
                String::new()
            })
    }

    fn neutral_in(&mut self, message: &str) {
        self.neutral = Some(message.to_string());
    }

    fn neutral_out(&mut self) {
        self.neutral = None;
    }

    fn banner(&mut self, kind: BannerKind, message: &str) {
        self.prune_banners();
        self.banners.push(Banner {
            kind,
            message: message.to_string(),
            expires_at: Instant::now() + self.banner_ttl,
        });
    }

    fn show_success(&mut self, message: &str) {
        self.banner(BannerKind::Success, message);
    }

    fn show_warning(&mut self, message: &str) {
        self.banner(BannerKind::Warning, message);
    }

    fn show_error(&mut self, message: &str) {
        self.banner(BannerKind::Error, message);
    }

    // Delete failures share one taxonomy: a missing paste is only a warning
    fn report_delete_error(&mut self, path: &str, err: &ApiError) {
        match err {
            ApiError::NotFound => {
                warn!("Delete of {} hit a paste the server never saw", path);
                self.show_warning(NOT_SAVED_WARNING);
            }
            _ => {
                error!("Delete of {} failed: {}", path, err);
                self.show_error(COMMUNICATION_ERROR);
            }
        }
    }
}

/// Listing links look like `/get/<...>`, the matching delete endpoint is `/delete/<...>`.
pub fn delete_path_for(link: &str) -> String {
    // Only the path is rewritten, hosts may well contain "get"
    match Url::parse(link) {
        Ok(mut url) => {
            let path = get_to_delete(url.path());
            url.set_path(&path);
            url.to_string()
        }
        Err(_) => get_to_delete(link),
    }
}

fn get_to_delete(path: &str) -> String {
    match path.strip_prefix("get/") {
        Some(rest) => format!("delete/{}", rest),
        None => path.replacen("/get/", "/delete/", 1),
    }
}

pub struct PasteEditor<S> {
    service: S,
    base: Url,
    draft: Draft,
    post_id: Option<PostId>,
    view: View,
    progress: watch::Sender<Option<UploadProgress>>,
}

impl<S: PasteService> PasteEditor<S> {
    pub fn new(service: S, base: Url, draft: Draft, banner_ttl: Duration) -> Self {
        let mut view = View::new(base.clone(), banner_ttl);
        view.display_mode_text = draft.display_mode.label().to_string();
        view.irc_selected = draft.irc_channel.clone();

        PasteEditor {
            service,
            base,
            draft,
            post_id: None,
            view,
            progress: watch::Sender::new(None),
        }
    }

    /// Editor for a paste the server already knows about.
    pub fn with_post_id(mut self, id: PostId) -> Self {
        self.post_id = Some(id);
        self
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn post_id(&self) -> Option<&PostId> {
        self.post_id.as_ref()
    }

    /// Follows uploads as they run, the editor itself stays locked until they finish.
    pub fn upload_progress(&self) -> watch::Receiver<Option<UploadProgress>> {
        self.progress.subscribe()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn join(&self, path: &str) -> Url {
        self.base
            .join(path)
            .unwrap_or_else(|_| self.base.clone())
    }

    pub async fn load_page(&mut self, initial: InitialView, location: Url) {
        self.view.location = location;
        if initial == InitialView::Show {
            self.display_post().await;
            self.view.link = Some(self.view.location.to_string());
        }
    }

    async fn display_post(&mut self) {
        let content = match self.draft.content.read().await {
            Ok(content) => content,
            Err(err) => {
                error!("Failed to read editor content: {}", err);
                self.view.show_error("Could not read the editor content");
                return;
            }
        };

        self.view.preview_html = render::generate_html(&content, self.draft.display_mode);
        self.view.mode = ViewMode::Preview;
        self.view.title_readonly = true;
    }

    pub async fn toggle_preview(&mut self) {
        match self.view.mode {
            ViewMode::Edit => self.display_post().await,
            ViewMode::Preview => {
                self.view.mode = ViewMode::Edit;
                self.view.title_readonly = false;
            }
        }
    }

    pub async fn select_display_mode(&mut self, mode: DisplayMode) {
        self.draft.display_mode = mode;
        self.view.display_mode_text = mode.label().to_string();
        if self.view.mode == ViewMode::Preview {
            self.display_post().await;
        }
    }

    pub fn select_channel(&mut self, channel: &str) {
        self.draft.irc_channel = Some(channel.to_string());
        self.view.irc_selected = Some(channel.to_string());
    }

    pub fn attach_file(&mut self, slot: usize, path: PathBuf) {
        if let Some(entry) = self.view.file_slots.get_mut(slot) {
            *entry = Some(path);
        }
    }

    /// Adds another file input, but only once every existing one holds a file.
    pub fn attach_more(&mut self) -> bool {
        if self.view.file_slots.iter().all(Option::is_some) {
            self.view.file_slots.push(None);
            return true;
        }
        false
    }

    fn pending_files(&self) -> Vec<PathBuf> {
        self.view.file_slots.iter().flatten().cloned().collect()
    }

    pub async fn send_data(&mut self, kind: SaveKind) -> SaveOutcome {
        let autosave = kind.is_autosave();
        if autosave && self.view.mode == ViewMode::Preview {
            return SaveOutcome::Skipped;
        }

        let content = match self.draft.content.read().await {
            Ok(content) => content,
            Err(err) => {
                error!("Failed to read editor content: {}", err);
                if autosave {
                    return SaveOutcome::Skipped;
                }
                self.view.show_error("Could not read the editor content");
                return SaveOutcome::Failed;
            }
        };

        if let Err(invalid) = self.draft.validate(&content) {
            if autosave {
                return SaveOutcome::Skipped;
            }
            self.view.show_error(invalid.message());
            return SaveOutcome::Invalid(invalid);
        }

        self.view.neutral_in("Loading ...");
        let form = SaveForm::new(&self.draft, content, kind);
        let response = self.service.save(kind, self.post_id.as_ref(), &form).await;

        let id = match response {
            Ok(id) => id,
            Err(err) => {
                error!("Failed to {} paste: {}", kind.endpoint(), err);
                self.view.neutral_out();
                self.view.show_error(COMMUNICATION_ERROR);
                return SaveOutcome::Failed;
            }
        };

        if autosave {
            self.view.location = self.join(&format!("getautosave/{}", id));
            self.view.show_success("Autosaved!");
            self.view.neutral_out();
            debug!("Autosaved as {}", id);
            return SaveOutcome::Saved(id);
        }

        info!("Saved paste {}", id);
        self.view.link = Some(self.join(&format!("get/{}", id)).to_string());
        self.post_id = Some(id.clone());

        let files = self.pending_files();
        if files.is_empty() {
            self.view.show_success("Post saved!");
            self.view.neutral_out();
        } else {
            self.upload_files(&id, &files).await;
        }

        SaveOutcome::Saved(id)
    }

    async fn upload_files(&mut self, id: &PostId, files: &[PathBuf]) {
        self.view.neutral_in("Uploading files ...");
        self.view.upload_progress = Some(UploadProgress::default());
        self.progress.send_replace(Some(UploadProgress::default()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let upload = self.service.upload(id, files, tx);
        tokio::pin!(upload);

        let result = loop {
            tokio::select! {
                result = &mut upload => break result,
                Some(progress) = rx.recv() => {
                    self.view.upload_progress = Some(progress);
                    self.progress.send_replace(Some(progress));
                }
            }
        };
        while let Ok(progress) = rx.try_recv() {
            self.view.upload_progress = Some(progress);
            self.progress.send_replace(Some(progress));
        }

        match result {
            Ok(listing) => {
                info!("Uploaded {} file(s) for {}", files.len(), id);
                self.view.attachments_visible = !listing.trim().is_empty();
                self.view.attachments_html = listing;
                self.view.file_slots = vec![None];
                self.view.neutral_out();
                self.view.show_success("Post saved!");
            }
            Err(err) => {
                error!("Failed to upload files for {}: {}", id, err);
                self.view.neutral_out();
                self.view.show_error("Failed to upload files");
            }
        }
    }

    pub fn request_delete(&mut self) {
        let modal = match &self.post_id {
            Some(id) => Modal {
                title: "Delete".to_string(),
                body_html: render_body(DeleteConfirmTemplate {
                    title: &self.draft.title,
                }),
                action: ModalAction::DeletePost {
                    path: format!("delete/{}", id),
                    redirect: "/".to_string(),
                },
            },
            None => Modal {
                title: "Cannot Delete".to_string(),
                body_html: render_body(CannotDeleteTemplate),
                action: ModalAction::Dismiss,
            },
        };
        self.view.modal = Some(modal);
    }

    /// Replaces the paste listing, nothing starts out checked.
    pub fn set_listing(&mut self, links: &[String]) {
        self.view.listing = links
            .iter()
            .map(|link| ListedPaste {
                link: link.clone(),
                checked: false,
            })
            .collect();
    }

    pub fn toggle_selected(&mut self, link: &str) {
        if let Some(entry) = self.view.listing.iter_mut().find(|e| e.link == link) {
            entry.checked = !entry.checked;
        }
    }

    pub fn select_all(&mut self, checked: bool) {
        for entry in self.view.listing.iter_mut() {
            entry.checked = checked;
        }
    }

    pub fn selected_links(&self) -> Vec<&str> {
        self.view
            .listing
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.link.as_str())
            .collect()
    }

    pub fn request_delete_selected(&mut self) {
        let paths = self
            .selected_links()
            .into_iter()
            .map(delete_path_for)
            .collect();

        self.view.modal = Some(Modal {
            title: "Delete Selected".to_string(),
            body_html: render_body(DeleteSelectedTemplate),
            action: ModalAction::DeleteSelected { paths },
        });
    }

    pub fn dismiss_modal(&mut self) {
        self.view.modal = None;
    }

    /// Runs whatever the open dialog asked for, returning where to navigate on success.
    pub async fn confirm_modal(&mut self) -> Option<String> {
        let modal = self.view.modal.take()?;
        let redirect = match modal.action {
            ModalAction::Dismiss => None,
            ModalAction::DeletePost { path, redirect } => {
                self.view.neutral_in("Loading ...");
                match self.service.delete(&path).await {
                    Ok(()) => {
                        info!("Deleted {}", path);
                        Some(redirect)
                    }
                    Err(err) => {
                        self.view.neutral_out();
                        self.view.report_delete_error(&path, &err);
                        None
                    }
                }
            }
            ModalAction::DeleteSelected { paths } => self.delete_many(&paths).await,
        };

        if redirect.is_some() {
            self.view.redirect = redirect.clone();
        }
        redirect
    }

    async fn delete_many(&mut self, paths: &[String]) -> Option<String> {
        if paths.is_empty() {
            return None;
        }

        self.view.neutral_in("Loading ...");
        let service = &self.service;
        let mut pending: FuturesUnordered<_> = paths
            .iter()
            .map(|path| async move { (path, service.delete(path).await) })
            .collect();

        let mut outstanding = pending.len();
        while let Some((path, result)) = pending.next().await {
            outstanding -= 1;
            match result {
                Ok(()) => debug!("Deleted {}, {} outstanding", path, outstanding),
                Err(err) => self.view.report_delete_error(path, &err),
            }
        }

        self.view.neutral_out();
        info!("Finished deleting {} paste(s)", paths.len());
        Some("/all".to_string())
    }

    pub async fn delete_attachment(&mut self, link: &str) {
        match self.service.delete_attachment(link).await {
            Ok(listing) => {
                self.view.attachments_visible = !listing.trim().is_empty();
                self.view.attachments_html = listing;
            }
            Err(err) => {
                error!("Failed to delete attachment {}: {}", link, err);
                self.view.show_error(COMMUNICATION_ERROR);
            }
        }
    }

    pub async fn refresh_recipients(&mut self) {
        let Some(channel) = self.draft.irc_channel.clone() else {
            return;
        };

        match self.service.user_list(&channel).await {
            Ok(names) => {
                debug!("{} recipients known for {}", names.len(), channel);
                self.view.recipients = names;
            }
            // Stale candidates are still better than none
            Err(err) => warn!("Failed to refresh recipients for {}: {}", channel, err),
        }
    }

    pub fn recipient_suggestions(&self, input: &str) -> Vec<String> {
        recipients::suggest(input, &self.view.recipients)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn complete_recipient(&mut self, input: &str, choice: &str) {
        self.draft.receiver = Some(recipients::complete(input, choice));
    }
}

fn render_body<T: Template>(template: T) -> String {
    template.render().unwrap_or_else(|err| {
        error!("Failed to render dialog: {}", err);
        String::new()
    })
}
