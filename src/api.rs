use crate::forms::SaveForm;
use crate::paste::{PostId, SaveKind};
use futures::stream;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode, Url};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

const UPLOAD_CHUNK: usize = 16 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(StatusCode),
    #[error("not found")]
    NotFound,
    #[error("server returned an empty post id")]
    EmptyId,
    #[error("could not read attachment: {0}")]
    File(#[from] std::io::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.sent.min(self.total) * 100) / self.total) as u8
    }
}

/// The paste server as the editor sees it.
pub trait PasteService {
    fn save(
        &self,
        kind: SaveKind,
        id: Option<&PostId>,
        form: &SaveForm,
    ) -> impl Future<Output = Result<PostId, ApiError>> + Send;

    /// Returns the HTML fragment listing the paste's attachments.
    fn upload(
        &self,
        id: &PostId,
        files: &[PathBuf],
        progress: UnboundedSender<UploadProgress>,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn delete(&self, path: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Returns the remaining attachments fragment, empty when none are left.
    fn delete_attachment(
        &self,
        link: &str,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn user_list(
        &self,
        channel: &str,
    ) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;
}

pub struct HttpPasteService {
    client: reqwest::Client,
    base: Url,
}

impl HttpPasteService {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Url::join drops the last segment unless the base ends with a slash
        let mut server_url = server_url.to_string();
        if !server_url.ends_with('/') {
            server_url.push('/');
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpPasteService {
            client,
            base: Url::parse(&server_url)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    // Root-relative paths resolve against the origin, like hrefs in a page
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    async fn post_text(&self, url: Url) -> Result<String, ApiError> {
        let response = self.client.post(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        Ok(response.text().await?)
    }
}

fn id_path(kind: SaveKind, id: Option<&PostId>) -> String {
    match id {
        Some(id) => format!("{}/{}", kind.endpoint(), id),
        None => format!("{}/", kind.endpoint()),
    }
}

async fn file_part(
    path: &Path,
    sent: std::sync::Arc<std::sync::atomic::AtomicU64>,
    total: u64,
    progress: UnboundedSender<UploadProgress>,
) -> Result<Part, ApiError> {
    use std::sync::atomic::Ordering;

    let data = tokio::fs::read(path).await?;
    let length = data.len() as u64;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let chunks: Vec<Vec<u8>> = data.chunks(UPLOAD_CHUNK).map(<[u8]>::to_vec).collect();
    let body = Body::wrap_stream(stream::iter(chunks.into_iter().map(move |chunk| {
        let sent = sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
        // Nobody listening is fine, the upload carries on
        let _ = progress.send(UploadProgress { sent, total });
        Ok::<_, std::io::Error>(chunk)
    })));

    Ok(Part::stream_with_length(body, length)
        .file_name(file_name)
        .mime_str(mime.as_ref())?)
}

impl PasteService for HttpPasteService {
    async fn save(
        &self,
        kind: SaveKind,
        id: Option<&PostId>,
        form: &SaveForm,
    ) -> Result<PostId, ApiError> {
        let url = self.url(&id_path(kind, id))?;
        debug!("Saving paste to {}", url);

        let response = self.client.post(url).form(form).send().await?;
        if !response.status().is_success() {
            warn!("Save rejected with {}", response.status());
            return Err(ApiError::Status(response.status()));
        }

        let body = response.text().await?;
        PostId::parse(&body).ok_or(ApiError::EmptyId)
    }

    async fn upload(
        &self,
        id: &PostId,
        files: &[PathBuf],
        progress: UnboundedSender<UploadProgress>,
    ) -> Result<String, ApiError> {
        let mut total = 0;
        for file in files {
            total += tokio::fs::metadata(file).await?.len();
        }

        let sent = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
        let mut form = Form::new();
        for file in files {
            let part = file_part(file, sent.clone(), total, progress.clone()).await?;
            form = form.part("file", part);
        }

        let url = self.url(&format!("upload/{}", id))?;
        let response = self.client.post(url).multipart(form).send().await?;
        if !response.status().is_success() {
            error!("Upload for {} failed with {}", id, response.status());
            return Err(ApiError::Status(response.status()));
        }

        Ok(response.text().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.post_text(url).await.map(|_| ())
    }

    async fn delete_attachment(&self, link: &str) -> Result<String, ApiError> {
        let url = self.url(link)?;
        self.post_text(url).await
    }

    async fn user_list(&self, channel: &str) -> Result<Vec<String>, ApiError> {
        // Channel names start with '#', so the segment needs encoding
        let mut url = self.url("getuserlist/")?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(channel);
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        Ok(response.json::<Vec<String>>().await?)
    }
}
