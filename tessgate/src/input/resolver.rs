use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::engine::RawImage;
use crate::error::{Result, TessgateError};

use super::decode::decode_lenient;
use super::request::{ImageRequest, ImageSource, UploadedFile};

/// Turns whichever carrier a request used into raw image bytes.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: Client,
}

impl ImageResolver {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TessgateError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub async fn resolve(&self, request: ImageRequest) -> Result<RawImage> {
        let source = request
            .into_source()
            .ok_or(TessgateError::NoImageProvided)?;
        debug!(source = source.kind(), "Resolving image source");

        match source {
            ImageSource::Base64(content) => Ok(RawImage::from(decode_lenient(&content))),
            ImageSource::Url(url) => self.fetch(&url).await,
            ImageSource::Raw(bytes) => Ok(RawImage::from(bytes)),
            ImageSource::Upload(file) => read_upload(file).await,
        }
    }

    async fn fetch(&self, url: &str) -> Result<RawImage> {
        info!(url = %url, "Fetching image");

        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        debug!(url = %url, bytes = bytes.len(), "Fetched image");
        Ok(RawImage::from(bytes))
    }
}

/// Read a spooled upload on the blocking pool, then delete it whether or not
/// the read succeeded.
async fn read_upload(file: UploadedFile) -> Result<RawImage> {
    let read = tokio::task::spawn_blocking(move || {
        let path = file.into_temp_path();
        let bytes = std::fs::read(&path);
        if let Err(e) = path.close() {
            warn!(error = %e, "Failed to remove uploaded file");
        }
        bytes
    })
    .await
    .map_err(|e| TessgateError::Internal(format!("Upload read task failed: {e}")))?;

    read.map(RawImage::from)
        .map_err(|e| TessgateError::FileRead(e.to_string()))
}
