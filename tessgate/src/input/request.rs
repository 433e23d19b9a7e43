use std::path::Path;

use bytes::Bytes;
use serde::Deserialize;
use tempfile::TempPath;

/// JSON body accepted by `POST /extract-text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonImageBody {
    /// Base64-encoded image.
    #[serde(default)]
    pub content: Option<String>,
    /// Location of an image to download.
    #[serde(default)]
    pub url: Option<String>,
}

/// A multipart upload spooled to disk. The file is removed when this is dropped.
#[derive(Debug)]
pub struct UploadedFile {
    path: TempPath,
}

impl UploadedFile {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    /// Adopt an existing file; it is deleted once resolved or dropped.
    #[cfg(test)]
    pub(crate) fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: TempPath::try_from_path(path).unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn into_temp_path(self) -> TempPath {
        self.path
    }
}

/// Every image carrier an extraction request may hold.
#[derive(Debug, Default)]
pub struct ImageRequest {
    pub json: Option<JsonImageBody>,
    pub raw: Option<Bytes>,
    pub upload: Option<UploadedFile>,
}

/// The one carrier that wins resolution precedence.
#[derive(Debug)]
pub enum ImageSource {
    Base64(String),
    Url(String),
    Raw(Bytes),
    Upload(UploadedFile),
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Base64(_) => "base64",
            ImageSource::Url(_) => "url",
            ImageSource::Raw(_) => "raw",
            ImageSource::Upload(_) => "upload",
        }
    }
}

impl ImageRequest {
    pub fn from_json(body: JsonImageBody) -> Self {
        Self {
            json: Some(body),
            ..Self::default()
        }
    }

    pub fn from_raw(bytes: Bytes) -> Self {
        Self {
            raw: Some(bytes),
            ..Self::default()
        }
    }

    pub fn from_upload(file: UploadedFile) -> Self {
        Self {
            upload: Some(file),
            ..Self::default()
        }
    }

    /// Pick the source by fixed precedence: JSON `content`, JSON `url`, raw
    /// image body, multipart upload. Empty values do not count. Carriers
    /// that lose are dropped, which removes any spooled upload.
    pub fn into_source(self) -> Option<ImageSource> {
        let ImageRequest { json, raw, upload } = self;
        let JsonImageBody { content, url } = json.unwrap_or_default();

        if let Some(content) = content.filter(|c| !c.is_empty()) {
            return Some(ImageSource::Base64(content));
        }
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            return Some(ImageSource::Url(url));
        }
        if let Some(raw) = raw.filter(|r| !r.is_empty()) {
            return Some(ImageSource::Raw(raw));
        }
        upload.map(ImageSource::Upload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(content: Option<&str>, url: Option<&str>) -> JsonImageBody {
        JsonImageBody {
            content: content.map(String::from),
            url: url.map(String::from),
        }
    }

    #[test]
    fn content_wins_over_url() {
        let request = ImageRequest::from_json(json(Some("aGk="), Some("http://example.com/a.png")));
        assert!(matches!(request.into_source(), Some(ImageSource::Base64(c)) if c == "aGk="));
    }

    #[test]
    fn empty_content_falls_through_to_url() {
        let request = ImageRequest::from_json(json(Some(""), Some("http://example.com/a.png")));
        assert!(matches!(request.into_source(), Some(ImageSource::Url(_))));
    }

    #[test]
    fn json_wins_over_raw_and_upload() {
        let dir = tempfile::tempdir().unwrap();
        let spooled = dir.path().join("upload");
        std::fs::write(&spooled, b"file").unwrap();

        let request = ImageRequest {
            json: Some(json(None, Some("http://example.com/a.png"))),
            raw: Some(Bytes::from_static(b"raw")),
            upload: Some(UploadedFile::from_path(&spooled)),
        };
        let source = request.into_source();
        assert!(matches!(source, Some(ImageSource::Url(_))));
        assert!(!spooled.exists(), "losing upload must be removed");
    }

    #[test]
    fn raw_wins_over_upload() {
        let dir = tempfile::tempdir().unwrap();
        let spooled = dir.path().join("upload");
        std::fs::write(&spooled, b"file").unwrap();

        let request = ImageRequest {
            json: None,
            raw: Some(Bytes::from_static(b"raw")),
            upload: Some(UploadedFile::from_path(&spooled)),
        };
        let source = request.into_source().unwrap();
        assert_eq!(source.kind(), "raw");
    }

    #[test]
    fn dropping_an_upload_removes_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let spooled = dir.path().join("upload");
        std::fs::write(&spooled, b"file").unwrap();

        let upload = UploadedFile::from_path(&spooled);
        assert_eq!(upload.path(), spooled.as_path());
        drop(upload);

        assert!(!spooled.exists());
    }

    #[test]
    fn empty_raw_body_is_not_an_image() {
        let request = ImageRequest::from_raw(Bytes::new());
        assert!(request.into_source().is_none());
    }

    #[test]
    fn empty_json_is_not_an_image() {
        assert!(ImageRequest::from_json(JsonImageBody::default())
            .into_source()
            .is_none());
        assert!(ImageRequest::default().into_source().is_none());
    }
}
