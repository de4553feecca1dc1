//! Object storage for rendered videos.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use tracing::info;
use url::Url;

use crate::pipeline::{PipelineError, PipelineResult};

/// Stores a file under a key and returns its public URL.
pub trait ObjectStore: Send + Sync {
    fn put(&self, key: &str, file: &Path) -> PipelineResult<String>;
}

/// Split a key into path segments, rejecting traversal.
fn key_segments(key: &str) -> PipelineResult<Vec<&str>> {
    let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() || segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(PipelineError::Upload(format!("invalid object key: {}", key)));
    }
    Ok(segments)
}

/// Stores files in a local directory served under a public URL prefix.
pub struct LocalObjectStore {
    root: PathBuf,
    public_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ObjectStore for LocalObjectStore {
    fn put(&self, key: &str, file: &Path) -> PipelineResult<String> {
        let segments = key_segments(key)?;
        let dest = segments.iter().fold(self.root.clone(), |path, s| path.join(s));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &dest)
            .map_err(|e| PipelineError::Upload(format!("{}: {}", dest.display(), e)))?;

        let url = format!("{}/{}", self.public_url, segments.join("/"));
        info!(key, %url, "video stored locally");
        Ok(url)
    }
}

/// Uploads files with an HTTP PUT to `{base}/{key}`.
pub struct HttpObjectStore {
    client: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> PipelineResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| PipelineError::Config(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PipelineError::Config(base_url.to_string()));
        }
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn object_url(&self, key: &str) -> PipelineResult<Url> {
        let segments = key_segments(key)?;
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

impl ObjectStore for HttpObjectStore {
    fn put(&self, key: &str, file: &Path) -> PipelineResult<String> {
        let url = self.object_url(key)?;
        let body = fs::read(file)?;

        let mut request = self
            .client
            .put(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "video/mp4")
            .body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| PipelineError::Upload(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PipelineError::Upload(format!(
                "status {} from object store",
                response.status().as_u16()
            )));
        }

        info!(key, %url, "video uploaded");
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_store_put() {
        let src_dir = tempfile::tempdir().unwrap();
        let file = src_dir.path().join("out.mp4");
        fs::write(&file, b"video").unwrap();

        let root = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(root.path(), "http://localhost:3000/videos/");

        let url = store.put("drug_videos/abc_interaction.mp4", &file).unwrap();
        assert_eq!(url, "http://localhost:3000/videos/drug_videos/abc_interaction.mp4");
        assert_eq!(
            fs::read(root.path().join("drug_videos").join("abc_interaction.mp4")).unwrap(),
            b"video"
        );
    }

    #[test]
    fn test_rejects_traversal_keys() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(root.path(), "http://localhost/videos");
        assert!(matches!(
            store.put("../escape.mp4", Path::new("/nonexistent")),
            Err(PipelineError::Upload(_))
        ));
        assert!(key_segments("").is_err());
    }

    #[test]
    fn test_http_object_url() {
        let store =
            HttpObjectStore::new("https://bucket.example.com/media/", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            store.object_url("drug_videos/a b.mp4").unwrap().as_str(),
            "https://bucket.example.com/media/drug_videos/a%20b.mp4"
        );
    }
}
