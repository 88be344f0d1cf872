use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Where raw post markdown comes from.
pub trait Source {
    fn fetch(&self, file: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Reads posts from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Source for FsSource {
    async fn fetch(&self, file: &str) -> Result<String, FetchError> {
        let path = self.root.join(file);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })
    }
}

/// Fetches posts relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, file: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            file.trim_start_matches('/')
        )
    }
}

impl Source for HttpSource {
    async fn fetch(&self, file: &str) -> Result<String, FetchError> {
        let response = self.client.get(self.url_for(file)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// The source picked at startup from the config.
#[derive(Debug, Clone)]
pub enum PostSource {
    Fs(FsSource),
    Http(HttpSource),
}

impl PostSource {
    pub fn describe(&self) -> String {
        match self {
            PostSource::Fs(fs) => fs.root.display().to_string(),
            PostSource::Http(http) => http.base_url.clone(),
        }
    }
}

impl Source for PostSource {
    async fn fetch(&self, file: &str) -> Result<String, FetchError> {
        match self {
            PostSource::Fs(fs) => fs.fetch(file).await,
            PostSource::Http(http) => http.fetch(file).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_source_reads_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("blog")).unwrap();
        std::fs::write(dir.path().join("blog/welcome.md"), "# Welcome\n").unwrap();

        let source = FsSource::new(dir.path());
        assert_eq!(source.fetch("blog/welcome.md").await.unwrap(), "# Welcome\n");
    }

    #[tokio::test]
    async fn test_fs_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = PostSource::Fs(FsSource::new(dir.path()));
        let err = source.fetch("blog/nope.md").await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn test_http_url_joining() {
        let source = HttpSource::new("https://example.com/site/");
        assert_eq!(
            source.url_for("/blog/welcome.md"),
            "https://example.com/site/blog/welcome.md"
        );
    }

    #[test]
    fn test_status_message() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP error! status: 404");
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(10)).to_string(),
            "timed out after 10s"
        );
    }
}
