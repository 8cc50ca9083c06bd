use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};

/// Where the raw bytes of an image message come from.
#[async_trait]
pub trait ImageSource: Send + Sync + fmt::Debug {
    async fn fetch(&self) -> Result<Vec<u8>>;

    /// Short human-readable origin, used in previews and logs.
    fn describe(&self) -> String;
}

/// Pick a source for `location`: an existing local file wins, anything else is
/// treated as a remote URL.
pub async fn image_source(location: &str, client: &reqwest::Client) -> Box<dyn ImageSource> {
    let path = PathBuf::from(location);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        debug!(path = %path.display(), "image resolved to local file");
        Box::new(LocalImage { path })
    } else {
        debug!(url = location, "image path not found locally, fetching remotely");
        Box::new(RemoteImage {
            url: location.to_string(),
            client: client.clone(),
        })
    }
}

#[derive(Debug)]
pub struct LocalImage {
    pub path: PathBuf,
}

#[async_trait]
impl ImageSource for LocalImage {
    async fn fetch(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug)]
pub struct RemoteImage {
    pub url: String,
    client: reqwest::Client,
}

impl RemoteImage {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl ImageSource for RemoteImage {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::ImageFetch {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().await?;
        debug!(url = %self.url, len = bytes.len(), "downloaded image");
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use httpmock::prelude::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn existing_path_reads_local_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G', 0, 1, 2])
            .await
            .unwrap();

        let client = reqwest::Client::new();
        let src = image_source(path.to_str().unwrap(), &client).await;
        assert_eq!(src.describe(), path.display().to_string());
        assert_eq!(src.fetch().await.unwrap(), vec![0x89, b'P', b'N', b'G', 0, 1, 2]);
    }

    #[tokio::test]
    async fn missing_path_is_fetched_over_http() {
        let server = MockServer::start_async().await;
        let image = server.mock(|when, then| {
            when.method(GET).path("/img/logo.jpg");
            then.status(200).body([0xff, 0xd8, 0xff, 0xe0]);
        });

        let client = reqwest::Client::new();
        let src = image_source(&server.url("/img/logo.jpg"), &client).await;
        assert_eq!(src.fetch().await.unwrap(), vec![0xff, 0xd8, 0xff, 0xe0]);
        image.assert_calls(1);
    }

    #[tokio::test]
    async fn remote_error_status_is_not_treated_as_image() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/gone.png");
            then.status(404).body("not found");
        });

        let src = RemoteImage::new(server.url("/gone.png"), reqwest::Client::new());
        assert_matches!(
            src.fetch().await,
            Err(Error::ImageFetch { status: 404, .. })
        );
    }
}
