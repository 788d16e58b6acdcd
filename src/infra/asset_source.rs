use async_trait::async_trait;
use tracing::{debug, error};

use crate::app::ports::{AssetSourcePort, HttpClientPort};
use crate::error::{ChartError, Result};
use crate::infra::http_client::ReqwestHttp;
use crate::observability::metrics;

/// Loads assets from `http(s)://` URLs through the HTTP port and from the
/// local filesystem otherwise
pub struct AssetLoader {
    http: Box<dyn HttpClientPort>,
}

impl AssetLoader {
    pub fn new(http: Box<dyn HttpClientPort>) -> Self {
        Self { http }
    }

    pub fn is_remote(location: &str) -> bool {
        location.starts_with("http://") || location.starts_with("https://")
    }

    async fn fetch_remote(&self, location: &str) -> Result<Vec<u8>> {
        let response = self.http.get(location).await?;
        if !(200..300).contains(&response.status) {
            return Err(ChartError::Fetch {
                location: location.to_string(),
                status: response.status,
            });
        }
        debug!(
            location,
            content_type = %response.content_type,
            content_length = response.content_length,
            "Fetched remote asset"
        );
        Ok(response.bytes)
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new(Box::new(ReqwestHttp::new()))
    }
}

#[async_trait]
impl AssetSourcePort for AssetLoader {
    async fn load(&self, location: &str) -> Result<Vec<u8>> {
        let (kind, result) = if Self::is_remote(location) {
            ("http", self.fetch_remote(location).await)
        } else {
            ("file", tokio::fs::read(location).await.map_err(ChartError::from))
        };

        match result {
            Ok(bytes) => {
                metrics::assets::fetched(kind, bytes.len());
                Ok(bytes)
            }
            Err(e) => {
                error!(location, error = %e, "Failed to load asset");
                metrics::assets::failed(kind);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpGetResult;
    use std::io::Write;

    struct FixedHttp {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClientPort for FixedHttp {
        async fn get(&self, _url: &str) -> Result<HttpGetResult> {
            Ok(HttpGetResult {
                status: self.status,
                bytes: self.body.as_bytes().to_vec(),
                content_type: "application/json".to_string(),
                content_length: self.body.len() as u64,
            })
        }
    }

    #[tokio::test]
    async fn test_remote_success() {
        let loader = AssetLoader::new(Box::new(FixedHttp { status: 200, body: "{}" }));
        let bytes = loader.load("https://example.org/data_summary.json").await.unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[tokio::test]
    async fn test_remote_error_status_is_fetch_error() {
        let loader = AssetLoader::new(Box::new(FixedHttp { status: 404, body: "" }));
        let err = loader.load("http://example.org/missing.json").await.unwrap_err();
        assert!(matches!(err, ChartError::Fetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_reads_local_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"QA\": []}}").unwrap();

        let loader = AssetLoader::new(Box::new(FixedHttp { status: 500, body: "" }));
        let bytes = loader.load(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"{\"QA\": []}");

        assert!(matches!(
            loader.load("/nonexistent/table.json").await,
            Err(ChartError::Io(_))
        ));
    }
}
