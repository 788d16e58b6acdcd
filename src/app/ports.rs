use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub content_length: u64,
}

/// Reads an asset (data summary, reference table, atlas) from a path or URL
#[async_trait]
pub trait AssetSourcePort: Send + Sync {
    async fn load(&self, location: &str) -> Result<Vec<u8>>;
}

/// Destination for finished chart documents
#[async_trait]
pub trait ChartOutputPort: Send + Sync {
    async fn write_chart(&self, kind: &str, document: &Value) -> Result<()>;
}
