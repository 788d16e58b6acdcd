use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::app::ports::ChartOutputPort;
use crate::error::Result;

/// Writes each chart to `<dir>/<kind>.json`
pub struct DirectoryChartOutput {
    dir: PathBuf,
}

impl DirectoryChartOutput {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("{}.json", kind))
    }
}

#[async_trait]
impl ChartOutputPort for DirectoryChartOutput {
    async fn write_chart(&self, kind: &str, document: &Value) -> Result<()> {
        let path = self.path_for(kind);
        write_pretty(&path, document).await?;
        info!(chart = kind, path = %path.display(), "Wrote chart");
        Ok(())
    }
}

/// Writes the chart to a single file, replacing earlier content
pub struct FileChartOutput {
    path: PathBuf,
}

impl FileChartOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ChartOutputPort for FileChartOutput {
    async fn write_chart(&self, kind: &str, document: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_pretty(&self.path, document).await?;
        info!(chart = kind, path = %self.path.display(), "Wrote chart");
        Ok(())
    }
}

/// Prints the chart as pretty JSON on stdout
pub struct StdoutChartOutput;

#[async_trait]
impl ChartOutputPort for StdoutChartOutput {
    async fn write_chart(&self, _kind: &str, document: &Value) -> Result<()> {
        let mut body = serde_json::to_vec_pretty(document)?;
        body.push(b'\n');
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&body).await?;
        stdout.flush().await?;
        Ok(())
    }
}

async fn write_pretty(path: &Path, document: &Value) -> Result<()> {
    let body = serde_json::to_vec_pretty(document)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_directory_output_names_files_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let output = DirectoryChartOutput::new(dir.path().join("charts")).unwrap();

        output
            .write_chart("tasks-sunburst", &json!({"name": "tasks_groups", "children": []}))
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("charts/tasks-sunburst.json")).unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["name"], "tasks_groups");
    }

    #[tokio::test]
    async fn test_file_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let output = FileChartOutput::new(&path);

        output.write_chart("normalized", &json!([])).await.unwrap();
        output.write_chart("normalized", &json!([1])).await.unwrap();

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, json!([1]));
    }
}
