use crate::domain::contract::RawSnapshot;
use crate::source::SnapshotSource;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl SnapshotSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn fetch_raw(&self) -> Result<RawSnapshot> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read snapshot file {}", self.path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("snapshot file {} is not valid JSON", self.path.display()))
    }
}
