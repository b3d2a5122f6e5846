//! Where snapshots come from. The engine never calls these; handlers load a
//! snapshot up front and pass borrowed slices into the scorers.

pub mod file;
pub mod http;

use crate::config::Settings;
use crate::domain::contract::{RawSnapshot, SnapshotReport};
use crate::domain::model::Snapshot;
use anyhow::Result;

pub use file::JsonFileSource;
pub use http::HttpJsonSource;

#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_raw(&self) -> Result<RawSnapshot>;

    async fn load(&self) -> Result<(Snapshot, SnapshotReport)> {
        let raw = self.fetch_raw().await?;
        let (snapshot, report) = raw.into_snapshot();
        tracing::info!(
            source = self.name(),
            users = snapshot.users.len(),
            items = snapshot.items.len(),
            instruments = snapshot.instruments.len(),
            dropped_users = report.dropped_users,
            dropped_items = report.dropped_items,
            dropped_instruments = report.dropped_instruments,
            "snapshot loaded"
        );
        Ok((snapshot, report))
    }
}

/// HTTP wins when both `SNAPSHOT_URL` and `SNAPSHOT_PATH` are set.
pub fn source_from_settings(settings: &Settings) -> Result<Box<dyn SnapshotSource>> {
    if settings.snapshot_url.is_some() {
        return Ok(Box::new(HttpJsonSource::from_settings(settings)?));
    }
    if let Some(path) = settings.snapshot_path.as_deref() {
        return Ok(Box::new(JsonFileSource::new(path)));
    }
    anyhow::bail!("either SNAPSHOT_URL or SNAPSHOT_PATH is required")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_http_over_file() {
        let settings = Settings {
            snapshot_path: Some("/tmp/snapshot.json".to_string()),
            snapshot_url: Some("http://localhost:9000".to_string()),
            ..Settings::default()
        };
        let source = source_from_settings(&settings).unwrap();
        assert_eq!(source.name(), "http_json");
    }

    #[test]
    fn falls_back_to_file_and_errors_when_unconfigured() {
        let settings = Settings {
            snapshot_path: Some("/tmp/snapshot.json".to_string()),
            ..Settings::default()
        };
        assert_eq!(source_from_settings(&settings).unwrap().name(), "json_file");
        assert!(source_from_settings(&Settings::default()).is_err());
    }
}
