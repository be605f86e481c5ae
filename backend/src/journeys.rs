use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared::Journey;

pub const JOURNEYS_FILE: &str = "journeys.json";

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("journey log io error: {0}")]
    Io(#[from] io::Error),
    #[error("journey log is not a JSON array: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Body accepted by `POST /journeys`.
#[derive(Debug, Deserialize)]
pub struct JourneyRequest {
    pub start: String,
    pub end: String,
    pub latitude: [f64; 2],
    pub longitude: [f64; 2],
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl JourneyRequest {
    pub fn into_journey(self) -> Journey {
        Journey {
            start: self.start,
            end: self.end,
            latitude: self.latitude,
            longitude: self.longitude,
            date: self.date.filter(|d| !d.is_empty()),
            timestamp: self
                .timestamp
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Append-only JSON array on disk. Every append rewrites the whole file, so
/// concurrent writers can lose records.
#[derive(Debug)]
pub struct JourneyLog {
    path: PathBuf,
}

impl JourneyLog {
    /// Opens `<data_dir>/journeys.json`, creating it as `[]` when missing.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, JournalError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(JOURNEYS_FILE);
        if !path.exists() {
            fs::write(&path, "[]")?;
            tracing::info!("created journey log at {}", path.display());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, journey: &Journey) -> Result<(), JournalError> {
        let mut records: Vec<serde_json::Value> = serde_json::from_str(&self.read_raw()?)?;
        records.push(serde_json::to_value(journey)?);
        fs::write(&self.path, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }

    pub fn read_raw(&self) -> Result<String, JournalError> {
        Ok(fs::read_to_string(&self.path)?)
    }
}
