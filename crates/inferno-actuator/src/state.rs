use crate::error::{Error, Result};
use crate::types::UpdateRequest;
use std::path::PathBuf;

/// Shared state: the directory the actuator records its last-applied
/// document into. A real actuator would instead call a Kubernetes API
/// (§1 Non-goals); this records the same shape to disk so `/update` is
/// independently testable.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_path: PathBuf,
}

impl AppState {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self { data_path: data_path.into() }
    }

    pub fn apply(&self, request: &UpdateRequest) -> Result<()> {
        std::fs::create_dir_all(&self.data_path).map_err(|source| Error::Write {
            path: self.data_path.display().to_string(),
            source,
        })?;
        let path = self.data_path.join("applied.json");
        let raw = serde_json::to_string_pretty(request).unwrap_or_default();
        std::fs::write(&path, raw)
            .map_err(|source| Error::Write { path: path.display().to_string(), source })
    }
}
