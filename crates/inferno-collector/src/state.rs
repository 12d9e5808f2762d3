use crate::error::{Error, Result};
use crate::types::CollectorDoc;
use std::path::{Path, PathBuf};

/// Shared state: just the directory the collector's document lives in.
/// Re-read on every request so `/collect` always reflects whatever last
/// wrote the file, the same way a real collector re-scans its live source.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_path: PathBuf,
}

impl AppState {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self { data_path: data_path.into() }
    }

    pub fn load(&self) -> Result<CollectorDoc> {
        load_doc(&self.data_path)
    }
}

/// Tries `variants.json` then `variants.yaml` under `dir`; an absent
/// directory is treated as an empty collector response (§9 supplement: zero
/// variants is not an error).
fn load_doc(dir: &Path) -> Result<CollectorDoc> {
    for name in ["variants.json", "variants.yaml", "variants.yml"] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|source| Error::Read { path: path.display().to_string(), source })?;
        return if name.ends_with(".json") {
            serde_json::from_str(&raw)
                .map_err(|e| Error::Parse { path: path.display().to_string(), reason: e.to_string() })
        } else {
            serde_yaml::from_str(&raw)
                .map_err(|e| Error::Parse { path: path.display().to_string(), reason: e.to_string() })
        };
    }
    Ok(CollectorDoc::default())
}
