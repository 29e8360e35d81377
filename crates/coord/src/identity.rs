//! Worker identity persistence (spec §4.7, §6): a stable UUID read from a
//! config file at the platform's user-config directory, created on first
//! run.

use std::path::PathBuf;

use directories::ProjectDirs;
use mwmbl_core::CrawlError;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct IdentityFile {
    user_id: String,
}

/// Read the persisted worker identity, generating and persisting a fresh
/// UUIDv4 the first time the worker runs on this machine.
pub fn load_or_create_worker_id() -> Result<String, CrawlError> {
    let path = config_path()?;

    if let Ok(contents) = std::fs::read_to_string(&path) {
        if let Ok(parsed) = serde_json::from_str::<IdentityFile>(&contents) {
            return Ok(parsed.user_id);
        }
    }

    let user_id = Uuid::new_v4().to_string();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CrawlError::Config(format!("failed to create config dir: {e}")))?;
    }
    let contents = serde_json::to_string(&IdentityFile {
        user_id: user_id.clone(),
    })
    .map_err(|e| CrawlError::Config(e.to_string()))?;
    std::fs::write(&path, contents).map_err(|e| CrawlError::Config(format!("failed to write config: {e}")))?;

    info!(path = %path.display(), "generated new worker identity");
    Ok(user_id)
}

fn config_path() -> Result<PathBuf, CrawlError> {
    let dirs = ProjectDirs::from("org", "mwmbl", "mwmbl")
        .ok_or_else(|| CrawlError::Config("could not determine config directory".into()))?;
    Ok(dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_file_round_trips() {
        let original = IdentityFile {
            user_id: Uuid::new_v4().to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let parsed: IdentityFile = serde_json::from_str(&json).unwrap();
        assert_eq!(original.user_id, parsed.user_id);
    }
}
