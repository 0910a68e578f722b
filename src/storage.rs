// SPDX-License-Identifier: MIT

//! Device-local persistence for the session token pair.
//!
//! The mobile original keeps the session in platform key-value storage; here
//! it is a single JSON file. A missing, unreadable or corrupt file is
//! treated as "no persisted session" and logged, never surfaced as an error
//! on the load path.

use crate::error::{AppError, Result};
use crate::models::Session;
use std::path::{Path, PathBuf};

/// File-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the persisted session, if any.
    pub async fn load(&self) -> Option<Session> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Corrupt session file ignored");
                None
            }
        }
    }

    /// Persist the session, replacing any previous one.
    pub async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| AppError::Storage(format!("serialize session: {}", e)))?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {}", self.path.display(), e)))
    }

    /// Remove the persisted session. Removing an already-absent file is ok.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthUser;
    use chrono::Utc;

    fn make_session() -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now(),
            user: AuthUser {
                id: "user-1".to_string(),
                email: Some("a@b.c".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_save_load_clear_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));

        assert!(storage.load().await.is_none());

        let session = make_session();
        storage.save(&session).await.unwrap();
        assert_eq!(storage.load().await, Some(session));

        storage.clear().await.unwrap();
        assert!(storage.load().await.is_none());

        // Clearing twice is fine
        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let storage = SessionStorage::new(&path);
        assert!(storage.load().await.is_none());
    }
}
