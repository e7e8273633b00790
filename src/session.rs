//! Signed-in operator session, persisted between console invocations.

use crate::api::{ApiClient, OperatorRole};
use crate::fs::{FileSystemOperations, StandardFileSystem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub role: OperatorRole,
    pub signed_in_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn new(token: String, email: String, role: OperatorRole) -> Self {
        Self {
            token,
            email,
            role,
            signed_in_at: chrono::Utc::now(),
        }
    }

    pub fn authorize(&self, client: ApiClient) -> ApiClient {
        client.with_token(self.token.clone())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not signed in. Run 'roastery login' first.")]
    NotSignedIn,
    #[error("Session file {path} is unreadable: {reason}")]
    Corrupt { path: String, reason: String },
    #[error("Session storage failed: {0}")]
    Storage(#[from] anyhow::Error),
}

pub struct SessionStore {
    path: String,
    fs_ops: Arc<dyn FileSystemOperations>,
}

impl SessionStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_fs(path, Arc::new(StandardFileSystem))
    }

    pub fn with_fs(path: impl Into<String>, fs_ops: Arc<dyn FileSystemOperations>) -> Self {
        Self {
            path: path.into(),
            fs_ops,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = Path::new(&self.path).parent() {
            let parent = parent.to_string_lossy();
            if !parent.is_empty() && !self.fs_ops.exists(&parent) {
                self.fs_ops.create_dir_all(&parent).await?;
            }
        }

        let contents = serde_json::to_vec_pretty(session).map_err(anyhow::Error::from)?;
        self.fs_ops.write(&self.path, &contents).await?;
        info!(path = %self.path, email = %session.email, "Session saved");
        Ok(())
    }

    /// Current session, if any.
    pub async fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.fs_ops.exists(&self.path) {
            debug!(path = %self.path, "No session file");
            return Ok(None);
        }

        let raw = self.fs_ops.read_to_string(&self.path).await?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SessionError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    pub async fn require(&self) -> Result<Session, SessionError> {
        self.load().await?.ok_or(SessionError::NotSignedIn)
    }

    pub async fn clear(&self) -> Result<(), SessionError> {
        self.fs_ops.remove_file(&self.path).await?;
        info!(path = %self.path, "Session cleared");
        Ok(())
    }
}
