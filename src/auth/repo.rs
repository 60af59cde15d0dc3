use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::repo_types::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,
    #[error("users file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("users file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("users could not be serialized: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Users kept as one JSON array on disk, rewritten in full on every insert.
pub struct UserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserStore {
    /// Open the store and validate the current file, creating it if missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };
        let users = store.load().await?;
        info!(path = %store.path().display(), users = users.len(), "user store ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every user. A missing file is initialised with an empty array.
    pub async fn load(&self) -> Result<Vec<User>, StoreError> {
        if let Some(users) = self.read().await? {
            return Ok(users);
        }
        let _guard = self.write_lock.lock().await;
        // An insert may have created the file while we waited.
        if let Some(users) = self.read().await? {
            return Ok(users);
        }
        debug!(path = %self.path.display(), "users file missing; creating empty");
        self.write_all(&[]).await?;
        Ok(Vec::new())
    }

    /// Replace the whole collection.
    pub async fn save(&self, users: &[User]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_all(users).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.load().await?.into_iter().find(|u| u.has_email(email)))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.load().await?.into_iter().find(|u| u.id == id))
    }

    /// Append `user` unless its email is already taken. Check and write happen
    /// under one lock so concurrent registrations cannot both succeed.
    pub async fn insert(&self, user: User) -> Result<User, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.read().await?.unwrap_or_default();
        if users.iter().any(|u| u.has_email(&user.email)) {
            return Err(StoreError::EmailTaken);
        }
        users.push(user.clone());
        self.write_all(&users).await?;
        Ok(user)
    }

    /// `None` when the file does not exist.
    async fn read(&self) -> Result<Option<Vec<User>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(
                serde_json::from_slice(&bytes).map_err(StoreError::Corrupt)?,
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a uniquely named sibling temp file, then rename it over the target.
    /// Callers must hold `write_lock`.
    async fn write_all(&self, users: &[User]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let body = serde_json::to_vec_pretty(users).map_err(StoreError::Encode)?;
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = tokio::fs::write(&tmp, body).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), users = users.len(), "users file written");
        Ok(())
    }
}
