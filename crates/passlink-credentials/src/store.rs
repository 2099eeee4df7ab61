//! Credential storage.
//!
//! The redemption path only reads; `insert` exists for the indexer route.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock as AsyncRwLock;

use crate::credential::Credential;
use crate::error::{CredentialError, CredentialResult};

/// Credential store trait.
///
/// Owner matching is case-insensitive.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// All credentials owned by `owner`.
    async fn credentials_by_owner(&self, owner: &str) -> CredentialResult<Vec<Credential>>;

    /// Add a credential.
    async fn insert(&self, credential: Credential) -> CredentialResult<()>;
}

/// In-memory credential store for testing and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<Vec<Credential>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Vec<Credential>) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }

    /// Wrap in an Arc for sharing.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn credentials_by_owner(&self, owner: &str) -> CredentialResult<Vec<Credential>> {
        let credentials = self
            .credentials
            .read()
            .map_err(|e| CredentialError::StorageError(format!("Failed to read credentials: {e}")))?;
        Ok(credentials
            .iter()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn insert(&self, credential: Credential) -> CredentialResult<()> {
        credential.validate()?;
        let mut credentials = self.credentials.write().map_err(|e| {
            CredentialError::StorageError(format!("Failed to write credentials: {e}"))
        })?;
        credentials.push(credential);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialDb {
    #[serde(default)]
    credentials: Vec<Credential>,
}

/// Credential store persisted as a single JSON document.
///
/// The file holds `{ "credentials": [...] }` and is created on first use.
/// Reads share the lock; inserts and file creation take it exclusively.
/// Writes go through a temporary file and a rename, so readers never see a
/// partially written document.
#[derive(Debug)]
pub struct JsonFileCredentialStore {
    path: PathBuf,
    lock: AsyncRwLock<()>,
}

impl JsonFileCredentialStore {
    /// Open the store at `path`. Nothing is touched until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: AsyncRwLock::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, or `None` if the file does not exist yet.
    async fn read_db(&self) -> CredentialResult<Option<CredentialDb>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| CredentialError::SerializationError(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CredentialError::StorageError(e.to_string())),
        }
    }

    /// Read the document, creating an empty one if missing. Callers hold the
    /// write guard.
    async fn load_or_create(&self) -> CredentialResult<CredentialDb> {
        if let Some(db) = self.read_db().await? {
            return Ok(db);
        }
        let db = CredentialDb::default();
        self.save(&db).await?;
        tracing::info!(path = %self.path.display(), "Created credential database");
        Ok(db)
    }

    async fn save(&self, db: &CredentialDb) -> CredentialResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialError::StorageError(e.to_string()))?;
        }

        let json = serde_json::to_vec_pretty(db)
            .map_err(|e| CredentialError::SerializationError(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| CredentialError::StorageError(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CredentialError::StorageError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl CredentialStore for JsonFileCredentialStore {
    async fn credentials_by_owner(&self, owner: &str) -> CredentialResult<Vec<Credential>> {
        let existing = {
            let _guard = self.lock.read().await;
            self.read_db().await?
        };
        let db = match existing {
            Some(db) => db,
            None => {
                let _guard = self.lock.write().await;
                self.load_or_create().await?
            },
        };
        Ok(db
            .credentials
            .into_iter()
            .filter(|c| c.is_owned_by(owner))
            .collect())
    }

    async fn insert(&self, credential: Credential) -> CredentialResult<()> {
        credential.validate()?;
        let _guard = self.lock.write().await;
        let mut db = self.load_or_create().await?;
        tracing::debug!(id = %credential.id, owner = %credential.student_address, "Indexing credential");
        db.credentials.push(credential);
        self.save(&db).await
    }
}
