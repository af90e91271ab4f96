use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{StoragePath, TaskId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoredFileId(Uuid);

impl StoredFileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StoredFileId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Original,
    Result,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Original => "original",
            FileKind::Result => "result",
        }
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(FileKind::Original),
            "result" => Ok(FileKind::Result),
            _ => Err(format!("Invalid file kind: {}", s)),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-once record of a persisted blob.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub id: StoredFileId,
    pub user_id: UserId,
    pub task_id: Option<TaskId>,
    pub kind: FileKind,
    pub original_name: String,
    pub stored_name: String,
    pub path: StoragePath,
    pub size_bytes: u64,
    pub mime_type: String,
    pub storage_backend: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        task_id: Option<TaskId>,
        kind: FileKind,
        original_name: String,
        path: StoragePath,
        size_bytes: u64,
        mime_type: &str,
        storage_backend: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: StoredFileId::new(),
            user_id,
            task_id,
            kind,
            original_name,
            stored_name: path.file_name().to_string(),
            path,
            size_bytes,
            mime_type: mime_type.to_string(),
            storage_backend: storage_backend.to_string(),
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}
