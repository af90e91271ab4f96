use std::fmt;

use uuid::Uuid;

use super::{OutputFormat, TaskId};

/// Location of a blob relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    /// `uploads/{task_id}_{nonce}.{ext}`; the nonce keeps retried uploads apart.
    pub fn original(task_id: &TaskId, extension: &str) -> Self {
        let nonce = Uuid::new_v4();
        if extension.is_empty() {
            Self(format!("uploads/{}_{}", task_id.as_uuid(), nonce))
        } else {
            Self(format!("uploads/{}_{}.{}", task_id.as_uuid(), nonce, extension))
        }
    }

    /// `results/{task_id}_result.{format}`
    pub fn result(task_id: &TaskId, format: OutputFormat) -> Self {
        Self(format!("results/{}", Self::result_file_name(task_id, format)))
    }

    pub fn result_file_name(task_id: &TaskId, format: OutputFormat) -> String {
        format!("{}_result.{}", task_id.as_uuid(), format.as_str())
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
