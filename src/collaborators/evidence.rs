//! Photo evidence storage.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::EvidenceRef;

/// A photo attached to a check-in or check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceUpload {
    /// Original client-side file name; its extension decides the format.
    pub file_name: String,
    /// MIME type reported by the client.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl EvidenceUpload {
    /// Creates an upload from a file name and its bytes.
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data,
        }
    }

    /// Size of the upload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lower-case extension including the leading dot, e.g. `.jpg`.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_lowercase()))
    }
}

/// Persists validated evidence and hands back a reference to it.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Stores `upload` under (or near) `suggested_name`.
    async fn save(&self, suggested_name: &str, upload: &EvidenceUpload)
    -> EngineResult<EvidenceRef>;
}

/// Keeps evidence in memory, keyed by its public path.
#[derive(Debug, Default)]
pub struct InMemoryEvidenceStore {
    files: DashMap<String, Vec<u8>>,
}

impl InMemoryEvidenceStore {
    /// Public path prefix of stored attendance photos.
    pub const PREFIX: &'static str = "/uploads/attendance";

    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the bytes stored under `reference`.
    pub fn get(&self, reference: &EvidenceRef) -> Option<Vec<u8>> {
        self.files.get(&reference.0).map(|f| f.value().clone())
    }
}

#[async_trait]
impl EvidenceStore for InMemoryEvidenceStore {
    async fn save(
        &self,
        suggested_name: &str,
        upload: &EvidenceUpload,
    ) -> EngineResult<EvidenceRef> {
        let path = format!("{}/{}", Self::PREFIX, suggested_name);
        self.files.insert(path.clone(), upload.data.clone());
        Ok(EvidenceRef(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(
            EvidenceUpload::new("selfie.JPG", vec![1]).extension().as_deref(),
            Some(".jpg")
        );
        assert_eq!(
            EvidenceUpload::new("archive.tar.png", vec![1]).extension().as_deref(),
            Some(".png")
        );
        assert_eq!(EvidenceUpload::new("noext", vec![1]).extension(), None);
        assert_eq!(EvidenceUpload::new("dot.", vec![1]).extension(), None);
    }

    #[tokio::test]
    async fn test_in_memory_store_returns_public_path() {
        let store = InMemoryEvidenceStore::new();
        let upload = EvidenceUpload::new("a.png", vec![1, 2, 3]);

        let reference = store.save("5_20240603_081500_checkin.png", &upload).await.unwrap();

        assert_eq!(
            reference.0,
            "/uploads/attendance/5_20240603_081500_checkin.png"
        );
        assert_eq!(store.get(&reference), Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);
    }
}
