use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::ProbeError;

/// Persistence collaborator for run artifacts.
///
/// Accepts byte blobs (screenshots) and JSON documents (results) and hands
/// back an opaque reference (path, URL or id) that ends up in results.
pub trait ArtifactStore {
    fn put_blob(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, ProbeError>;

    fn put_document(&self, key: &str, document: &Value) -> Result<String, ProbeError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_dir")]
    pub directory: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            directory: default_dir(),
        }
    }
}

fn default_dir() -> String { "artifacts".to_string() }

/// Hex SHA-1 of `bytes`, shortened to `len` characters.
pub fn short_digest(bytes: &[u8], len: usize) -> String {
    let hex = format!("{:x}", Sha1::digest(bytes));
    hex.chars().take(len).collect()
}

/// Writes artifacts under a root directory. Blob file names carry a content
/// digest, so identical captures of the same key share one file.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, relative: &str, bytes: &[u8]) -> Result<String, ProbeError> {
        let path = self.root.join(relative);
        let io_err = |source| ProbeError::Artifact {
            key: relative.to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&path, bytes).map_err(io_err)?;
        debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(path.display().to_string())
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put_blob(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String, ProbeError> {
        let ext = match content_type {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "application/json" => "json",
            _ => "bin",
        };
        let relative = format!("{}-{}.{}", key, short_digest(bytes, 12), ext);
        self.write(&relative, bytes)
    }

    fn put_document(&self, key: &str, document: &Value) -> Result<String, ProbeError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| ProbeError::JsonSerialize {
            context: format!("artifact document {}", key),
            source: e,
        })?;
        self.write(&format!("{}.json", key), &bytes)
    }
}

/// Keeps artifacts in memory; references are `mem://<key>`.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: RefCell<BTreeMap<String, Vec<u8>>>,
    documents: RefCell<BTreeMap<String, Value>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob(&self, reference: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(reference).cloned()
    }

    pub fn document(&self, reference: &str) -> Option<Value> {
        self.documents.borrow().get(reference).cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.borrow().len()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put_blob(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<String, ProbeError> {
        let reference = format!("mem://{}", key);
        self.blobs.borrow_mut().insert(reference.clone(), bytes.to_vec());
        Ok(reference)
    }

    fn put_document(&self, key: &str, document: &Value) -> Result<String, ProbeError> {
        let reference = format!("mem://{}", key);
        self.documents
            .borrow_mut()
            .insert(reference.clone(), document.clone());
        Ok(reference)
    }
}

/// Lowercase, filesystem-safe form of a test name.
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}
