//! In-memory artifact storage scoped by session

use dashmap::DashMap;
use std::collections::HashMap;

/// A named binary object produced by a side-effecting tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Artifact {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Session-scoped blob store. Names are unique per session; saving under an
/// existing name overwrites. A concurrent load during a save sees either the
/// old or the new artifact, never a partial write (DashMap shard locking).
#[derive(Default)]
pub struct ArtifactStore {
    sessions: DashMap<String, HashMap<String, Artifact>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save an artifact under `name` for the given session. Last write wins.
    pub fn save(&self, session_id: &str, name: &str, bytes: Vec<u8>, mime_type: &str) {
        let artifact = Artifact::new(bytes, mime_type);
        log::debug!(
            "[ARTIFACTS] save session={} name={} bytes={} mime={}",
            session_id,
            name,
            artifact.len(),
            artifact.mime_type
        );
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(name.to_string(), artifact);
    }

    /// Load an artifact by name. Returns `None` when the session has never
    /// saved anything under that name.
    pub fn load(&self, session_id: &str, name: &str) -> Option<Artifact> {
        self.sessions
            .get(session_id)
            .and_then(|blobs| blobs.get(name).cloned())
    }

    /// List artifact names for a session, sorted for deterministic output.
    pub fn list(&self, session_id: &str) -> Vec<String> {
        self.sessions
            .get(session_id)
            .map(|blobs| {
                let mut names: Vec<String> = blobs.keys().cloned().collect();
                names.sort();
                names
            })
            .unwrap_or_default()
    }

    /// Drop every artifact belonging to a session.
    pub fn delete_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}
