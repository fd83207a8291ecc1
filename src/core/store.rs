//! In-memory artifact store.
//!
//! A single mutex guards the map. It is taken only around the map operation
//! itself; identifier generation happens before the lock is acquired.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Artifact, ArtifactId};

use super::id_generator::{IdGenerator, RandomIdGenerator};

/// Fresh identifiers tried before falling back to overwriting
pub const MAX_ID_ATTEMPTS: u32 = 4;

/// Store lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("artifact not found: {0}")]
    NotFound(ArtifactId),
}

/// Concurrency-safe mapping from identifier to rendered artifact
pub struct ArtifactStore {
    ids: Arc<dyn IdGenerator>,
    artifacts: Mutex<HashMap<ArtifactId, Artifact>>,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore {
    /// Create an empty store with random identifiers
    pub fn new() -> Self {
        Self::with_id_generator(RandomIdGenerator)
    }

    /// Create an empty store with a custom identifier source
    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            ids: Arc::new(ids),
            artifacts: Mutex::new(HashMap::new()),
        }
    }

    /// Store bytes under a fresh identifier and return it
    ///
    /// An identifier already in use is regenerated up to `MAX_ID_ATTEMPTS`
    /// times. Past that the identifier source is clearly not random and the
    /// last candidate overwrites the existing entry.
    pub fn put(&self, bytes: impl Into<Bytes>) -> ArtifactId {
        let artifact = Artifact::new(bytes);
        let size = artifact.size_bytes();
        let mut attempt = 1;

        loop {
            let id = self.ids.generate();
            let force = attempt >= MAX_ID_ATTEMPTS;

            let previous = {
                let mut artifacts = self.artifacts.lock();
                if force || !artifacts.contains_key(&id) {
                    Some(artifacts.insert(id.clone(), artifact.clone()))
                } else {
                    None
                }
            };

            match previous {
                Some(None) => {
                    debug!(%id, size, "Stored artifact");
                    return id;
                }
                Some(Some(_)) => {
                    warn!(%id, attempt, "Identifier collision persisted, overwrote entry");
                    return id;
                }
                None => {
                    warn!(%id, attempt, "Identifier collision, regenerating");
                    attempt += 1;
                }
            }
        }
    }

    /// Look up an artifact by identifier
    pub fn get(&self, id: &ArtifactId) -> Result<Artifact, StoreError> {
        self.artifacts
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Whether an identifier is present
    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.artifacts.lock().contains_key(id)
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.artifacts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id_generator::SequentialIdGenerator;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Replays a fixed list of identifiers, then repeats the last one
    struct ScriptedIds {
        ids: Vec<ArtifactId>,
        next: AtomicUsize,
    }

    impl ScriptedIds {
        fn new(ids: &[&str]) -> Self {
            Self {
                ids: ids.iter().map(|s| ArtifactId::parse(s).unwrap()).collect(),
                next: AtomicUsize::new(0),
            }
        }
    }

    impl IdGenerator for ScriptedIds {
        fn generate(&self) -> ArtifactId {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            self.ids[n.min(self.ids.len() - 1)].clone()
        }
    }

    const ID_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const ID_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn test_put_then_get() {
        let store = ArtifactStore::new();
        let id = store.put(&b"<svg/>"[..]);

        let artifact = store.get(&id).unwrap();
        assert_eq!(artifact.bytes().as_ref(), b"<svg/>");
        assert_eq!(store.len(), 1);
        assert!(store.contains(&id));
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let store = ArtifactStore::new();
        let id = ArtifactId::parse(ID_A).unwrap();

        assert_eq!(store.get(&id), Err(StoreError::NotFound(id.clone())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_same_bytes_get_distinct_ids() {
        let store = ArtifactStore::new();
        let first = store.put(&b"same"[..]);
        let second = store.put(&b"same"[..]);

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_collision_is_regenerated() {
        let store = ArtifactStore::with_id_generator(ScriptedIds::new(&[ID_A, ID_A, ID_B]));

        let first = store.put(&b"one"[..]);
        let second = store.put(&b"two"[..]);

        assert_eq!(first.as_str(), ID_A);
        assert_eq!(second.as_str(), ID_B);
        assert_eq!(store.get(&first).unwrap().bytes().as_ref(), b"one");
        assert_eq!(store.get(&second).unwrap().bytes().as_ref(), b"two");
    }

    #[test]
    fn test_persistent_collision_overwrites() {
        let store = ArtifactStore::with_id_generator(ScriptedIds::new(&[ID_A]));

        let first = store.put(&b"one"[..]);
        let second = store.put(&b"two"[..]);

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&first).unwrap().bytes().as_ref(), b"two");
    }

    #[test]
    fn test_concurrent_puts_and_gets() {
        let store = Arc::new(ArtifactStore::with_id_generator(SequentialIdGenerator::new()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..100)
                        .map(|i| {
                            let payload = format!("thread-{}-item-{}", t, i);
                            let id = store.put(payload.clone().into_bytes());
                            assert_eq!(store.get(&id).unwrap().bytes().as_ref(), payload.as_bytes());
                            (id, payload)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let written: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(store.len(), 800);
        for (id, payload) in written {
            assert_eq!(store.get(&id).unwrap().bytes().as_ref(), payload.as_bytes());
        }
    }
}
