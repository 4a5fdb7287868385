// Durable queue storage for offline actions
//
// The replay adapter only ever needs list/upsert/remove, so the store is an
// injected trait owned by the host application; tests run against the
// in-memory implementation.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::Result;
use crate::modules::offline::models::OfflineAction;

/// Durable local store of queued offline actions, keyed by action id
#[async_trait]
pub trait OfflineQueueStore: Send + Sync {
    /// All queued actions, oldest first
    async fn list(&self) -> Result<Vec<OfflineAction>>;

    /// Insert or replace one action
    async fn upsert(&self, action: &OfflineAction) -> Result<()>;

    /// Remove one action; removing an absent id is not an error
    async fn remove(&self, action_id: &str) -> Result<()>;
}

fn sorted_oldest_first(actions: &HashMap<String, OfflineAction>) -> Vec<OfflineAction> {
    let mut list: Vec<OfflineAction> = actions.values().cloned().collect();
    list.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
    list
}

/// In-memory queue store for tests and embedding
#[derive(Default)]
pub struct MemoryQueueStore {
    actions: Mutex<HashMap<String, OfflineAction>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OfflineQueueStore for MemoryQueueStore {
    async fn list(&self) -> Result<Vec<OfflineAction>> {
        let actions = self.actions.lock().await;
        Ok(sorted_oldest_first(&actions))
    }

    async fn upsert(&self, action: &OfflineAction) -> Result<()> {
        let mut actions = self.actions.lock().await;
        actions.insert(action.id.clone(), action.clone());
        Ok(())
    }

    async fn remove(&self, action_id: &str) -> Result<()> {
        let mut actions = self.actions.lock().await;
        actions.remove(action_id);
        Ok(())
    }
}

/// JSON-file-backed queue store
///
/// The whole queue is kept as one JSON document keyed by action id and
/// rewritten on every mutation.
pub struct JsonFileQueueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles against the file.
    lock: Mutex<()>,
}

impl JsonFileQueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, OfflineAction>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, actions: &HashMap<String, OfflineAction>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(actions)?;
        tokio::fs::write(&self.path, bytes).await?;

        debug!(path = %self.path.display(), entries = actions.len(), "Offline queue saved");

        Ok(())
    }
}

#[async_trait]
impl OfflineQueueStore for JsonFileQueueStore {
    async fn list(&self) -> Result<Vec<OfflineAction>> {
        let _guard = self.lock.lock().await;
        let actions = self.load().await?;
        Ok(sorted_oldest_first(&actions))
    }

    async fn upsert(&self, action: &OfflineAction) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut actions = self.load().await?;
        actions.insert(action.id.clone(), action.clone());
        self.save(&actions).await
    }

    async fn remove(&self, action_id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut actions = self.load().await?;
        if actions.remove(action_id).is_some() {
            self.save(&actions).await?;
        }
        Ok(())
    }
}
