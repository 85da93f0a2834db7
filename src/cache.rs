use {
    std::{
        collections::HashMap,
        time::{Duration, Instant},
    },
    tokio::sync::RwLock,
};

struct Entry<V> {
    value: V,
    tags: Vec<String>,
    expires_at: Instant,
}

/// Read-through cache with a fixed time-to-live per entry. Entries carry
/// tags so a write can drop every view that depends on the data it changed.
pub struct TaggedCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TaggedCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: &str, value: V, tags: Vec<String>) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                tags,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop every entry carrying `tag`, returning how many were removed.
    pub async fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        before - entries.len()
    }
}
