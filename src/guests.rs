use {
    crate::{cache::TaggedCache, model::Guest, store::RecordStore},
    log::{error, info},
    std::{sync::Arc, time::Duration},
};

/// Cache tag carried by every view built from `record_id`.
pub fn record_tag(record_id: &str) -> String {
    format!("record:{}", record_id)
}

static MISSING_TAG: &str = "guests:missing";

/// Resolves invitation codes to guests, caching both hits and misses.
#[derive(Clone)]
pub struct GuestResolver {
    cache: Arc<TaggedCache<Option<Guest>>>,
}

impl GuestResolver {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(TaggedCache::new(ttl)),
        }
    }

    /// `None` when no guest has `code`, and also when the store can't be
    /// reached; the page then renders without guest-specific sections.
    pub async fn resolve(&self, store: &dyn RecordStore, code: &str) -> Option<Guest> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let key = format!("code:{}", code);
        if let Some(guest) = self.cache.get(&key).await {
            return guest;
        }
        match store.find_by_code(code).await {
            Ok(record) => {
                let guest = record.as_ref().map(Guest::from);
                let tag = match &guest {
                    Some(guest) => record_tag(&guest.record_id),
                    None => MISSING_TAG.to_string(),
                };
                info!(
                    "Resolved code {}: {}",
                    code,
                    guest.as_ref().map_or("not found", |g| g.record_id.as_str())
                );
                self.cache.insert(&key, guest.clone(), vec![tag]).await;
                guest
            }
            Err(error) => {
                error!("Error fetching guest {}: {}", code, error);
                None
            }
        }
    }

    /// Drop cached lookups of the guest stored as `record_id`.
    pub async fn invalidate(&self, record_id: &str) {
        self.cache.invalidate_tag(&record_tag(record_id)).await;
    }
}
