use {
    crate::{
        cache::TaggedCache,
        error::SubmitError,
        guests::GuestResolver,
        model::{Wish, WishParams},
        schema,
        store::{Fields, RecordStore},
    },
    log::{error, info},
    serde_json::Value,
    std::{sync::Arc, time::Duration},
};

static WISHES_KEY: &str = "wishes";
static WISHES_TAG: &str = "wishes";

/// The guestbook: one wish per guest, listed newest first.
#[derive(Clone)]
pub struct WishBook {
    cache: Arc<TaggedCache<Vec<Wish>>>,
}

impl WishBook {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(TaggedCache::new(ttl)),
        }
    }

    /// Every non-empty wish. An unreachable store yields an empty list.
    pub async fn list(&self, store: &dyn RecordStore) -> Vec<Wish> {
        if let Some(wishes) = self.cache.get(WISHES_KEY).await {
            return wishes;
        }
        match store.list_wishes().await {
            Ok(records) => {
                let wishes: Vec<Wish> = records
                    .iter()
                    .map(Wish::from)
                    .filter(|wish| !wish.message.is_empty())
                    .collect();
                self.cache
                    .insert(WISHES_KEY, wishes.clone(), vec![WISHES_TAG.to_string()])
                    .await;
                wishes
            }
            Err(error) => {
                error!("Error fetching wishes: {}", error);
                vec![]
            }
        }
    }

    /// Overwrite the wish of `params.record_id`, then drop the cached list and
    /// the guest's cached profile so both show the new text.
    pub async fn submit(
        &self,
        store: &dyn RecordStore,
        guests: &GuestResolver,
        params: &WishParams,
    ) -> Result<(), SubmitError> {
        let record_id = params.record_id.trim();
        if record_id.is_empty() {
            return Err(SubmitError::Validation("Missing Record ID".to_string()));
        }
        if !schema::is_record_id(record_id) {
            return Err(SubmitError::Validation("Invalid Record ID".to_string()));
        }
        let wish = params.wish.trim();
        if wish.is_empty() {
            return Err(SubmitError::Validation("Wish cannot be empty".to_string()));
        }

        let mut fields = Fields::new();
        fields.insert(schema::WISH.to_string(), Value::String(wish.to_string()));
        if let Err(error) = store.update(record_id, fields).await {
            error!("Wish update failed for {}: {}", record_id, error);
            return Err(error.into());
        }
        info!("New wish from {}", record_id);
        self.cache.invalidate_tag(WISHES_TAG).await;
        guests.invalidate(record_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::store::test_store};

    fn params(record_id: &str, wish: &str) -> WishParams {
        WishParams {
            record_id: record_id.to_string(),
            wish: wish.to_string(),
        }
    }

    #[actix_rt::test]
    async fn resubmission_replaces() {
        let store = test_store();
        let guests = GuestResolver::new(Duration::from_secs(60));
        let book = WishBook::new(Duration::from_secs(60));
        assert_eq!(book.list(&store).await.len(), 1);

        book.submit(&store, &guests, &params("rec001", "Congratulations!"))
            .await
            .unwrap();
        book.submit(&store, &guests, &params("rec001", "Congratulations, you two!"))
            .await
            .unwrap();

        let wishes = book.list(&store).await;
        let mine: Vec<_> = wishes.iter().filter(|w| w.name == "Andrew & Kim").collect();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].message, "Congratulations, you two!");
        assert_eq!(wishes.len(), 2);
        assert_eq!(wishes[0].name, "Andrew & Kim");
    }

    #[actix_rt::test]
    async fn list_is_cached() {
        let store = test_store();
        let book = WishBook::new(Duration::from_secs(60));
        book.list(&store).await;
        book.list(&store).await;
        assert_eq!(store.calls(), 1);
    }

    #[actix_rt::test]
    async fn rejects_before_store() {
        let store = test_store();
        let guests = GuestResolver::new(Duration::from_secs(60));
        let book = WishBook::new(Duration::from_secs(60));
        assert!(matches!(
            book.submit(&store, &guests, &params("", "Hi")).await,
            Err(SubmitError::Validation(_))
        ));
        assert!(matches!(
            book.submit(&store, &guests, &params("rec001", "   ")).await,
            Err(SubmitError::Validation(_))
        ));
        assert!(matches!(
            book.submit(&store, &guests, &params("../../meta/bases?x=", "Hi")).await,
            Err(SubmitError::Validation(_))
        ));
        assert_eq!(store.calls(), 0);
    }

    #[actix_rt::test]
    async fn unknown_record_is_upstream_failure() {
        let store = test_store();
        let guests = GuestResolver::new(Duration::from_secs(60));
        let book = WishBook::new(Duration::from_secs(60));
        assert!(matches!(
            book.submit(&store, &guests, &params("rec999", "Hi")).await,
            Err(SubmitError::Upstream(_))
        ));
    }
}
