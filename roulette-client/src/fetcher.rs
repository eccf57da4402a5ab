//! Paginated definition fetching.

use crate::api::{ListFeaturesRequest, RouletteApi};
use crate::error::Result;
use roulette_features::{Feature, GroupCatalog};
use roulette_log::{Level, debug, event};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Features loaded by one complete fetch pass.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Features that loaded successfully, in page order
    pub features: Vec<Feature>,

    /// Definitions rejected at load
    pub rejected: usize,

    /// Pages requested, including the terminating one
    pub pages: usize,

    /// Cursor the next pass starts from once this one is committed
    pub cursor: String,
}

/// Pages through the definitions API from the last persisted cursor.
///
/// Fetches are serialized; the cursor only advances after a pass completes
/// and its consumer accepts it.
pub struct Fetcher {
    api: Arc<dyn RouletteApi>,
    cursor: Mutex<String>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn RouletteApi>) -> Self {
        Self {
            api,
            cursor: Mutex::new(String::new()),
        }
    }

    /// The cursor the next pass will start from.
    pub async fn cursor(&self) -> String {
        self.cursor.lock().await.clone()
    }

    /// Run one pass and persist its cursor unconditionally.
    pub async fn fetch(&self) -> Result<FetchOutcome> {
        self.fetch_with(Ok).await
    }

    /// Run one pass and hand it to `apply`; the cursor advances only if
    /// `apply` succeeds.
    ///
    /// Stops when the service echoes the cursor back or returns an empty
    /// page. Malformed features are logged and skipped. A transport error or
    /// a rejected pass leaves the cursor where it was, so the same
    /// definitions are fetched again next time.
    pub async fn fetch_with<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(FetchOutcome) -> Result<T>,
    {
        let mut persisted = self.cursor.lock().await;
        let mut cursor = persisted.clone();
        let mut groups = GroupCatalog::new();
        let mut outcome = FetchOutcome::default();

        loop {
            let page = self
                .api
                .list_features(ListFeaturesRequest::new(cursor.clone()))
                .await?;
            outcome.pages += 1;

            if page.cursor == cursor {
                break;
            }
            cursor = page.cursor;

            if page.features.is_empty() {
                break;
            }

            groups.extend_from_definitions(&page.groups);

            for raw in page.features {
                let name = raw
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("<unnamed>")
                    .to_string();

                match Feature::from_value(raw, &groups) {
                    Ok(feature) => outcome.features.push(feature),
                    Err(err) => {
                        event!(Level::Warn, "Rejected feature definition";
                            feature = name,
                            reason = err,
                        );
                        outcome.rejected += 1;
                    }
                }
            }
        }

        debug!(
            "Fetch pass complete: {} features, {} rejected, {} pages",
            outcome.features.len(),
            outcome.rejected,
            outcome.pages
        );

        outcome.cursor = cursor.clone();
        let applied = apply(outcome)?;
        *persisted = cursor;
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ListFeaturesResponse;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use roulette_features::{FeatureSet, GroupDefinition, to_input};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// Serves fixed pages keyed by request cursor; unknown cursors echo back.
    #[derive(Default)]
    struct PagedApi {
        pages: HashMap<String, ListFeaturesResponse>,
        fail_at: Option<String>,
        requests: StdMutex<Vec<String>>,
    }

    impl PagedApi {
        fn page(mut self, at: &str, next: &str, features: Vec<Value>, groups: Vec<GroupDefinition>) -> Self {
            self.pages.insert(
                at.to_string(),
                ListFeaturesResponse {
                    cursor: next.to_string(),
                    features,
                    groups,
                },
            );
            self
        }
    }

    #[async_trait]
    impl RouletteApi for PagedApi {
        async fn list_features(&self, request: ListFeaturesRequest) -> Result<ListFeaturesResponse> {
            self.requests.lock().unwrap().push(request.cursor.clone());
            if self.fail_at.as_deref() == Some(request.cursor.as_str()) {
                return Err(ClientError::Response {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self
                .pages
                .get(&request.cursor)
                .cloned()
                .unwrap_or(ListFeaturesResponse {
                    cursor: request.cursor,
                    ..Default::default()
                }))
        }
    }

    fn feature(n: u8, name: &str) -> Value {
        json!({
            "id": format!("00000000-0000-4000-8000-0000000000{:02x}", n),
            "name": name,
            "partition_key": "user_id",
            "enabled": true,
            "variants": [{"name": "off", "is_default": true}, {"name": "on"}],
            "rulesets": [{
                "name": "staff",
                "enabled": true,
                "exposure_percentage": 1.0,
                "rules": [{"path": "user_id", "criteria": [{"group": {"group_id": "staff"}}]}],
                "variant_weights": [{"variant": "on", "weight": 1}]
            }],
            "hash_spec": {"method": "weighted_rendezvous"}
        })
    }

    fn group(values: &[&str]) -> GroupDefinition {
        GroupDefinition {
            id: "staff".to_string(),
            version: 1,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_paginates_until_cursor_repeats() {
        let api = PagedApi::default()
            .page("", "c1", vec![feature(1, "a")], vec![group(&["u-1"])])
            .page("c1", "c2", vec![feature(2, "b")], vec![]);
        let api = Arc::new(api);
        let fetcher = Fetcher::new(api.clone());

        let outcome = fetcher.fetch().await.unwrap();
        assert_eq!(outcome.features.len(), 2);
        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.cursor, "c2");
        assert_eq!(fetcher.cursor().await, "c2");
        assert_eq!(*api.requests.lock().unwrap(), vec!["", "c1", "c2"]);

        let again = fetcher.fetch().await.unwrap();
        assert!(again.features.is_empty());
        assert_eq!(again.pages, 1);
    }

    #[tokio::test]
    async fn test_empty_page_ends_pass() {
        let api = PagedApi::default()
            .page("", "c1", vec![feature(1, "a")], vec![group(&[])])
            .page("c1", "c2", vec![], vec![])
            .page("c2", "c3", vec![feature(2, "b")], vec![]);
        let fetcher = Fetcher::new(Arc::new(api));

        let outcome = fetcher.fetch().await.unwrap();
        assert_eq!(outcome.features.len(), 1);
        assert_eq!(outcome.cursor, "c2");
    }

    #[tokio::test]
    async fn test_skips_rejected_features() {
        let mut broken = feature(2, "broken");
        broken["id"] = json!("not-a-uuid");
        let api = PagedApi::default().page(
            "",
            "c1",
            vec![feature(1, "a"), broken, json!({"name": "garbage"})],
            vec![group(&[])],
        );
        let fetcher = Fetcher::new(Arc::new(api));

        let outcome = fetcher.fetch().await.unwrap();
        assert_eq!(outcome.features.len(), 1);
        assert_eq!(outcome.features[0].name(), "a");
        assert_eq!(outcome.rejected, 2);
    }

    #[tokio::test]
    async fn test_first_group_definition_wins() {
        let api = PagedApi::default()
            .page("", "c1", vec![feature(1, "a")], vec![group(&["u-1"])])
            .page("c1", "c2", vec![feature(2, "b")], vec![group(&["u-2"])]);
        let fetcher = Fetcher::new(Arc::new(api));

        let set = FeatureSet::from_features(1, fetcher.fetch().await.unwrap().features);
        let u1 = to_input(json!({"user_id": "u-1"})).unwrap();
        let u2 = to_input(json!({"user_id": "u-2"})).unwrap();
        assert!(set.evaluate("b", u1).unwrap().is_matched());
        assert!(!set.evaluate("b", u2).unwrap().is_matched());
    }

    #[tokio::test]
    async fn test_failed_pass_keeps_cursor() {
        let mut api = PagedApi::default()
            .page("", "c1", vec![feature(1, "a")], vec![group(&[])])
            .page("c1", "c2", vec![feature(2, "b")], vec![]);
        api.fail_at = Some("c1".to_string());
        let fetcher = Fetcher::new(Arc::new(api));

        assert!(fetcher.fetch().await.is_err());
        assert_eq!(fetcher.cursor().await, "");
    }

    #[tokio::test]
    async fn test_rejected_pass_keeps_cursor() {
        let api = PagedApi::default().page("", "c1", vec![feature(1, "a")], vec![group(&[])]);
        let api = Arc::new(api);
        let fetcher = Fetcher::new(api.clone());

        let rejected: Result<()> = fetcher
            .fetch_with(|outcome| {
                assert_eq!(outcome.features.len(), 1);
                Err(ClientError::Decode("rejected".to_string()))
            })
            .await;
        assert!(rejected.is_err());
        assert_eq!(fetcher.cursor().await, "");

        let names = fetcher
            .fetch_with(|outcome| Ok(outcome.features.iter().map(|f| f.name().to_string()).collect::<Vec<_>>()))
            .await
            .unwrap();
        assert_eq!(names, vec!["a"]);
        assert_eq!(fetcher.cursor().await, "c1");
        assert_eq!(*api.requests.lock().unwrap(), vec!["", "c1", "", "c1"]);
    }
}
