use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::future::Future;

use crate::db::CacheStore;

const DIGEST_LEN: usize = 16;

/// Build `landing:{version}:{prefix}:{digest}` for a parameter payload.
///
/// The digest covers the canonical JSON of `payload`: object keys are sorted,
/// so two payloads with the same content hash identically whatever order they
/// were built in. Bump `version` whenever the shape of a cached value changes.
pub fn cache_key(prefix: &str, payload: &Value, version: &str) -> String {
    let canonical = canonical_json(payload);
    let digest = format!("{:x}", Sha256::digest(canonical.as_bytes()));
    format!("landing:{}:{}:{}", version, prefix, &digest[..DIGEST_LEN])
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", Value::String(k.clone()), canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

/// Return the cached value for `(prefix, payload)` or compute and store it.
///
/// The boolean is `true` when the value came from the store. Errors from
/// `compute` propagate untouched and nothing is stored. Store failures only
/// cost a recomputation.
pub async fn cache_get_or_set<T, E, F, Fut>(
    store: &dyn CacheStore,
    prefix: &str,
    payload: &Value,
    ttl_seconds: u64,
    version: &str,
    compute: F,
) -> Result<(T, bool), E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let key = cache_key(prefix, payload, version);

    match store.get(&key).await {
        Ok(Some(existing)) => match serde_json::from_value::<T>(existing) {
            Ok(value) => {
                log::debug!("Cache hit for {}", key);
                return Ok((value, true));
            }
            Err(e) => log::warn!("Discarding unreadable cache entry {}: {}", key, e),
        },
        Ok(None) => {}
        Err(e) => log::warn!("Cache read failed for {}: {}", key, e),
    }

    let value = compute().await?;

    match serde_json::to_value(&value) {
        Ok(raw) => {
            if let Err(e) = store.set(&key, &raw, ttl_seconds).await {
                log::warn!("Cache write failed for {}: {}", key, e);
            }
        }
        Err(e) => log::warn!("Could not serialize value for {}: {}", key, e),
    }

    Ok((value, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCacheStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_key_ignores_insertion_order() {
        let mut a = serde_json::Map::new();
        a.insert("q".to_string(), json!("paris"));
        a.insert("limit".to_string(), json!(8));
        let mut b = serde_json::Map::new();
        b.insert("limit".to_string(), json!(8));
        b.insert("q".to_string(), json!("paris"));

        let key_a = cache_key("destinations", &Value::Object(a), "v2");
        let key_b = cache_key("destinations", &Value::Object(b), "v2");
        assert_eq!(key_a, key_b);
        assert!(key_a.starts_with("landing:v2:destinations:"));
        assert_eq!(key_a.len(), "landing:v2:destinations:".len() + 16);
    }

    #[test]
    fn test_key_changes_with_version_and_content() {
        let payload = json!({"q": "paris"});
        assert_ne!(
            cache_key("banner", &payload, "v2"),
            cache_key("banner", &payload, "v3")
        );
        assert_ne!(
            cache_key("banner", &payload, "v2"),
            cache_key("banner", &json!({"q": "rome"}), "v2")
        );
        assert_ne!(
            cache_key("banner", &payload, "v2"),
            cache_key("home_banner", &payload, "v2")
        );
    }

    #[test]
    fn test_canonical_json_sorts_nested_objects() {
        let value = json!({"b": [{"y": 1, "x": 2}], "a": null});
        assert_eq!(canonical_json(&value), r#"{"a":null,"b":[{"x":2,"y":1}]}"#);
    }

    #[tokio::test]
    async fn test_second_call_skips_compute() {
        let store = MemoryCacheStore::new();
        let calls = AtomicUsize::new(0);
        let payload = json!({"q": "goa"});

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec!["Goa".to_string()])
        };
        let (first, cached) = cache_get_or_set(&store, "t", &payload, 60, "v2", compute)
            .await
            .unwrap();
        assert_eq!(first, vec!["Goa".to_string()]);
        assert!(!cached);

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec!["Other".to_string()])
        };
        let (second, cached) = cache_get_or_set(&store, "t", &payload, 60, "v2", compute)
            .await
            .unwrap();
        assert_eq!(second, vec!["Goa".to_string()]);
        assert!(cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_compute_error_propagates_and_is_not_stored() {
        let store = MemoryCacheStore::new();
        let payload = json!({"q": "x"});

        let result: Result<(Vec<String>, bool), String> =
            cache_get_or_set(&store, "t", &payload, 60, "v2", || async {
                Err("boom".to_string())
            })
            .await;
        assert_eq!(result.unwrap_err(), "boom");
        assert!(store.is_empty().await);
    }
}
