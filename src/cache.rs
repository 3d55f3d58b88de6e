//! Short-lived response cache keyed by the full search request

use crate::clock::duration_millis;
use crate::{SearchRequest, SearchResponse};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Deterministic key over every request field in a fixed order
pub fn cache_key(request: &SearchRequest) -> String {
    let canonical = json!([
        request.origin,
        request.destination,
        request.departure_date.map(|date| date.to_string()),
        request.return_date.map(|date| date.to_string()),
        request.passengers.adults,
        request.passengers.children,
        request.passengers.infants_in_seat,
        request.passengers.infants_on_lap,
        request.cabin_class.as_str(),
        request.trip_type.as_str(),
    ]);
    format!("flight_search_{}", canonical)
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: SearchResponse,
    created_at: i64, // epoch ms
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.created_at.saturating_add(duration_millis(self.ttl))
    }
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entry for `key`; an expired one is dropped on the way out
    pub fn get(&self, key: &str, now_ms: i64) -> Option<SearchResponse> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now_ms) => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(key);
                debug!("Dropped expired cache entry on lookup");
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, response: SearchResponse, now_ms: i64, ttl: Duration) {
        self.entries.lock().insert(
            key,
            CacheEntry {
                response,
                created_at: now_ms,
                ttl,
            },
        );
    }

    /// Remove every expired entry, returning how many went
    pub fn purge_expired(&self, now_ms: i64) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now_ms));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
