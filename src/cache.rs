//! Rendered-page cache keyed by path plus the parsed, re-encoded query.
//!
//! Pages are cached until they expire or until a mutation revalidates their
//! route. Revalidation is by path, so `/dashboard/invoices` drops every
//! cached search and page of that list at once. Expired pages are swept on
//! every insert and the map never holds more than `max_entries` pages.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedPage {
    body: Value,
    stored_at: Instant,
}

#[derive(Debug, Clone)]
pub struct PageCache {
    entries: Arc<RwLock<HashMap<String, CachedPage>>>,
    ttl: Duration,
    max_entries: usize,
}

impl PageCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Fresh cached body for `key`, if any
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|page| page.stored_at.elapsed() < self.ttl)
            .map(|page| page.body.clone())
    }

    pub async fn put(&self, key: impl Into<String>, body: Value) {
        let key = key.into();
        let mut entries = self.entries.write().await;

        let ttl = self.ttl;
        entries.retain(|_, page| page.stored_at.elapsed() < ttl);

        while entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, page)| page.stored_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            debug!("Evicting cached page {}", oldest);
            entries.remove(&oldest);
        }

        entries.insert(
            key,
            CachedPage {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every cached page rendered for `path`, whatever its query string.
    /// Returns how many entries were dropped.
    pub async fn revalidate_path(&self, path: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| path_of(key) != path);
        let dropped = before - entries.len();
        debug!("Revalidated {} ({} cached pages dropped)", path, dropped);
        dropped
    }

    /// Pages currently held, fresh or not yet swept
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn path_of(key: &str) -> &str {
    key.split_once('?').map_or(key, |(path, _)| path)
}
