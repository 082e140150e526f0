use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::RwLock;

use crate::dtos::post_dtos::PostOut;
use crate::services::pagination::Page;

pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

#[derive(Default)]
struct Entries {
    /// Bumped by every `invalidate`.
    generation: u64,
    pages: HashMap<u64, (Instant, Page<PostOut>)>,
}

/// Global feed pages keyed by page number, each kept for `ttl`.
/// Any post write must call `invalidate`.
///
/// Readers take `generation()` before querying the store and hand it to
/// `put`; a page read before an invalidation is never stored.
pub struct FeedCache {
    ttl: Duration,
    entries: RwLock<Entries>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub async fn generation(&self) -> u64 {
        self.entries.read().await.generation
    }

    pub async fn get(&self, page: u64) -> Option<Page<PostOut>> {
        let entries = self.entries.read().await;
        match entries.pages.get(&page) {
            Some((stored_at, cached)) if stored_at.elapsed() < self.ttl => Some(cached.clone()),
            _ => None,
        }
    }

    /// Stores `content` unless the cache was invalidated after `generation`
    /// was read. Returns whether the page was kept.
    pub async fn put(&self, page: u64, content: Page<PostOut>, generation: u64) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        let mut entries = self.entries.write().await;
        if entries.generation != generation {
            debug!("feed cache: discarding page {} read before a write", page);
            return false;
        }
        let ttl = self.ttl;
        entries.pages.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.pages.insert(page, (Instant::now(), content));
        true
    }

    pub async fn invalidate(&self) {
        let mut entries = self.entries.write().await;
        entries.generation = entries.generation.wrapping_add(1);
        if !entries.pages.is_empty() {
            debug!("feed cache: dropping {} page(s)", entries.pages.len());
            entries.pages.clear();
        }
    }
}
