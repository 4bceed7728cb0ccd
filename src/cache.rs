use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use crate::error::{PipelineError, PipelineResult};

/// Source of "now" for cache freshness and response timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Snapshot of a cache slot.
#[derive(Debug, Clone)]
pub struct CacheHit<V> {
    pub value: V,
    pub written_at: DateTime<Utc>,
}

struct CacheEntry<K, V> {
    key: K,
    value: V,
    written_at: DateTime<Utc>,
}

/// Single-slot cache with a time-to-live.
///
/// The slot remembers the key it was written under; a read only hits when
/// the key is exactly equal and the entry is younger than the TTL. Writes
/// replace the slot wholesale, so concurrent writers resolve to the last
/// one. Use `K = ()` for an unkeyed slot.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    slot: Mutex<Option<CacheEntry<K, V>>>,
}

impl<K: PartialEq, V: Clone> TtlCache<K, V> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self, key: &K, now: DateTime<Utc>) -> PipelineResult<Option<CacheHit<V>>> {
        let guard = self.slot.lock().map_err(|_| PipelineError::Poisoned(self.name))?;
        let hit = guard.as_ref().and_then(|entry| {
            let fresh = now - entry.written_at < self.ttl;
            (fresh && entry.key == *key).then(|| CacheHit {
                value: entry.value.clone(),
                written_at: entry.written_at,
            })
        });
        Ok(hit)
    }

    pub fn put(&self, key: K, value: V, written_at: DateTime<Utc>) -> PipelineResult<()> {
        let mut guard = self.slot.lock().map_err(|_| PipelineError::Poisoned(self.name))?;
        *guard = Some(CacheEntry {
            key,
            value,
            written_at,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_cache_misses() {
        let cache: TtlCache<(), Vec<u32>> = TtlCache::new("test", Duration::seconds(30));
        assert!(cache.get(&(), start()).unwrap().is_none());
    }

    #[test]
    fn hit_within_ttl_returns_write_time() {
        let cache = TtlCache::new("test", Duration::seconds(30));
        cache.put((), vec![1, 2, 3], start()).unwrap();

        let hit = cache
            .get(&(), start() + Duration::seconds(29))
            .unwrap()
            .expect("fresh entry");
        assert_eq!(hit.value, vec![1, 2, 3]);
        assert_eq!(hit.written_at, start());
    }

    #[test]
    fn entry_expires_at_ttl() {
        let cache = TtlCache::new("test", Duration::seconds(30));
        cache.put((), 1u8, start()).unwrap();
        assert!(cache.get(&(), start() + Duration::seconds(30)).unwrap().is_none());
    }

    #[test]
    fn keyed_slot_requires_exact_key() {
        let cache = TtlCache::new("test", Duration::seconds(60));
        cache.put("10_20_0_70_2".to_string(), 1u8, start()).unwrap();

        assert!(cache
            .get(&"11_20_0_70_2".to_string(), start())
            .unwrap()
            .is_none());
        assert!(cache
            .get(&"10_20_0_70_2".to_string(), start())
            .unwrap()
            .is_some());
    }

    #[test]
    fn put_replaces_previous_key() {
        let cache = TtlCache::new("test", Duration::seconds(60));
        cache.put("a", 1u8, start()).unwrap();
        cache.put("b", 2u8, start()).unwrap();
        assert!(cache.get(&"a", start()).unwrap().is_none());
        assert_eq!(cache.get(&"b", start()).unwrap().unwrap().value, 2);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(start());
        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), start() + Duration::seconds(5));
    }
}
