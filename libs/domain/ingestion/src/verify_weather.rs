// [libs/domain/ingestion/src/verify_weather.rs]
//! Stage 3a: weather verification for weather-tagged categories.
//! Caches hits for 10 minutes keyed by coordinates rounded to ~1km —
//! a bounded cache with a real expiry, not an unbounded map that only
//! grows.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tracing::{instrument, warn};

/// Outbound deadline for the weather provider call.
const WEATHER_DEADLINE: Duration = Duration::from_secs(3);
const CACHE_TTL: Duration = Duration::from_secs(600);
const CACHE_CAPACITY: usize = 4096;

/// Rounds to two decimal places, roughly 1.1km of latitude resolution
/// — coarse enough that nearby reports share a cache entry.
fn cache_key(latitude: f64, longitude: f64) -> (i32, i32) {
    ((latitude * 100.0).round() as i32, (longitude * 100.0).round() as i32)
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// `true` if current conditions at `(latitude, longitude)` are
    /// confirmed consistent with a weather-related report; `None` on
    /// any failure to reach or parse the provider's response.
    async fn current_conditions_match(&self, latitude: f64, longitude: f64) -> Option<bool>;
}

pub struct WeatherCache {
    entries: Mutex<LruCache<(i32, i32), (bool, Instant)>>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self { entries: Mutex::new(LruCache::new(std::num::NonZeroUsize::new(CACHE_CAPACITY).unwrap())) }
    }

    fn get(&self, key: (i32, i32)) -> Option<bool> {
        let mut entries = self.entries.lock().expect("weather cache mutex poisoned");
        match entries.get(&key) {
            Some((verified, stamped_at)) if stamped_at.elapsed() < CACHE_TTL => Some(*verified),
            _ => None,
        }
    }

    fn put(&self, key: (i32, i32), verified: bool) {
        let mut entries = self.entries.lock().expect("weather cache mutex poisoned");
        entries.put(key, (verified, Instant::now()));
    }
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `weather_unverified`: `false` when the provider confirmed
/// conditions (or the category isn't weather-tagged, so verification
/// doesn't apply), `true` on a cache miss the provider couldn't
/// resolve, a non-match, a timeout, or no provider configured.
#[instrument(skip(provider, cache))]
pub async fn verify_weather(
    provider: Option<&dyn WeatherProvider>,
    cache: &WeatherCache,
    latitude: f64,
    longitude: f64,
    category_is_weather_tagged: bool,
) -> bool {
    if !category_is_weather_tagged {
        return false;
    }

    let key = cache_key(latitude, longitude);
    if let Some(verified) = cache.get(key) {
        return !verified;
    }

    let Some(provider) = provider else {
        return true;
    };

    let outcome = tokio::time::timeout(WEATHER_DEADLINE, provider.current_conditions_match(latitude, longitude)).await;

    match outcome {
        Ok(Some(verified)) => {
            cache.put(key, verified);
            !verified
        }
        Ok(None) => {
            warn!("🌦️ [WEATHER]: provider could not resolve conditions");
            true
        }
        Err(_) => {
            warn!("🌦️ [WEATHER]: provider call exceeded {WEATHER_DEADLINE:?} deadline");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_weather_category_skips_verification() {
        let cache = WeatherCache::new();
        assert!(!verify_weather(None, &cache, 17.9, 79.5, false).await);
    }

    #[tokio::test]
    async fn no_provider_marks_unverified() {
        let cache = WeatherCache::new();
        assert!(verify_weather(None, &cache, 17.9, 79.5, true).await);
    }

    struct AlwaysMatches;
    #[async_trait]
    impl WeatherProvider for AlwaysMatches {
        async fn current_conditions_match(&self, _latitude: f64, _longitude: f64) -> Option<bool> {
            Some(true)
        }
    }

    #[tokio::test]
    async fn confirmed_conditions_are_verified_and_cached() {
        let cache = WeatherCache::new();
        let provider = AlwaysMatches;
        assert!(!verify_weather(Some(&provider), &cache, 17.9, 79.5, true).await);
        // second call hits the cache without needing the provider again
        assert!(!verify_weather(None, &cache, 17.9, 79.5, true).await);
    }

    struct Unreachable;
    #[async_trait]
    impl WeatherProvider for Unreachable {
        async fn current_conditions_match(&self, _latitude: f64, _longitude: f64) -> Option<bool> {
            None
        }
    }

    #[tokio::test]
    async fn unreachable_provider_marks_unverified() {
        let cache = WeatherCache::new();
        let provider = Unreachable;
        assert!(verify_weather(Some(&provider), &cache, 1.0, 1.0, true).await);
    }
}
