use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{guarded, RngCell};
use crate::api::{Observer, SatelliteSource, N2YO};
use crate::cache::{Clock, TtlCache};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult, UpstreamError};
use crate::models::{SatelliteRecord, Source};
use crate::normalize::normalize_satellites;
use crate::retry::{with_retries, RetryPolicy};
use crate::synthetic::satellites::{self as synthetic, category_name};

pub const DEFAULT_RADIUS: i64 = 70;
const SYNTHETIC_COUNT: usize = 50;
const EMERGENCY_COUNT: usize = 30;

const FALLBACK_WARNING: &str =
    "N2YO API is currently unavailable. Using realistic satellite data for demonstration.";
const EMERGENCY_WARNING: &str = "System error occurred. Using emergency satellite data.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteQuery {
    pub observer: Observer,
    /// Search radius, degrees.
    pub radius: i64,
    pub category: i64,
    pub mock: bool,
}

impl SatelliteQuery {
    pub fn new(observer: Observer) -> Self {
        Self {
            observer,
            radius: DEFAULT_RADIUS,
            category: 0,
            mock: false,
        }
    }

    /// Exact request signature; cache hits need string equality.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.observer.latitude, self.observer.longitude, self.observer.altitude, self.radius, self.category
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatellitesResponse {
    pub satellites: Vec<SatelliteRecord>,
    pub cached: bool,
    pub timestamp: i64,
    pub total: usize,
    pub source: Source,
    pub transaction_count: u64,
    pub category_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SatelliteSettings {
    pub ttl: chrono::Duration,
    pub policy: RetryPolicy,
    pub default_observer: Observer,
}

impl SatelliteSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: config.cache.satellites_ttl(),
            policy: RetryPolicy::linear(2, config.upstream.n2yo_timeout()),
            default_observer: config.observer.observer(),
        }
    }
}

impl Default for SatelliteSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

struct LiveSatellites {
    satellites: Vec<SatelliteRecord>,
    transaction_count: u64,
    category_name: String,
}

pub struct SatelliteService {
    source: Arc<dyn SatelliteSource>,
    clock: Arc<dyn Clock>,
    cache: TtlCache<String, Vec<SatelliteRecord>>,
    policy: RetryPolicy,
    default_observer: Observer,
    rng: RngCell,
}

impl SatelliteService {
    pub fn new(source: Arc<dyn SatelliteSource>, clock: Arc<dyn Clock>, settings: SatelliteSettings) -> Self {
        Self {
            source,
            clock,
            cache: TtlCache::new("satellite cache", settings.ttl),
            policy: settings.policy,
            default_observer: settings.default_observer,
            rng: RngCell::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RngCell::seeded(seed);
        self
    }

    pub fn default_observer(&self) -> Observer {
        self.default_observer
    }

    pub async fn handle(&self, query: SatelliteQuery) -> SatellitesResponse {
        info!(
            lat = query.observer.latitude,
            lng = query.observer.longitude,
            alt = query.observer.altitude,
            radius = query.radius,
            category = query.category,
            mock = query.mock,
            "satellites request"
        );

        match guarded(self.run(&query)).await {
            Ok(response) => {
                info!(source = %response.source, count = response.satellites.len(), "satellites served");
                response
            }
            Err(e) => {
                error!(error = %e, "satellite pipeline failed, serving emergency data");
                self.emergency(&query, &e)
            }
        }
    }

    async fn run(&self, query: &SatelliteQuery) -> PipelineResult<SatellitesResponse> {
        let key = query.cache_key();
        let now = self.clock.now();

        if let Some(hit) = self.cache.get(&key, now)? {
            info!(%key, "returning cached satellites");
            return Ok(SatellitesResponse {
                total: hit.value.len(),
                satellites: hit.value,
                cached: true,
                timestamp: hit.written_at.timestamp_millis(),
                source: Source::Cache,
                transaction_count: 0,
                category_name: category_name(query.category).to_string(),
                warning: None,
                error: None,
            });
        }

        if query.mock {
            info!("generating mock satellites on request");
            return self.synthesize(query, key, now, Source::Mock, None);
        }

        match self.fetch_live(query).await {
            Ok(live) => {
                let now = self.clock.now();
                self.cache.put(key, live.satellites.clone(), now)?;
                Ok(SatellitesResponse {
                    total: live.satellites.len(),
                    satellites: live.satellites,
                    cached: false,
                    timestamp: now.timestamp_millis(),
                    source: Source::N2yo,
                    transaction_count: live.transaction_count,
                    category_name: live.category_name,
                    warning: None,
                    error: None,
                })
            }
            Err(PipelineError::Upstream(e)) => {
                warn!(error = %e, "all N2YO attempts failed, using synthetic satellites");
                let mut response = self.synthesize(
                    query,
                    key,
                    self.clock.now(),
                    Source::Fallback,
                    Some(FALLBACK_WARNING.to_string()),
                )?;
                response.error = Some(e.to_string());
                Ok(response)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_live(&self, query: &SatelliteQuery) -> PipelineResult<LiveSatellites> {
        let raw = with_retries(N2YO, self.policy, || {
            self.source.fetch_above(query.observer, query.radius, query.category)
        })
        .await?;
        let satellites = normalize_satellites(&raw)?;
        if satellites.is_empty() {
            return Err(UpstreamError::malformed(N2YO, "no usable satellites in response").into());
        }

        let info = raw.info.unwrap_or_default();
        info!(count = satellites.len(), transactions = ?info.transactionscount, "N2YO success");
        Ok(LiveSatellites {
            satellites,
            transaction_count: info.transactionscount.unwrap_or(0),
            category_name: info
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| category_name(query.category).to_string()),
        })
    }

    fn synthesize(
        &self,
        query: &SatelliteQuery,
        key: String,
        now: DateTime<Utc>,
        source: Source,
        warning: Option<String>,
    ) -> PipelineResult<SatellitesResponse> {
        let satellites = self
            .rng
            .with(|rng| synthetic::generate(rng, query.category, SYNTHETIC_COUNT))?;
        self.cache.put(key, satellites.clone(), now)?;
        Ok(SatellitesResponse {
            total: satellites.len(),
            satellites,
            cached: false,
            timestamp: now.timestamp_millis(),
            source,
            transaction_count: 0,
            category_name: category_name(query.category).to_string(),
            warning,
            error: None,
        })
    }

    fn emergency(&self, query: &SatelliteQuery, cause: &PipelineError) -> SatellitesResponse {
        let mut rng = StdRng::from_entropy();
        let satellites = synthetic::generate(&mut rng, query.category, EMERGENCY_COUNT);
        SatellitesResponse {
            total: satellites.len(),
            satellites,
            cached: false,
            timestamp: self.clock.now().timestamp_millis(),
            source: Source::EmergencyFallback,
            transaction_count: 0,
            category_name: category_name(query.category).to_string(),
            warning: Some(EMERGENCY_WARNING.to_string()),
            error: Some(cause.to_string()),
        }
    }
}
