use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{guarded, RngCell};
use crate::api::{FlightSource, OPENSKY};
use crate::cache::{Clock, TtlCache};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult, UpstreamError};
use crate::models::{FlightRecord, Source};
use crate::normalize::normalize_flights;
use crate::retry::{with_retries, RetryPolicy};
use crate::synthetic::flights as synthetic;

pub const DEFAULT_LIMIT: usize = 500;
pub const MAX_LIMIT: usize = 2000;
const EMERGENCY_LIMIT: usize = 500;

const FALLBACK_WARNING: &str =
    "OpenSky Network API is currently unavailable. Using enhanced realistic flight data for demonstration.";
const EMERGENCY_WARNING: &str = "System error occurred. Using emergency flight data.";

#[derive(Debug, Clone, PartialEq)]
pub struct FlightQuery {
    /// Advisory only, the upstream is always queried globally.
    pub region: String,
    pub limit: usize,
    pub mock: bool,
}

impl Default for FlightQuery {
    fn default() -> Self {
        Self {
            region: "global".to_string(),
            limit: DEFAULT_LIMIT,
            mock: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightsResponse {
    pub flights: Vec<FlightRecord>,
    pub cached: bool,
    pub timestamp: i64,
    pub total: usize,
    pub processed: usize,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FlightsResponse {
    fn sliced(
        all: Vec<FlightRecord>,
        limit: usize,
        written_at: DateTime<Utc>,
        total: usize,
        source: Source,
        warning: Option<String>,
    ) -> Self {
        let flights: Vec<FlightRecord> = all.into_iter().take(limit).collect();
        Self {
            processed: flights.len(),
            flights,
            cached: source == Source::Cache,
            timestamp: written_at.timestamp_millis(),
            total,
            source,
            warning,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FlightSettings {
    pub ttl: chrono::Duration,
    pub policy: RetryPolicy,
}

impl FlightSettings {
    /// OpenSky is often down, so a single attempt: failing fast beats waiting.
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: config.cache.flights_ttl(),
            policy: RetryPolicy::single(config.upstream.opensky_timeout()),
        }
    }
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct FlightService {
    source: Arc<dyn FlightSource>,
    clock: Arc<dyn Clock>,
    cache: TtlCache<(), Vec<FlightRecord>>,
    policy: RetryPolicy,
    rng: RngCell,
}

impl FlightService {
    pub fn new(source: Arc<dyn FlightSource>, clock: Arc<dyn Clock>, settings: FlightSettings) -> Self {
        Self {
            source,
            clock,
            cache: TtlCache::new("flight cache", settings.ttl),
            policy: settings.policy,
            rng: RngCell::from_entropy(),
        }
    }

    /// Makes synthetic output reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = RngCell::seeded(seed);
        self
    }

    pub async fn handle(&self, query: FlightQuery) -> FlightsResponse {
        info!(region = %query.region, limit = query.limit, mock = query.mock, "flights request");

        match guarded(self.run(&query)).await {
            Ok(response) => {
                info!(source = %response.source, count = response.flights.len(), "flights served");
                response
            }
            Err(e) => {
                error!(error = %e, "flights pipeline failed, serving emergency data");
                self.emergency(&query, &e)
            }
        }
    }

    async fn run(&self, query: &FlightQuery) -> PipelineResult<FlightsResponse> {
        let now = self.clock.now();

        if let Some(hit) = self.cache.get(&(), now)? {
            info!("returning cached flights");
            let total = hit.value.len();
            return Ok(FlightsResponse::sliced(
                hit.value,
                query.limit,
                hit.written_at,
                total,
                Source::Cache,
                None,
            ));
        }

        if query.mock {
            info!("generating mock flights on request");
            return self.synthesize(query.limit, now, Source::Mock, None);
        }

        match self.fetch_live().await {
            Ok((flights, upstream_total)) => {
                let now = self.clock.now();
                self.cache.put((), flights.clone(), now)?;
                Ok(FlightsResponse::sliced(
                    flights,
                    query.limit,
                    now,
                    upstream_total,
                    Source::OpenSky,
                    None,
                ))
            }
            Err(PipelineError::Upstream(e)) => {
                // Routine: OpenSky rate-limits and drops anonymous clients often
                info!(error = %e, "OpenSky unavailable, using synthetic flights");
                self.synthesize(
                    query.limit,
                    self.clock.now(),
                    Source::Fallback,
                    Some(FALLBACK_WARNING.to_string()),
                )
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches and normalizes every usable state vector, independent of
    /// any one request's limit, so the cached set can serve all limits.
    async fn fetch_live(&self) -> PipelineResult<(Vec<FlightRecord>, usize)> {
        let raw = with_retries(OPENSKY, self.policy, || self.source.fetch_states()).await?;
        let normalized = normalize_flights(&raw, MAX_LIMIT, self.clock.now().timestamp())?;
        if normalized.flights.is_empty() {
            return Err(UpstreamError::malformed(OPENSKY, "no state vectors with a valid position").into());
        }
        info!(states = normalized.upstream_total, kept = normalized.flights.len(), "OpenSky success");
        Ok((normalized.flights, normalized.upstream_total))
    }

    /// Generates a full synthetic set, caches it whole and returns `limit`
    /// of it.
    fn synthesize(
        &self,
        limit: usize,
        now: DateTime<Utc>,
        source: Source,
        warning: Option<String>,
    ) -> PipelineResult<FlightsResponse> {
        let flights = self
            .rng
            .with(|rng| synthetic::generate(rng, synthetic::MAX_FLIGHTS, now.timestamp()))?;
        self.cache.put((), flights.clone(), now)?;
        let total = flights.len();
        Ok(FlightsResponse::sliced(flights, limit, now, total, source, warning))
    }

    /// Last resort: fresh entropy, no shared state touched.
    fn emergency(&self, query: &FlightQuery, cause: &PipelineError) -> FlightsResponse {
        let now = self.clock.now();
        let mut rng = StdRng::from_entropy();
        let flights = synthetic::generate(&mut rng, query.limit.min(EMERGENCY_LIMIT), now.timestamp());
        FlightsResponse {
            total: flights.len(),
            processed: flights.len(),
            flights,
            cached: false,
            timestamp: now.timestamp_millis(),
            source: Source::EmergencyFallback,
            warning: Some(EMERGENCY_WARNING.to_string()),
            error: Some(cause.to_string()),
        }
    }
}
