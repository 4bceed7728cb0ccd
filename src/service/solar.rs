use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::guarded;
use crate::api::{SolarSystemSource, SOLAR_SYSTEM};
use crate::cache::{Clock, TtlCache};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult, UpstreamError};
use crate::models::{BodyType, SolarBody, Source};
use crate::normalize::normalize_bodies;
use crate::retry::{with_retries, RetryPolicy};
use crate::synthetic::solar as synthetic;

const FALLBACK_WARNING: &str = "Using mock data due to API unavailability";
const EMERGENCY_WARNING: &str = "Using emergency mock data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolarQuery {
    /// `None` returns every body type.
    pub body_type: Option<BodyType>,
    pub mock: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolarSystemResponse {
    pub bodies: Vec<SolarBody>,
    pub cached: bool,
    pub timestamp: i64,
    /// Bodies known before type filtering.
    pub total: usize,
    pub filtered: usize,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolarSystemResponse {
    fn build(all: Vec<SolarBody>, query: &SolarQuery, timestamp: i64, source: Source) -> Self {
        let total = all.len();
        let bodies: Vec<SolarBody> = match query.body_type {
            None => all,
            Some(wanted) => all.into_iter().filter(|b| b.body_type == wanted).collect(),
        };
        Self {
            filtered: bodies.len(),
            bodies,
            cached: source == Source::Cache,
            timestamp,
            total,
            source,
            warning: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolarSettings {
    pub ttl: chrono::Duration,
    pub policy: RetryPolicy,
}

impl SolarSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: config.cache.solar_system_ttl(),
            policy: RetryPolicy::linear(2, config.upstream.solar_system_timeout()),
        }
    }
}

impl Default for SolarSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The body table is fixed, so unlike the other services no random source
/// is needed.
pub struct SolarService {
    source: Arc<dyn SolarSystemSource>,
    clock: Arc<dyn Clock>,
    cache: TtlCache<(), Vec<SolarBody>>,
    policy: RetryPolicy,
}

impl SolarService {
    pub fn new(source: Arc<dyn SolarSystemSource>, clock: Arc<dyn Clock>, settings: SolarSettings) -> Self {
        Self {
            source,
            clock,
            cache: TtlCache::new("solar system cache", settings.ttl),
            policy: settings.policy,
        }
    }

    pub async fn handle(&self, query: SolarQuery) -> SolarSystemResponse {
        info!(body_type = ?query.body_type, mock = query.mock, "solar system request");

        match guarded(self.run(&query)).await {
            Ok(response) => {
                info!(source = %response.source, count = response.bodies.len(), "solar system served");
                response
            }
            Err(e) => {
                error!(error = %e, "solar system pipeline failed, serving emergency data");
                let mut response = SolarSystemResponse::build(
                    synthetic::generate(),
                    &query,
                    self.clock.now().timestamp_millis(),
                    Source::EmergencyFallback,
                );
                response.warning = Some(EMERGENCY_WARNING.to_string());
                response.error = Some(e.to_string());
                response
            }
        }
    }

    async fn run(&self, query: &SolarQuery) -> PipelineResult<SolarSystemResponse> {
        let now = self.clock.now();

        if let Some(hit) = self.cache.get(&(), now)? {
            info!("returning cached solar system bodies");
            return Ok(SolarSystemResponse::build(
                hit.value,
                query,
                hit.written_at.timestamp_millis(),
                Source::Cache,
            ));
        }

        if query.mock {
            info!("serving the fixed body table on request");
            let bodies = synthetic::generate();
            self.cache.put((), bodies.clone(), now)?;
            return Ok(SolarSystemResponse::build(bodies, query, now.timestamp_millis(), Source::Mock));
        }

        match self.fetch_live().await {
            Ok(bodies) => {
                let now = self.clock.now();
                self.cache.put((), bodies.clone(), now)?;
                Ok(SolarSystemResponse::build(
                    bodies,
                    query,
                    now.timestamp_millis(),
                    Source::SolarSystemApi,
                ))
            }
            Err(PipelineError::Upstream(e)) => {
                warn!(error = %e, "all Solar System API attempts failed, using the fixed body table");
                let now = self.clock.now();
                let bodies = synthetic::generate();
                self.cache.put((), bodies.clone(), now)?;
                let mut response =
                    SolarSystemResponse::build(bodies, query, now.timestamp_millis(), Source::Fallback);
                response.warning = Some(FALLBACK_WARNING.to_string());
                response.error = Some(e.to_string());
                Ok(response)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_live(&self) -> PipelineResult<Vec<SolarBody>> {
        let raw = with_retries(SOLAR_SYSTEM, self.policy, || self.source.fetch_bodies()).await?;
        let bodies = normalize_bodies(&raw)?;
        if bodies.is_empty() {
            return Err(UpstreamError::malformed(SOLAR_SYSTEM, "no usable bodies in response").into());
        }
        info!(count = bodies.len(), "Solar System API success");
        Ok(bodies)
    }
}
