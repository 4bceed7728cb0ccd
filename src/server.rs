//! HTTP surface: one GET route per domain plus a health probe.
//!
//! Handlers never fail. Query values that are missing or don't parse take
//! their documented defaults, and the services themselves always produce
//! a populated payload, so every response is `200 OK` with JSON.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::{FlightProvider, Observer, SatelliteProvider, SolarSystemProvider};
use crate::cache::{Clock, SystemClock};
use crate::config::Config;
use crate::models::BodyType;
use crate::service::{
    FlightQuery, FlightService, FlightSettings, FlightsResponse, SatelliteQuery, SatelliteService,
    SatelliteSettings, SatellitesResponse, SolarQuery, SolarService, SolarSettings,
    SolarSystemResponse,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightService>,
    pub satellites: Arc<SatelliteService>,
    pub solar: Arc<SolarService>,
    pub version: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(flights: FlightService, satellites: SatelliteService, solar: SolarService) -> Self {
        Self {
            flights: Arc::new(flights),
            satellites: Arc::new(satellites),
            solar: Arc::new(solar),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Wires the live upstream clients. `default_observer` overrides the
    /// configured one (e.g. after geolocation).
    pub fn from_config(config: &Config, default_observer: Observer) -> Result<Self, reqwest::Error> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let satellite_settings = SatelliteSettings {
            default_observer,
            ..SatelliteSettings::from_config(config)
        };

        Ok(Self::new(
            FlightService::new(
                Arc::new(FlightProvider::new(&config.upstream)?),
                clock.clone(),
                FlightSettings::from_config(config),
            ),
            SatelliteService::new(
                Arc::new(SatelliteProvider::new(&config.upstream)?),
                clock.clone(),
                satellite_settings,
            ),
            SolarService::new(
                Arc::new(SolarSystemProvider::new(&config.upstream)?),
                clock,
                SolarSettings::from_config(config),
            ),
        ))
    }

    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/flights", get(get_flights))
        .route("/satellites", get(get_satellites))
        .route("/solar-system", get(get_solar_system));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

fn parse_int(value: Option<&str>) -> Option<i64> {
    value?.trim().parse().ok()
}

fn parse_float(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}

#[derive(Debug, Default, Deserialize)]
pub struct FlightParams {
    pub region: Option<String>,
    pub limit: Option<String>,
    pub mock: Option<String>,
}

impl FlightParams {
    pub fn into_query(self) -> FlightQuery {
        let defaults = FlightQuery::default();
        let limit = parse_int(self.limit.as_deref())
            .map(|l| l.clamp(0, crate::service::MAX_FLIGHT_LIMIT as i64) as usize)
            .unwrap_or(defaults.limit);
        FlightQuery {
            region: self.region.filter(|r| !r.is_empty()).unwrap_or(defaults.region),
            limit,
            mock: is_true(self.mock.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SatelliteParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub alt: Option<String>,
    pub radius: Option<String>,
    pub category: Option<String>,
    pub mock: Option<String>,
}

impl SatelliteParams {
    pub fn into_query(self, default_observer: Observer) -> SatelliteQuery {
        let defaults = SatelliteQuery::new(default_observer);
        SatelliteQuery {
            observer: Observer {
                latitude: parse_float(self.lat.as_deref()).unwrap_or(default_observer.latitude),
                longitude: parse_float(self.lng.as_deref()).unwrap_or(default_observer.longitude),
                altitude: parse_float(self.alt.as_deref()).unwrap_or(default_observer.altitude),
            },
            radius: parse_int(self.radius.as_deref()).unwrap_or(defaults.radius),
            category: parse_int(self.category.as_deref()).unwrap_or(defaults.category),
            mock: is_true(self.mock.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SolarParams {
    #[serde(rename = "type")]
    pub body_type: Option<String>,
    pub mock: Option<String>,
}

impl SolarParams {
    pub fn into_query(self) -> SolarQuery {
        let body_type = match self.body_type.as_deref() {
            None | Some("all") | Some("") => None,
            Some(other) => match other.parse::<BodyType>() {
                Ok(t) => Some(t),
                Err(()) => {
                    warn!(requested = other, "unknown body type, returning all bodies");
                    None
                }
            },
        };
        SolarQuery {
            body_type,
            mock: is_true(self.mock.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

pub async fn get_flights(
    State(state): State<AppState>,
    params: Option<Query<FlightParams>>,
) -> Json<FlightsResponse> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    Json(state.flights.handle(params.into_query()).await)
}

pub async fn get_satellites(
    State(state): State<AppState>,
    params: Option<Query<SatelliteParams>>,
) -> Json<SatellitesResponse> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let query = params.into_query(state.satellites.default_observer());
    Json(state.satellites.handle(query).await)
}

pub async fn get_solar_system(
    State(state): State<AppState>,
    params: Option<Query<SolarParams>>,
) -> Json<SolarSystemResponse> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    Json(state.solar.handle(params.into_query()).await)
}
