use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::models::{N2yoResponse, OpenSkyResponse, SolarBodiesResponse};

pub const OPENSKY: &str = "opensky";
pub const N2YO: &str = "n2yo";
pub const SOLAR_SYSTEM: &str = "solar-system-api";

const SOLAR_FIELDS: &str = "id,name,englishName,isPlanet,moons,semimajorAxis,mass,vol,density,gravity,meanRadius,equaRadius,sideralOrbit,sideralRotation,avgTemp,bodyType,aroundPlanet,discoveredBy,discoveryDate";

/// Ground position the satellite query is made relative to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub altitude: f64,
}

#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn fetch_states(&self) -> Result<OpenSkyResponse, UpstreamError>;
}

#[async_trait]
pub trait SatelliteSource: Send + Sync {
    async fn fetch_above(
        &self,
        observer: Observer,
        radius: i64,
        category: i64,
    ) -> Result<N2yoResponse, UpstreamError>;
}

#[async_trait]
pub trait SolarSystemSource: Send + Sync {
    async fn fetch_bodies(&self) -> Result<SolarBodiesResponse, UpstreamError>;
}

/// Shared reqwest plumbing for the three providers.
#[derive(Clone)]
struct JsonGetter {
    client: Client,
}

impl JsonGetter {
    fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().user_agent(user_agent).build()?,
        })
    }

    async fn get<T: DeserializeOwned>(&self, api: &'static str, url: &str) -> Result<T, UpstreamError> {
        let res = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(api, e))?;

        let status = res.status();
        debug!(api, %status, "upstream responded");
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus {
                api,
                status: status.as_u16(),
            });
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(api, e))?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::malformed(api, e.to_string()))
    }
}

/// OpenSky Network `states/all` client.
pub struct FlightProvider {
    http: JsonGetter,
    url: String,
}

impl FlightProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: JsonGetter::new(&config.user_agent)?,
            url: config.opensky_url.clone(),
        })
    }
}

#[async_trait]
impl FlightSource for FlightProvider {
    async fn fetch_states(&self) -> Result<OpenSkyResponse, UpstreamError> {
        self.http.get(OPENSKY, &self.url).await
    }
}

/// N2YO "what's above" client.
pub struct SatelliteProvider {
    http: JsonGetter,
    base_url: String,
    api_key: String,
}

impl SatelliteProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: JsonGetter::new(&config.user_agent)?,
            base_url: config.n2yo_url.trim_end_matches('/').to_string(),
            api_key: config.n2yo_api_key.clone().unwrap_or_default(),
        })
    }

    fn above_url(&self, observer: Observer, radius: i64, category: i64) -> String {
        format!(
            "{}/above/{}/{}/{}/{}/{}/&apiKey={}",
            self.base_url,
            observer.latitude,
            observer.longitude,
            observer.altitude,
            radius,
            category,
            self.api_key
        )
    }
}

#[async_trait]
impl SatelliteSource for SatelliteProvider {
    async fn fetch_above(
        &self,
        observer: Observer,
        radius: i64,
        category: i64,
    ) -> Result<N2yoResponse, UpstreamError> {
        let url = self.above_url(observer, radius, category);
        self.http.get(N2YO, &url).await
    }
}

/// Solar System OpenData `bodies` client.
pub struct SolarSystemProvider {
    http: JsonGetter,
    url: String,
}

impl SolarSystemProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: JsonGetter::new(&config.user_agent)?,
            url: format!("{}?data={}", config.solar_system_url, SOLAR_FIELDS),
        })
    }
}

#[async_trait]
impl SolarSystemSource for SolarSystemProvider {
    async fn fetch_bodies(&self) -> Result<SolarBodiesResponse, UpstreamError> {
        self.http.get(SOLAR_SYSTEM, &self.url).await
    }
}
