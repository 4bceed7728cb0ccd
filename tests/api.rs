use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use skywatch::api::{FlightSource, Observer, SatelliteSource, SolarSystemSource};
use skywatch::cache::ManualClock;
use skywatch::error::UpstreamError;
use skywatch::models::{N2yoInfo, N2yoResponse, OpenSkyResponse, SolarBodiesResponse};
use skywatch::server::{create_router, AppState};
use skywatch::service::{
    FlightService, FlightSettings, SatelliteService, SatelliteSettings, SolarService, SolarSettings,
};

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail,
    Hang,
    Panic,
}

struct FakeUpstream {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakeUpstream {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn act<T>(&self, api: &'static str, ok: impl FnOnce() -> T) -> Result<T, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed => Ok(ok()),
            Behaviour::Fail => Err(UpstreamError::HttpStatus { api, status: 503 }),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ok())
            }
            Behaviour::Panic => panic!("{} fake blew up", api),
        }
    }
}

#[async_trait]
impl FlightSource for FakeUpstream {
    async fn fetch_states(&self) -> Result<OpenSkyResponse, UpstreamError> {
        self.act("opensky", || {
            let states = (0..20)
                .map(|i| {
                    json!([format!("a{:05}", i), "UAL1", "United States", 1, 2,
                           -122.0, 37.5, 10000.0, false, 220.0, 90.0, 0.0,
                           null, 10100.0, "1200", false, 0])
                })
                .collect();
            OpenSkyResponse {
                states: Some(states),
            }
        })
        .await
    }
}

#[async_trait]
impl SatelliteSource for FakeUpstream {
    async fn fetch_above(
        &self,
        _observer: Observer,
        _radius: i64,
        _category: i64,
    ) -> Result<N2yoResponse, UpstreamError> {
        self.act("n2yo", || N2yoResponse {
            info: Some(N2yoInfo {
                category: Some("ANY".into()),
                transactionscount: Some(4),
            }),
            above: Some(vec![
                json!({"satid": 25544, "satname": "ISS (ZARYA)", "intDesignator": "1998-067A",
                       "launchDate": "1998-11-20", "satlat": 12.5, "satlng": 40.0, "satalt": 420.0}),
                json!({"satid": 20580, "satname": "HST", "satlat": -10.0, "satlng": 3.0, "satalt": 540.0}),
            ]),
        })
        .await
    }
}

#[async_trait]
impl SolarSystemSource for FakeUpstream {
    async fn fetch_bodies(&self) -> Result<SolarBodiesResponse, UpstreamError> {
        self.act("solar-system-api", || SolarBodiesResponse {
            bodies: Some(vec![json!({
                "id": "terre", "name": "La Terre", "englishName": "Earth", "isPlanet": true,
                "meanRadius": 6371.0, "gravity": 9.8, "avgTemp": 288,
                "bodyType": "Planet", "moons": [{"moon": "La Lune"}]
            })]),
        })
        .await
    }
}

struct Harness {
    router: axum::Router,
    flights: Arc<FakeUpstream>,
    satellites: Arc<FakeUpstream>,
    solar: Arc<FakeUpstream>,
    clock: Arc<ManualClock>,
}

fn harness(behaviour: Behaviour) -> Harness {
    let flights = FakeUpstream::new(behaviour);
    let satellites = FakeUpstream::new(behaviour);
    let solar = FakeUpstream::new(behaviour);
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()));

    let state = AppState::new(
        FlightService::new(flights.clone(), clock.clone(), FlightSettings::default()).with_seed(7),
        SatelliteService::new(satellites.clone(), clock.clone(), SatelliteSettings::default()).with_seed(7),
        SolarService::new(solar.clone(), clock.clone(), SolarSettings::default()),
    );

    Harness {
        router: create_router(state),
        flights,
        satellites,
        solar,
        clock,
    }
}

async fn get_json(router: &axum::Router, uri: &str) -> Value {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn mock_requests_never_touch_upstreams() {
    let h = harness(Behaviour::Succeed);

    let flights = get_json(&h.router, "/api/flights?mock=true&limit=25").await;
    assert_eq!(flights["source"], "mock");
    assert_eq!(flights["flights"].as_array().unwrap().len(), 25);

    let sats = get_json(&h.router, "/api/satellites?mock=true&category=2").await;
    assert_eq!(sats["source"], "mock");
    assert_eq!(sats["categoryName"], "ISS");

    let solar = get_json(&h.router, "/api/solar-system?mock=true").await;
    assert_eq!(solar["source"], "mock");

    assert_eq!(h.flights.calls(), 0);
    assert_eq!(h.satellites.calls(), 0);
    assert_eq!(h.solar.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn hanging_opensky_times_out_into_fallback() {
    let h = harness(Behaviour::Hang);
    let body = get_json(&h.router, "/api/flights?limit=50").await;

    let source = body["source"].as_str().unwrap();
    assert!(source == "fallback" || source == "emergency_fallback", "{}", source);
    assert!(body["flights"].as_array().unwrap().len() <= 50);
    assert!(body["warning"].is_string());
    assert_eq!(h.flights.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_n2yo_is_retried_then_falls_back_with_error() {
    let h = harness(Behaviour::Fail);
    let body = get_json(&h.router, "/api/satellites?lat=1&lng=2").await;

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["satellites"].as_array().unwrap().len(), 50);
    assert!(body["warning"].is_string());
    assert!(body["error"].as_str().unwrap().contains("503"));
    assert_eq!(h.satellites.calls(), 2);
}

#[tokio::test]
async fn cached_flights_keep_their_timestamp_until_expiry() {
    let h = harness(Behaviour::Succeed);

    let first = get_json(&h.router, "/api/flights").await;
    assert_eq!(first["source"], "opensky");
    assert_eq!(first["cached"], false);

    h.clock.advance(chrono::Duration::seconds(10));
    let second = get_json(&h.router, "/api/flights").await;
    assert_eq!(second["source"], "cache");
    assert_eq!(second["cached"], true);
    assert_eq!(second["timestamp"], first["timestamp"]);

    h.clock.advance(chrono::Duration::seconds(25));
    let third = get_json(&h.router, "/api/flights").await;
    assert_eq!(third["source"], "opensky");
    assert_eq!(h.flights.calls(), 2);
}

#[tokio::test]
async fn live_flights_carry_converted_units() {
    let h = harness(Behaviour::Succeed);
    let body = get_json(&h.router, "/api/flights").await;
    let first = &body["flights"][0];

    assert_eq!(first["callsign"], "UAL1");
    assert_eq!(first["squawk"], "1200");
    assert_eq!(first["status"], "En Route");
    let altitude = first["altitude"].as_f64().unwrap();
    assert!((altitude - 32_808.4).abs() < 1.0, "{}", altitude);
}

#[tokio::test]
async fn satellite_cache_is_keyed_by_request() {
    let h = harness(Behaviour::Succeed);

    let first = get_json(&h.router, "/api/satellites?lat=10&lng=20").await;
    assert_eq!(first["source"], "n2yo");
    assert_eq!(first["transactionCount"], 4);
    assert_eq!(first["satellites"][1]["intDesignator"], "Unknown");

    let again = get_json(&h.router, "/api/satellites?lat=10&lng=20").await;
    assert_eq!(again["source"], "cache");

    let moved = get_json(&h.router, "/api/satellites?lat=11&lng=20").await;
    assert_eq!(moved["source"], "n2yo");
    assert_eq!(h.satellites.calls(), 2);
}

#[tokio::test]
async fn planet_filter_returns_the_eight_planets_in_order() {
    let h = harness(Behaviour::Succeed);
    let body = get_json(&h.router, "/api/solar-system?type=planet&mock=true").await;

    assert_eq!(body["source"], "mock");
    assert_eq!(body["total"], 9);
    assert_eq!(body["filtered"], 8);
    let ids: Vec<&str> = body["bodies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| {
            assert_eq!(b["isPlanet"], true);
            assert_eq!(b["type"], "planet");
            b["id"].as_str().unwrap()
        })
        .collect();
    assert_eq!(
        ids,
        ["mercury", "venus", "earth", "mars", "jupiter", "saturn", "uranus", "neptune"]
    );
}

#[tokio::test]
async fn live_solar_bodies_are_normalized() {
    let h = harness(Behaviour::Succeed);
    let body = get_json(&h.router, "/api/solar-system").await;

    assert_eq!(body["source"], "solar-system-api");
    let earth = &body["bodies"][0];
    assert_eq!(earth["name"], "La Terre");
    assert_eq!(earth["englishName"], "Earth");
    assert_eq!(earth["type"], "planet");
    assert_eq!(earth["moons"], 1);
}

#[tokio::test]
async fn panicking_upstreams_end_in_emergency_data() {
    let h = harness(Behaviour::Panic);

    let flights = get_json(&h.router, "/api/flights?limit=20").await;
    assert_eq!(flights["source"], "emergency_fallback");
    assert_eq!(flights["flights"].as_array().unwrap().len(), 20);
    assert!(flights["error"].as_str().unwrap().contains("fake blew up"));

    let sats = get_json(&h.router, "/api/satellites").await;
    assert_eq!(sats["source"], "emergency_fallback");
    assert_eq!(sats["satellites"].as_array().unwrap().len(), 30);

    let solar = get_json(&h.router, "/api/solar-system").await;
    assert_eq!(solar["source"], "emergency_fallback");
    assert_eq!(solar["bodies"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn junk_parameters_still_answer() {
    let h = harness(Behaviour::Succeed);

    let flights = get_json(&h.router, "/api/flights?limit=abc&mock=true&bogus=1").await;
    assert_eq!(flights["flights"].as_array().unwrap().len(), 500);

    let sats = get_json(&h.router, "/api/satellites?lat=north&lng=&radius=wide&mock=true").await;
    assert_eq!(sats["source"], "mock");

    let solar = get_json(&h.router, "/api/solar-system?type=galaxy&mock=true").await;
    assert_eq!(solar["filtered"], 9);
}

#[tokio::test]
async fn health_reports_version() {
    let h = harness(Behaviour::Succeed);
    let body = get_json(&h.router, "/api/health").await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn zero_limit_request_leaves_the_cache_usable() {
    let h = harness(Behaviour::Succeed);

    let first = get_json(&h.router, "/api/flights?limit=0").await;
    assert_eq!(first["source"], "opensky");
    assert_eq!(first["flights"].as_array().unwrap().len(), 0);

    let second = get_json(&h.router, "/api/flights").await;
    assert_eq!(second["source"], "cache");
    assert_eq!(second["flights"].as_array().unwrap().len(), 20);
    assert_eq!(second["total"], 20);
}

#[tokio::test]
async fn satellite_entry_expires_after_a_minute() {
    let h = harness(Behaviour::Succeed);

    let first = get_json(&h.router, "/api/satellites?lat=10&lng=20").await;
    assert_eq!(first["source"], "n2yo");

    h.clock.advance(chrono::Duration::seconds(59));
    let fresh = get_json(&h.router, "/api/satellites?lat=10&lng=20").await;
    assert_eq!(fresh["source"], "cache");
    assert_eq!(fresh["timestamp"], first["timestamp"]);

    h.clock.advance(chrono::Duration::seconds(1));
    let expired = get_json(&h.router, "/api/satellites?lat=10&lng=20").await;
    assert_eq!(expired["source"], "n2yo");
    assert_eq!(h.satellites.calls(), 2);
}

#[tokio::test]
async fn solar_entry_expires_after_a_day() {
    let h = harness(Behaviour::Succeed);

    let first = get_json(&h.router, "/api/solar-system").await;
    assert_eq!(first["source"], "solar-system-api");

    h.clock.advance(chrono::Duration::hours(23));
    let fresh = get_json(&h.router, "/api/solar-system?type=planet").await;
    assert_eq!(fresh["source"], "cache");
    assert_eq!(fresh["timestamp"], first["timestamp"]);

    h.clock.advance(chrono::Duration::hours(1));
    let expired = get_json(&h.router, "/api/solar-system").await;
    assert_eq!(expired["source"], "solar-system-api");
    assert_eq!(h.solar.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn hanging_solar_api_gets_two_twenty_second_attempts() {
    let h = harness(Behaviour::Hang);
    let started = tokio::time::Instant::now();

    let body = get_json(&h.router, "/api/solar-system").await;
    let elapsed = started.elapsed();

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["bodies"].as_array().unwrap().len(), 9);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
    assert_eq!(h.solar.calls(), 2);
    // 20 s, 1 s backoff, 20 s
    assert!(
        elapsed >= Duration::from_secs(41) && elapsed < Duration::from_secs(42),
        "{:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn hanging_n2yo_gets_two_ten_second_attempts() {
    let h = harness(Behaviour::Hang);
    let started = tokio::time::Instant::now();

    let body = get_json(&h.router, "/api/satellites").await;
    let elapsed = started.elapsed();

    assert_eq!(body["source"], "fallback");
    assert_eq!(h.satellites.calls(), 2);
    // 10 s, 1 s backoff, 10 s
    assert!(
        elapsed >= Duration::from_secs(21) && elapsed < Duration::from_secs(22),
        "{:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn failing_solar_api_is_retried_once() {
    let h = harness(Behaviour::Fail);
    let body = get_json(&h.router, "/api/solar-system?type=star").await;

    assert_eq!(body["source"], "fallback");
    assert_eq!(body["filtered"], 1);
    assert!(body["error"].as_str().unwrap().contains("503"));
    assert_eq!(h.solar.calls(), 2);
}
