use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{FlightRecord, FlightStatus};

pub const MAX_FLIGHTS: usize = 1000;

/// Half-width of the positional jitter, degrees.
const JITTER_DEG: f64 = 0.25;

#[derive(Debug, Clone, Copy)]
pub struct Airline {
    pub code: &'static str,
    pub country: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct AircraftType {
    pub model: &'static str,
    pub cruise_altitude: f64,
    pub cruise_speed: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Airport {
    pub code: &'static str,
    pub lat: f64,
    pub lng: f64,
}

pub const AIRLINES: &[Airline] = &[
    Airline { code: "UAL", country: "United States" },
    Airline { code: "DAL", country: "United States" },
    Airline { code: "AAL", country: "United States" },
    Airline { code: "SWA", country: "United States" },
    Airline { code: "JBU", country: "United States" },
    Airline { code: "BAW", country: "United Kingdom" },
    Airline { code: "VIR", country: "United Kingdom" },
    Airline { code: "AFR", country: "France" },
    Airline { code: "DLH", country: "Germany" },
    Airline { code: "KLM", country: "Netherlands" },
    Airline { code: "EK", country: "United Arab Emirates" },
    Airline { code: "QR", country: "Qatar" },
    Airline { code: "SQ", country: "Singapore" },
    Airline { code: "CX", country: "Hong Kong" },
    Airline { code: "NH", country: "Japan" },
    Airline { code: "JL", country: "Japan" },
    Airline { code: "KE", country: "South Korea" },
    Airline { code: "AC", country: "Canada" },
    Airline { code: "QF", country: "Australia" },
    Airline { code: "TK", country: "Turkey" },
];

pub const AIRCRAFT: &[AircraftType] = &[
    AircraftType { model: "B737-800", cruise_altitude: 37000.0, cruise_speed: 450.0 },
    AircraftType { model: "A320-200", cruise_altitude: 36000.0, cruise_speed: 440.0 },
    AircraftType { model: "B777-300ER", cruise_altitude: 41000.0, cruise_speed: 490.0 },
    AircraftType { model: "A350-900", cruise_altitude: 42000.0, cruise_speed: 485.0 },
    AircraftType { model: "B787-9", cruise_altitude: 43000.0, cruise_speed: 480.0 },
    AircraftType { model: "A330-300", cruise_altitude: 38000.0, cruise_speed: 470.0 },
    AircraftType { model: "B747-8F", cruise_altitude: 39000.0, cruise_speed: 475.0 },
    AircraftType { model: "A380-800", cruise_altitude: 41000.0, cruise_speed: 485.0 },
    AircraftType { model: "B737 MAX 8", cruise_altitude: 37000.0, cruise_speed: 455.0 },
    AircraftType { model: "A321neo", cruise_altitude: 38000.0, cruise_speed: 450.0 },
    AircraftType { model: "CRJ-900", cruise_altitude: 35000.0, cruise_speed: 420.0 },
    AircraftType { model: "E190", cruise_altitude: 36000.0, cruise_speed: 430.0 },
];

pub const AIRPORTS: &[Airport] = &[
    Airport { code: "LAX", lat: 33.9425, lng: -118.4081 },
    Airport { code: "JFK", lat: 40.6413, lng: -73.7781 },
    Airport { code: "LHR", lat: 51.47, lng: -0.4543 },
    Airport { code: "CDG", lat: 49.0097, lng: 2.5479 },
    Airport { code: "NRT", lat: 35.772, lng: 140.3929 },
    Airport { code: "SYD", lat: -33.9399, lng: 151.1753 },
    Airport { code: "DXB", lat: 25.2532, lng: 55.3657 },
    Airport { code: "SIN", lat: 1.3644, lng: 103.9915 },
    Airport { code: "ORD", lat: 41.9742, lng: -87.9073 },
    Airport { code: "ATL", lat: 33.6407, lng: -84.4277 },
    Airport { code: "DEN", lat: 39.8561, lng: -104.6737 },
    Airport { code: "DFW", lat: 32.8998, lng: -97.0403 },
    Airport { code: "SEA", lat: 47.4502, lng: -122.3088 },
    Airport { code: "SFO", lat: 37.6213, lng: -122.379 },
    Airport { code: "MIA", lat: 25.7959, lng: -80.287 },
    Airport { code: "FRA", lat: 50.0379, lng: 8.5622 },
    Airport { code: "AMS", lat: 52.3105, lng: 4.7683 },
    Airport { code: "MAD", lat: 40.4839, lng: -3.568 },
    Airport { code: "FCO", lat: 41.8003, lng: 12.2389 },
    Airport { code: "IST", lat: 41.2753, lng: 28.7519 },
];

/// The table picks for one synthetic flight.
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub airline: &'static Airline,
    pub aircraft: &'static AircraftType,
    pub origin: &'static Airport,
    pub destination: &'static Airport,
}

/// Phase-dependent kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub status: FlightStatus,
    pub altitude: f64,
    pub speed: f64,
    pub vertical_rate: f64,
    pub on_ground: bool,
}

/// Picks airline, aircraft and two distinct airports.
pub fn pick_route<R: Rng>(rng: &mut R) -> Route {
    let origin_idx = rng.gen_range(0..AIRPORTS.len());
    // Offset keeps the destination distinct from the origin
    let dest_idx = (origin_idx + rng.gen_range(1..AIRPORTS.len())) % AIRPORTS.len();
    Route {
        airline: AIRLINES.choose(rng).unwrap_or(&AIRLINES[0]),
        aircraft: AIRCRAFT.choose(rng).unwrap_or(&AIRCRAFT[0]),
        origin: &AIRPORTS[origin_idx],
        destination: &AIRPORTS[dest_idx],
    }
}

/// Linear interpolation along the route, `progress` in `[0, 1]`.
pub fn interpolate(origin: &Airport, destination: &Airport, progress: f64) -> (f64, f64) {
    (
        origin.lat + (destination.lat - origin.lat) * progress,
        origin.lng + (destination.lng - origin.lng) * progress,
    )
}

/// Displaces a position by up to ±0.25° on each axis.
pub fn jitter<R: Rng>(rng: &mut R, lat: f64, lng: f64) -> (f64, f64) {
    let lat = lat + rng.gen_range(-JITTER_DEG..=JITTER_DEG);
    let lng = lng + rng.gen_range(-JITTER_DEG..=JITTER_DEG);
    (lat.clamp(-90.0, 90.0), lng.clamp(-180.0, 180.0))
}

/// Initial bearing from `(lat, lng)` toward `(to_lat, to_lng)` on the flat
/// map projection, degrees in `[0, 360)`.
pub fn bearing(lat: f64, lng: f64, to_lat: f64, to_lng: f64) -> f64 {
    let deg = (to_lng - lng).atan2(to_lat - lat).to_degrees();
    let deg = deg.rem_euclid(360.0);
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

/// Flight phase for a given progress along the route.
///
/// The first and last 5% are departure and arrival: either airborne
/// (takeoff/landing) or taxiing on the ground. Everything in between
/// cruises near the aircraft's nominal altitude and speed.
pub fn flight_phase<R: Rng>(rng: &mut R, aircraft: &AircraftType, progress: f64) -> Phase {
    let taxiing = Phase {
        status: FlightStatus::Taxiing,
        altitude: 0.0,
        speed: rng.gen_range(5.0..30.0),
        vertical_rate: 0.0,
        on_ground: true,
    };

    if progress < 0.05 {
        if rng.gen_bool(0.5) {
            Phase {
                status: FlightStatus::Takeoff,
                altitude: rng.gen_range(500.0..5500.0),
                speed: rng.gen_range(150.0..250.0),
                vertical_rate: rng.gen_range(1000.0..3000.0),
                on_ground: false,
            }
        } else {
            taxiing
        }
    } else if progress > 0.95 {
        if rng.gen_bool(0.5) {
            Phase {
                status: FlightStatus::Landing,
                altitude: rng.gen_range(200.0..3200.0),
                speed: rng.gen_range(120.0..200.0),
                vertical_rate: rng.gen_range(-1500.0..-500.0),
                on_ground: false,
            }
        } else {
            taxiing
        }
    } else {
        Phase {
            status: FlightStatus::EnRoute,
            altitude: (aircraft.cruise_altitude + rng.gen_range(-2000.0..2000.0)).max(0.0),
            speed: (aircraft.cruise_speed + rng.gen_range(-25.0..25.0)).max(0.0),
            vertical_rate: rng.gen_range(-500.0..500.0),
            on_ground: false,
        }
    }
}

fn letter<R: Rng>(rng: &mut R) -> char {
    char::from(b'A' + rng.gen_range(0..26u8))
}

/// Registration mark in the style of the airline's home register.
pub fn registration_for<R: Rng>(rng: &mut R, airline: &Airline) -> String {
    match airline.country {
        "United States" => format!(
            "N{}{}{}",
            rng.gen_range(100..1000),
            letter(rng),
            letter(rng)
        ),
        "United Kingdom" => format!(
            "G-{}{}{}{}",
            letter(rng),
            letter(rng),
            letter(rng),
            letter(rng)
        ),
        _ => format!("{}-{:03}", airline.code, rng.gen_range(0..1000)),
    }
}

/// Transponder code, four octal digits.
pub fn squawk<R: Rng>(rng: &mut R) -> String {
    (0..4)
        .map(|_| char::from(b'0' + rng.gen_range(0..8u8)))
        .collect()
}

/// Generates up to `limit` (capped at [`MAX_FLIGHTS`]) plausible flights.
pub fn generate<R: Rng>(rng: &mut R, limit: usize, now_secs: i64) -> Vec<FlightRecord> {
    (0..limit.min(MAX_FLIGHTS))
        .map(|i| generate_one(rng, i, now_secs))
        .collect()
}

fn generate_one<R: Rng>(rng: &mut R, index: usize, now_secs: i64) -> FlightRecord {
    let route = pick_route(rng);
    let progress: f64 = rng.gen();
    let (lat, lng) = interpolate(route.origin, route.destination, progress);
    let (lat, lng) = jitter(rng, lat, lng);
    let phase = flight_phase(rng, route.aircraft, progress);

    FlightRecord {
        id: format!("mock_{:06}", index),
        callsign: format!("{}{}", route.airline.code, rng.gen_range(1000..10000)),
        latitude: lat,
        longitude: lng,
        altitude: phase.altitude,
        speed: phase.speed,
        heading: bearing(lat, lng, route.destination.lat, route.destination.lng),
        status: phase.status,
        aircraft_type: route.aircraft.model.to_string(),
        origin: route.origin.code.to_string(),
        destination: route.destination.code.to_string(),
        squawk: squawk(rng),
        registration: registration_for(rng, route.airline),
        country: route.airline.country.to_string(),
        last_contact: now_secs - rng.gen_range(0..60),
        on_ground: phase.on_ground,
        vertical_rate: phase.vertical_rate,
    }
}
