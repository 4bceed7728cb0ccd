//! Conversion of raw upstream JSON into the stable record shapes.
//!
//! Every function here is pure: identical input (including `now`) yields
//! identical output. Rows that cannot be salvaged are dropped; a missing
//! top-level array is reported as [`UpstreamError::Malformed`] before any
//! row is looked at.

use serde_json::Value;

use crate::api::{N2YO, OPENSKY, SOLAR_SYSTEM};
use crate::error::UpstreamError;
use crate::models::{
    BodyType, FlightRecord, FlightStatus, N2yoResponse, OpenSkyResponse, SatelliteRecord,
    SolarBodiesResponse, SolarBody,
};

const MS_TO_KNOTS: f64 = 1.94384;
const M_TO_FT: f64 = 3.28084;
const MS_TO_FT_PER_MIN: f64 = 196.850_394;
const CALLSIGN_MAX: usize = 10;
const REGISTRATION_MAX: usize = 10;
const COUNTRY_MAX: usize = 50;
const OPENSKY_ROW_FIELDS: usize = 17;

/// JS-style numeric coercion: numbers and numeric strings are accepted,
/// anything else (including non-finite values) is `None`.
pub fn safe_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Stable pseudo-random heading in `[0, 360)` derived from the aircraft id.
///
/// Stands in for a missing `true_track` without making normalization
/// nondeterministic.
pub fn placeholder_heading(seed: &str) -> f64 {
    // FNV-1a
    let hash = seed
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3));
    (hash % 36_000) as f64 / 100.0
}

fn is_squawk(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Output of [`normalize_flights`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFlights {
    pub flights: Vec<FlightRecord>,
    /// Number of state vectors the upstream reported, before filtering.
    pub upstream_total: usize,
}

/// Maps OpenSky state vectors onto [`FlightRecord`]s, keeping at most
/// `limit` valid rows. `now_secs` backs a missing `last_contact`.
pub fn normalize_flights(
    raw: &OpenSkyResponse,
    limit: usize,
    now_secs: i64,
) -> Result<NormalizedFlights, UpstreamError> {
    let states = raw
        .states
        .as_ref()
        .ok_or_else(|| UpstreamError::malformed(OPENSKY, "missing states array"))?;
    if states.is_empty() {
        return Err(UpstreamError::malformed(OPENSKY, "empty states array"));
    }

    let flights = states
        .iter()
        .filter_map(|row| row.as_array())
        .filter(|row| has_valid_position(row))
        .take(limit)
        .enumerate()
        .map(|(index, row)| flight_from_state(row, index, now_secs))
        .collect();

    Ok(NormalizedFlights {
        flights,
        upstream_total: states.len(),
    })
}

fn has_valid_position(row: &[Value]) -> bool {
    if row.len() < OPENSKY_ROW_FIELDS {
        return false;
    }
    match (safe_number(row.get(5)), safe_number(row.get(6))) {
        (Some(lng), Some(lat)) => lng.abs() <= 180.0 && lat.abs() <= 90.0,
        _ => false,
    }
}

fn flight_from_state(row: &[Value], index: usize, now_secs: i64) -> FlightRecord {
    let text = |i: usize| {
        row.get(i)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let number = |i: usize| safe_number(row.get(i));

    let icao24 = text(0);
    let id = icao24
        .map(str::to_string)
        .unwrap_or_else(|| format!("live_{}", index));
    let callsign = text(1)
        .map(str::to_string)
        .unwrap_or_else(|| format!("UNKN{:03}", index));
    let on_ground = row.get(8).and_then(Value::as_bool).unwrap_or(false);

    FlightRecord {
        callsign: truncate(&callsign, CALLSIGN_MAX),
        latitude: number(6).unwrap_or(0.0),
        longitude: number(5).unwrap_or(0.0),
        altitude: number(7).map_or(0.0, |m| (m * M_TO_FT).max(0.0)),
        speed: number(9).map_or(0.0, |v| (v * MS_TO_KNOTS).max(0.0)),
        heading: number(10)
            .map(|h| h.rem_euclid(360.0))
            .filter(|h| *h < 360.0)
            .unwrap_or_else(|| placeholder_heading(&id)),
        status: if on_ground {
            FlightStatus::Taxiing
        } else {
            FlightStatus::EnRoute
        },
        aircraft_type: "Unknown".to_string(),
        origin: "LIVE".to_string(),
        destination: "DATA".to_string(),
        squawk: text(14)
            .filter(|s| is_squawk(s))
            .unwrap_or("0000")
            .to_string(),
        registration: truncate(
            &icao24
                .map(str::to_uppercase)
                .unwrap_or_else(|| format!("REG{}", index)),
            REGISTRATION_MAX,
        ),
        country: truncate(text(2).unwrap_or("Unknown"), COUNTRY_MAX),
        last_contact: number(4).map_or(now_secs, |t| t as i64),
        on_ground,
        vertical_rate: number(11).map_or(0.0, |v| v * MS_TO_FT_PER_MIN),
        id,
    }
}

/// Maps the N2YO `above` list onto [`SatelliteRecord`]s.
pub fn normalize_satellites(raw: &N2yoResponse) -> Result<Vec<SatelliteRecord>, UpstreamError> {
    let above = raw
        .above
        .as_ref()
        .ok_or_else(|| UpstreamError::malformed(N2YO, "missing or invalid satellites array"))?;

    Ok(above.iter().filter_map(satellite_from_row).collect())
}

fn satellite_from_row(row: &Value) -> Option<SatelliteRecord> {
    // Any JSON number is a usable id; it is passed through unchanged
    let satid = match row.get("satid")? {
        Value::Number(n) if n.as_f64().is_some_and(f64::is_finite) => n.clone(),
        _ => return None,
    };
    let satname = row.get("satname")?.as_str()?;
    // Strict typing here: numeric strings are rejected
    let coord = |field: &str| row.get(field).and_then(Value::as_f64).filter(|n| n.is_finite());
    let satlat = coord("satlat").filter(|lat| lat.abs() <= 90.0)?;
    let satlng = coord("satlng").filter(|lng| lng.abs() <= 180.0)?;
    let satalt = coord("satalt")?;

    Some(SatelliteRecord {
        satid,
        satname: satname.trim().to_string(),
        int_designator: text(row, "intDesignator").unwrap_or("Unknown").to_string(),
        launch_date: text(row, "launchDate").unwrap_or("Unknown").to_string(),
        satlat,
        satlng,
        satalt,
    })
}

/// Non-empty string field; any other type reads as absent.
fn text<'a>(row: &'a Value, field: &str) -> Option<&'a str> {
    row.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn number_or_zero(row: &Value, field: &str) -> f64 {
    safe_number(row.get(field)).unwrap_or(0.0)
}

/// Maps Solar System OpenData bodies onto [`SolarBody`]s.
///
/// Fields are read one at a time, so a wrongly typed optional field only
/// loses that field, never the whole body.
pub fn normalize_bodies(raw: &SolarBodiesResponse) -> Result<Vec<SolarBody>, UpstreamError> {
    let bodies = raw
        .bodies
        .as_ref()
        .ok_or_else(|| UpstreamError::malformed(SOLAR_SYSTEM, "missing or invalid bodies array"))?;

    Ok(bodies.iter().filter_map(body_from_row).collect())
}

fn parent_planet(row: &Value) -> Option<&str> {
    row.get("aroundPlanet")?.get("planet")?.as_str()
}

/// Type precedence: the sun, then planets, then anything orbiting a planet,
/// then comets; everything else is an asteroid.
fn classify(row: &Value, id: &str) -> BodyType {
    let around_planet = row.get("aroundPlanet").is_some_and(Value::is_object);
    if id == "soleil" {
        BodyType::Star
    } else if row.get("isPlanet").and_then(Value::as_bool).unwrap_or(false) {
        BodyType::Planet
    } else if around_planet {
        BodyType::Moon
    } else if text(row, "bodyType") == Some("Comet") {
        BodyType::Comet
    } else {
        BodyType::Asteroid
    }
}

fn mass_kg(mass: Option<&Value>) -> f64 {
    let Some(mass) = mass else { return 0.0 };
    match (safe_number(mass.get("massValue")), safe_number(mass.get("massExponent"))) {
        (Some(v), Some(e)) => {
            let kg = v * 10f64.powf(e);
            if kg.is_finite() {
                kg
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

fn body_from_row(row: &Value) -> Option<SolarBody> {
    let id = text(row, "id")?.to_string();
    let english_name = text(row, "englishName")?.to_string();
    let body_type = classify(row, &id);

    let mean_radius = number_or_zero(row, "meanRadius");
    let radius = if mean_radius != 0.0 {
        mean_radius
    } else {
        number_or_zero(row, "equaRadius")
    };
    // upstream reports Kelvin, 0 when unknown
    let kelvin = number_or_zero(row, "avgTemp");
    let temperature = if kelvin > 0.0 { kelvin - 273.15 } else { 0.0 };

    Some(SolarBody {
        name: text(row, "name").unwrap_or(english_name.as_str()).to_string(),
        body_type,
        is_planet: row.get("isPlanet").and_then(Value::as_bool).unwrap_or(false),
        radius,
        mass: mass_kg(row.get("mass")),
        density: number_or_zero(row, "density"),
        gravity: number_or_zero(row, "gravity"),
        temperature,
        distance_from_sun: number_or_zero(row, "semimajorAxis"),
        orbital_period: number_or_zero(row, "sideralOrbit"),
        rotation_period: number_or_zero(row, "sideralRotation"),
        moons: row
            .get("moons")
            .and_then(Value::as_array)
            .map_or(0, |m| m.len() as u32),
        discovered_by: text(row, "discoveredBy").map(str::to_string),
        discovery_date: text(row, "discoveryDate").map(str::to_string),
        parent_body: parent_planet(row)
            .filter(|_| body_type == BodyType::Moon)
            .map(str::to_string),
        id,
        english_name,
    })
}
