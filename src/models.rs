use serde::{Deserialize, Serialize};

/// Where the records of a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "opensky")]
    OpenSky,
    #[serde(rename = "n2yo")]
    N2yo,
    #[serde(rename = "solar-system-api")]
    SolarSystemApi,
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "mock")]
    Mock,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "emergency_fallback")]
    EmergencyFallback,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::OpenSky => "opensky",
            Source::N2yo => "n2yo",
            Source::SolarSystemApi => "solar-system-api",
            Source::Cache => "cache",
            Source::Mock => "mock",
            Source::Fallback => "fallback",
            Source::EmergencyFallback => "emergency_fallback",
        }
    }

}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Flights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightStatus {
    #[serde(rename = "En Route")]
    EnRoute,
    Landing,
    Takeoff,
    Taxiing,
    Boarding,
    Delayed,
}

impl FlightStatus {
    pub fn is_grounded(self) -> bool {
        matches!(
            self,
            FlightStatus::Taxiing | FlightStatus::Boarding | FlightStatus::Delayed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub id: String,
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Feet.
    pub altitude: f64,
    /// Knots.
    pub speed: f64,
    pub heading: f64,
    pub status: FlightStatus,
    #[serde(rename = "aircraft_type")]
    pub aircraft_type: String,
    pub origin: String,
    pub destination: String,
    pub squawk: String,
    pub registration: String,
    pub country: String,
    /// Epoch seconds.
    pub last_contact: i64,
    pub on_ground: bool,
    /// Feet per minute.
    pub vertical_rate: f64,
}

/// Body of `GET /api/states/all`. Rows stay untyped so that one bad row
/// does not reject the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenSkyResponse {
    pub states: Option<Vec<serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Satellites
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteRecord {
    /// Kept as the upstream wrote it.
    pub satid: serde_json::Number,
    pub satname: String,
    pub int_designator: String,
    pub launch_date: String,
    pub satlat: f64,
    pub satlng: f64,
    /// Kilometres.
    pub satalt: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct N2yoInfo {
    pub category: Option<String>,
    pub transactionscount: Option<u64>,
}

/// Body of the N2YO `above` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct N2yoResponse {
    pub info: Option<N2yoInfo>,
    pub above: Option<Vec<serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Solar system
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Planet,
    Moon,
    Asteroid,
    Comet,
    Star,
}

impl std::str::FromStr for BodyType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planet" => Ok(BodyType::Planet),
            "moon" => Ok(BodyType::Moon),
            "asteroid" => Ok(BodyType::Asteroid),
            "comet" => Ok(BodyType::Comet),
            "star" => Ok(BodyType::Star),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarBody {
    pub id: String,
    pub name: String,
    pub english_name: String,
    #[serde(rename = "type")]
    pub body_type: BodyType,
    pub is_planet: bool,
    /// Kilometres.
    pub radius: f64,
    /// Kilograms.
    pub mass: f64,
    /// kg/m³.
    pub density: f64,
    /// m/s².
    pub gravity: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Kilometres.
    pub distance_from_sun: f64,
    /// Days.
    pub orbital_period: f64,
    /// Hours, negative for retrograde rotation.
    pub rotation_period: f64,
    pub moons: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_body: Option<String>,
}

/// Body of `GET /rest/bodies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolarBodiesResponse {
    pub bodies: Option<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_to_wire_labels() {
        for source in [
            Source::OpenSky,
            Source::N2yo,
            Source::SolarSystemApi,
            Source::Cache,
            Source::Mock,
            Source::Fallback,
            Source::EmergencyFallback,
        ] {
            let json = serde_json::to_value(source).unwrap();
            assert_eq!(json, serde_json::Value::String(source.as_str().into()));
        }
    }

    #[test]
    fn flight_record_uses_dashboard_field_names() {
        let record = FlightRecord {
            id: "abc123".into(),
            callsign: "UAL1234".into(),
            latitude: 1.0,
            longitude: 2.0,
            altitude: 30000.0,
            speed: 450.0,
            heading: 90.0,
            status: FlightStatus::EnRoute,
            aircraft_type: "B737-800".into(),
            origin: "SFO".into(),
            destination: "JFK".into(),
            squawk: "1200".into(),
            registration: "N123AB".into(),
            country: "United States".into(),
            last_contact: 1_700_000_000,
            on_ground: false,
            vertical_rate: 0.0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "En Route");
        assert_eq!(json["aircraft_type"], "B737-800");
        assert_eq!(json["lastContact"], 1_700_000_000);
        assert_eq!(json["onGround"], false);
        assert!(json.get("verticalRate").is_some());
    }

    #[test]
    fn solar_body_omits_absent_optionals() {
        let body = SolarBody {
            id: "earth".into(),
            name: "Earth".into(),
            english_name: "Earth".into(),
            body_type: BodyType::Planet,
            is_planet: true,
            radius: 6371.0,
            mass: 5.972e24,
            density: 5514.0,
            gravity: 9.8,
            temperature: 15.0,
            distance_from_sun: 149.6e6,
            orbital_period: 365.25,
            rotation_period: 23.93,
            moons: 1,
            discovered_by: None,
            discovery_date: None,
            parent_body: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "planet");
        assert_eq!(json["englishName"], "Earth");
        assert!(json.get("parentBody").is_none());
    }
}
