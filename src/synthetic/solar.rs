use crate::models::{BodyType, SolarBody};

struct BodyRow {
    id: &'static str,
    name: &'static str,
    body_type: BodyType,
    radius: f64,
    mass: f64,
    density: f64,
    gravity: f64,
    temperature: f64,
    distance_from_sun: f64,
    orbital_period: f64,
    rotation_period: f64,
    moons: u32,
}

// Sun first, then planets outward.
const BODIES: [BodyRow; 9] = [
    BodyRow { id: "sun", name: "Sun", body_type: BodyType::Star, radius: 696_340.0, mass: 1.989e30, density: 1408.0, gravity: 274.0, temperature: 5505.0, distance_from_sun: 0.0, orbital_period: 0.0, rotation_period: 25.05, moons: 0 },
    BodyRow { id: "mercury", name: "Mercury", body_type: BodyType::Planet, radius: 2439.7, mass: 3.301e23, density: 5427.0, gravity: 3.7, temperature: 167.0, distance_from_sun: 57.9e6, orbital_period: 88.0, rotation_period: 1407.6, moons: 0 },
    BodyRow { id: "venus", name: "Venus", body_type: BodyType::Planet, radius: 6051.8, mass: 4.867e24, density: 5243.0, gravity: 8.87, temperature: 464.0, distance_from_sun: 108.2e6, orbital_period: 225.0, rotation_period: -5832.5, moons: 0 },
    BodyRow { id: "earth", name: "Earth", body_type: BodyType::Planet, radius: 6371.0, mass: 5.972e24, density: 5514.0, gravity: 9.8, temperature: 15.0, distance_from_sun: 149.6e6, orbital_period: 365.25, rotation_period: 23.93, moons: 1 },
    BodyRow { id: "mars", name: "Mars", body_type: BodyType::Planet, radius: 3389.5, mass: 6.39e23, density: 3933.0, gravity: 3.71, temperature: -65.0, distance_from_sun: 227.9e6, orbital_period: 687.0, rotation_period: 24.62, moons: 2 },
    BodyRow { id: "jupiter", name: "Jupiter", body_type: BodyType::Planet, radius: 69_911.0, mass: 1.898e27, density: 1326.0, gravity: 24.79, temperature: -110.0, distance_from_sun: 778.5e6, orbital_period: 4333.0, rotation_period: 9.93, moons: 95 },
    BodyRow { id: "saturn", name: "Saturn", body_type: BodyType::Planet, radius: 58_232.0, mass: 5.683e26, density: 687.0, gravity: 10.44, temperature: -140.0, distance_from_sun: 1432e6, orbital_period: 10_759.0, rotation_period: 10.66, moons: 146 },
    BodyRow { id: "uranus", name: "Uranus", body_type: BodyType::Planet, radius: 25_362.0, mass: 8.681e25, density: 1271.0, gravity: 8.69, temperature: -195.0, distance_from_sun: 2867e6, orbital_period: 30_687.0, rotation_period: -17.24, moons: 28 },
    BodyRow { id: "neptune", name: "Neptune", body_type: BodyType::Planet, radius: 24_622.0, mass: 1.024e26, density: 1638.0, gravity: 11.15, temperature: -200.0, distance_from_sun: 4515e6, orbital_period: 60_190.0, rotation_period: 16.11, moons: 16 },
];

/// The Sun and the eight planets with fixed physical constants.
pub fn generate() -> Vec<SolarBody> {
    BODIES
        .iter()
        .map(|row| SolarBody {
            id: row.id.to_string(),
            name: row.name.to_string(),
            english_name: row.name.to_string(),
            body_type: row.body_type,
            is_planet: row.body_type == BodyType::Planet,
            radius: row.radius,
            mass: row.mass,
            density: row.density,
            gravity: row.gravity,
            temperature: row.temperature,
            distance_from_sun: row.distance_from_sun,
            orbital_period: row.orbital_period,
            rotation_period: row.rotation_period,
            moons: row.moons,
            discovered_by: None,
            discovery_date: None,
            parent_body: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_star_eight_planets() {
        let bodies = generate();
        assert_eq!(bodies.len(), 9);
        assert_eq!(bodies.iter().filter(|b| b.body_type == BodyType::Star).count(), 1);
        assert_eq!(bodies.iter().filter(|b| b.body_type == BodyType::Planet).count(), 8);
        for b in &bodies {
            assert!(b.radius > 0.0 && b.mass > 0.0 && b.gravity > 0.0, "{}", b.id);
            assert_eq!(b.is_planet, b.body_type == BodyType::Planet);
            assert!(b.parent_body.is_none());
        }
    }

    #[test]
    fn planets_in_order_from_the_sun() {
        let ids: Vec<String> = generate()
            .into_iter()
            .filter(|b| b.is_planet)
            .map(|b| b.id)
            .collect();
        assert_eq!(
            ids,
            ["mercury", "venus", "earth", "mars", "jupiter", "saturn", "uranus", "neptune"]
        );
    }

    #[test]
    fn retrograde_rotation_is_negative() {
        let bodies = generate();
        let venus = bodies.iter().find(|b| b.id == "venus").unwrap();
        let uranus = bodies.iter().find(|b| b.id == "uranus").unwrap();
        assert!(venus.rotation_period < 0.0);
        assert!(uranus.rotation_period < 0.0);
    }

    #[test]
    fn temperatures_are_celsius() {
        let bodies = generate();
        let sun = bodies.iter().find(|b| b.id == "sun").unwrap();
        let earth = bodies.iter().find(|b| b.id == "earth").unwrap();
        assert!((sun.temperature - (5778.0 - 273.15)).abs() < 1.0);
        assert_eq!(earth.temperature, 15.0);
    }

    #[test]
    fn table_is_fixed() {
        assert_eq!(generate(), generate());
    }
}
