use rand::Rng;

use crate::models::SatelliteRecord;

pub const MAX_SATELLITES: usize = 100;

pub const CATEGORY_ISS: i64 = 2;
pub const CATEGORY_GPS: i64 = 20;
pub const CATEGORY_STARLINK: i64 = 52;

const FIRST_SATID: u64 = 25544;

/// N2YO category names by id.
const CATEGORY_NAMES: &[&str] = &[
    "All Categories",
    "Brightest",
    "ISS",
    "Weather",
    "NOAA",
    "GOES",
    "Earth Resources",
    "Search & Rescue",
    "Disaster Monitoring",
    "Tracking and Data Relay",
    "Geostationary",
    "Intelsat",
    "Gorizont",
    "Raduga",
    "Molniya",
    "Iridium",
    "Orbcomm",
    "Globalstar",
    "Amateur Radio",
    "Experimental",
    "GPS Operational",
    "Glonass Operational",
    "Galileo",
    "Satellite-Based Augmentation",
    "Navy Navigation",
    "Russian LEO Navigation",
    "Space & Earth Science",
    "Geodetic",
    "Engineering",
    "Education",
    "Military",
    "Radar Calibration",
    "CubeSats",
    "XM and Sirius",
    "TV",
    "Beidou Navigation",
    "Yaogan",
    "Westford Needles",
    "Parus",
    "Strela",
    "Gonets",
    "Tsiklon",
    "Tsikada",
    "O3B Networks",
    "Tselina",
    "Celestis",
    "IRNSS",
    "QZSS",
    "Flock",
    "Lemur",
    "GPS Constellation",
    "Glonass Constellation",
    "Starlink",
    "OneWeb",
    "Chinese Space Station",
    "Qianfan",
    "Kuiper",
];

pub fn category_name(category: i64) -> &'static str {
    usize::try_from(category)
        .ok()
        .and_then(|i| CATEGORY_NAMES.get(i))
        .copied()
        .unwrap_or("Unknown Category")
}

const ALL_POOL: &[&str] = &[
    "STARLINK-1234",
    "ISS (ZARYA)",
    "NOAA 19",
    "GPS BIIR-2",
    "IRIDIUM 33",
    "COSMOS 2251",
    "TERRA",
    "AQUA",
    "LANDSAT 8",
    "SENTINEL-1A",
];

const STARLINK_POOL: &[&str] = &[
    "STARLINK-1000", "STARLINK-1001", "STARLINK-1002", "STARLINK-1003", "STARLINK-1004",
    "STARLINK-1005", "STARLINK-1006", "STARLINK-1007", "STARLINK-1008", "STARLINK-1009",
    "STARLINK-1010", "STARLINK-1011", "STARLINK-1012", "STARLINK-1013", "STARLINK-1014",
    "STARLINK-1015", "STARLINK-1016", "STARLINK-1017", "STARLINK-1018", "STARLINK-1019",
];

/// Satellite names plausible for a category; unknown categories use the
/// mixed "all" pool.
pub fn name_pool(category: i64) -> &'static [&'static str] {
    match category {
        1 => &["ISS (ZARYA)", "IRIDIUM 33", "COSMOS 2251", "TERRA", "AQUA"],
        CATEGORY_ISS => &["ISS (ZARYA)", "PROGRESS MS-21", "SOYUZ MS-23"],
        3 => &["NOAA 19", "NOAA 18", "GOES-16", "GOES-17", "METOP-B", "METOP-C"],
        18 => &["AO-91", "AO-92", "SO-50", "ISS", "LILACSAT 2"],
        CATEGORY_GPS => &["GPS BIIR-2", "GPS BIIF-3", "GPS BIIF-4", "GPS BIIF-5"],
        CATEGORY_STARLINK => STARLINK_POOL,
        _ => ALL_POOL,
    }
}

/// Altitude band in km for a category.
pub fn altitude_band(category: i64) -> std::ops::Range<f64> {
    match category {
        CATEGORY_ISS => 400.0..420.0,
        CATEGORY_STARLINK => 540.0..560.0,
        CATEGORY_GPS => 20000.0..20200.0,
        _ => 200.0..35200.0,
    }
}

fn int_designator<R: Rng>(rng: &mut R, index: usize) -> String {
    format!(
        "{}-{:03}{}",
        1998 + index / 10,
        rng.gen_range(0..100),
        char::from(b'A' + (index % 26) as u8)
    )
}

fn launch_date<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}-{:02}-{:02}",
        rng.gen_range(2000..2024),
        rng.gen_range(1..=12),
        rng.gen_range(1..=28)
    )
}

/// Generates up to `count` (capped at [`MAX_SATELLITES`]) satellites for
/// `category`, spread over latitudes ±80° and all longitudes.
pub fn generate<R: Rng>(rng: &mut R, category: i64, count: usize) -> Vec<SatelliteRecord> {
    let names = name_pool(category);
    let band = altitude_band(category);

    (0..count.min(MAX_SATELLITES))
        .map(|i| {
            let base = names[i % names.len()];
            let satname = if i < names.len() {
                base.to_string()
            } else {
                format!("{}-{}", base, i)
            };

            SatelliteRecord {
                satid: (FIRST_SATID + i as u64).into(),
                satname,
                int_designator: int_designator(rng, i),
                launch_date: launch_date(rng),
                satlat: rng.gen_range(-80.0..=80.0),
                satlng: rng.gen_range(-180.0..=180.0),
                satalt: rng.gen_range(band.clone()),
            }
        })
        .collect()
}
