//! Default observer resolution for the satellites endpoint.
//!
//! Requests without `lat`/`lng` are answered relative to a default
//! observer. That observer comes from the config file, or, when
//! `observer.geolocate_ip` is set, from IP geolocation at start-up.

use ipgeolocate::{Locator, Service};
use tracing::{error, info};

use crate::api::Observer;
use crate::config::ObserverConfig;

/// Resolves the default observer.
///
/// Uses the [IpApi](https://ip-api.com/) service when an address is
/// configured. On network or service failure, or when the reported
/// coordinates don't parse, logs an error and keeps the configured
/// coordinates so the server can still start.
pub async fn resolve_default_observer(config: &ObserverConfig) -> Observer {
    let fallback = config.observer();
    let Some(ip) = config.geolocate_ip.as_deref() else {
        return fallback;
    };

    match Locator::get(ip, Service::IpApi).await {
        Ok(loc) => match parse_coords(&loc.latitude, &loc.longitude) {
            Some((latitude, longitude)) => {
                info!("Geolocation successful - ({}, {})", latitude, longitude);
                Observer {
                    latitude,
                    longitude,
                    altitude: fallback.altitude,
                }
            }
            None => {
                error!(
                    "Geolocation returned unusable coordinates ({}, {}). Using configured observer.",
                    loc.latitude, loc.longitude
                );
                fallback
            }
        },
        Err(e) => {
            error!(
                "Error using geolocation service: {}. Using configured observer.",
                e
            );
            fallback
        }
    }
}

fn parse_coords(lat: &str, lon: &str) -> Option<(f64, f64)> {
    let lat = lat.trim().parse::<f64>().ok().filter(|v| v.abs() <= 90.0)?;
    let lon = lon.trim().parse::<f64>().ok().filter(|v| v.abs() <= 180.0)?;
    Some((lat, lon))
}
