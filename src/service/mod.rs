//! Per-domain request pipelines.
//!
//! Each service walks the same states: cache check, mock short-circuit,
//! upstream attempt(s), normalization, cache write, response. Upstream
//! failures degrade to locally generated data tagged `fallback`; anything
//! else that goes wrong, panics included, ends in `emergency_fallback`.
//! [`handle`](FlightService::handle) is infallible by construction.

mod flights;
mod satellites;
mod solar;

pub use flights::{FlightQuery, FlightService, FlightSettings, FlightsResponse, MAX_LIMIT as MAX_FLIGHT_LIMIT};
pub use satellites::{SatelliteQuery, SatelliteService, SatelliteSettings, SatellitesResponse};
pub use solar::{SolarQuery, SolarService, SolarSettings, SolarSystemResponse};

use futures::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;

use crate::error::{panic_message, PipelineError, PipelineResult};

/// Random source shared by a service's generators.
pub(crate) struct RngCell {
    rng: Mutex<StdRng>,
}

impl RngCell {
    pub(crate) fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub(crate) fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> PipelineResult<T> {
        let mut rng = self.rng.lock().map_err(|_| PipelineError::Poisoned("rng"))?;
        Ok(f(&mut rng))
    }
}

/// Runs a pipeline, turning a panic into [`PipelineError::Panicked`].
pub(crate) async fn guarded<T, F>(pipeline: F) -> PipelineResult<T>
where
    F: Future<Output = PipelineResult<T>>,
{
    match AssertUnwindSafe(pipeline).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(PipelineError::Panicked(panic_message(payload))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[tokio::test]
    async fn guarded_passes_results_through() {
        let ok = guarded(async { Ok::<_, PipelineError>(5) }).await;
        assert_eq!(ok.unwrap(), 5);
    }

    fn explode() -> PipelineResult<()> {
        panic!("normalizer exploded")
    }

    #[tokio::test]
    async fn guarded_catches_panics() {
        let result = guarded(async { explode() }).await;
        match result {
            Err(PipelineError::Panicked(msg)) => assert_eq!(msg, "normalizer exploded"),
            other => panic!("expected panic error, got {:?}", other),
        }
    }

    #[test]
    fn seeded_cells_repeat() {
        let a = RngCell::seeded(1).with(|r| r.gen::<u64>()).unwrap();
        let b = RngCell::seeded(1).with(|r| r.gen::<u64>()).unwrap();
        assert_eq!(a, b);
    }
}
