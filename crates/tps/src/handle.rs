//! Shared handle to the active warp.
//!
//! Control points change rarely (a user drags a point, adjusts an offset);
//! transforms run constantly. The handle keeps the current fitted warp
//! behind an `Arc` and replaces it wholesale when the control points change.
//! Readers holding an older `Arc` keep using the old coefficients until they
//! drop it; nothing is ever edited in place.

use crate::transform::ThinPlateSpline;
use georef_common::{GeorefResult, Point2D};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Atomically swappable reference to the current warp.
pub struct WarpHandle {
    current: RwLock<Arc<ThinPlateSpline>>,
    generation: AtomicU64,
}

impl WarpHandle {
    /// Fit the initial warp. Fails if the control points are degenerate.
    pub fn new(source: &[Point2D], target: &[Point2D]) -> GeorefResult<Self> {
        let tps = ThinPlateSpline::fit(source, target)?;
        Ok(Self::from_warp(tps))
    }

    pub fn from_warp(tps: ThinPlateSpline) -> Self {
        Self {
            current: RwLock::new(Arc::new(tps)),
            generation: AtomicU64::new(0),
        }
    }

    /// The warp in effect right now.
    pub fn current(&self) -> Arc<ThinPlateSpline> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Refit from new control points and swap the result in.
    ///
    /// On error the previous warp stays active and the generation is
    /// unchanged. Returns the new generation on success.
    pub fn update(&self, source: &[Point2D], target: &[Point2D]) -> GeorefResult<u64> {
        let tps = match ThinPlateSpline::fit(source, target) {
            Ok(tps) => tps,
            Err(e) => {
                warn!(
                    error = %e,
                    generation = self.generation(),
                    "Keeping previous warp; new control points rejected"
                );
                return Err(e);
            }
        };
        Ok(self.replace(tps))
    }

    /// Swap in an already fitted warp. Returns the new generation.
    pub fn replace(&self, tps: ThinPlateSpline) -> u64 {
        let points = tps.coefficients().len();
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(tps);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(guard);

        info!(generation, points, "Swapped active warp");
        generation
    }

    /// Number of successful swaps since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
