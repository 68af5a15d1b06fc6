//! Turning reached edges into a single service-area polygon.

use std::any::Any;
use std::panic;

use geo::{BooleanOps, Buffer, Intersects, MultiPolygon, Relate};
use log::debug;

use crate::{Error, algo::search::ReachedEdge, geometry::has_finite_coords};

/// Buffers reached edges and unions the buffers into one polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferAssembler {
    width: f64,
}

impl BufferAssembler {
    pub fn new(width: f64) -> Self {
        Self { width }
    }

    /// Union of the buffers of all `edges`.
    ///
    /// Buffers disjoint from the accumulated polygon are retried on the
    /// next pass, after their neighbours have been joined.
    ///
    /// # Errors
    ///
    /// `Error::EmptyServiceArea` without edges, `Error::InvalidGeometry` for
    /// non-finite input, `Error::Union` for a broken union result and
    /// `Error::NoProgress` when a pass joins nothing.
    pub fn assemble(&self, edges: &[ReachedEdge]) -> Result<MultiPolygon<f64>, Error> {
        if let Some(edge) = edges.iter().find(|edge| !has_finite_coords(&edge.geometry)) {
            return Err(Error::InvalidGeometry(format!(
                "edge {} has non-finite coordinates",
                edge.edge.index()
            )));
        }

        let mut pending = edges
            .iter()
            .map(|edge| edge.geometry.buffer(self.width))
            .filter(|buffer| !buffer.0.is_empty())
            .collect::<Vec<_>>();
        if pending.is_empty() {
            return Err(Error::EmptyServiceArea);
        }

        let mut merged = pending.remove(0);
        let mut pass = 0;

        while !pending.is_empty() {
            pass += 1;
            let before = pending.len();
            let mut deferred = Vec::new();

            for buffer in pending {
                if merged.relate(&buffer).is_covers() {
                    continue;
                }
                if !merged.intersects(&buffer) {
                    deferred.push(buffer);
                    continue;
                }

                match try_union(&merged, &buffer) {
                    Some(union) if has_finite_coords(&union) => merged = union,
                    Some(_) => {
                        return Err(Error::Union(format!(
                            "union in pass {pass} produced non-finite coordinates"
                        )));
                    }
                    None => {
                        debug!("Union in pass {pass} failed on unnoded input, deferring");
                        deferred.push(buffer);
                    }
                }
            }

            if deferred.len() >= before {
                return Err(Error::NoProgress {
                    unjoined: deferred.len(),
                });
            }
            debug!("Assembly pass {pass} left {} buffers", deferred.len());
            pending = deferred;
        }

        Ok(merged)
    }
}

/// Union two polygons, `None` if the overlay engine panics.
///
/// The panic hook is process-wide and left to the binary, so the default
/// hook still reports the panic on stderr.
fn try_union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    match panic::catch_unwind(panic::AssertUnwindSafe(|| a.union(b))) {
        Ok(union) => Some(union),
        Err(payload) => {
            debug!("Overlay engine panicked: {}", panic_message(payload.as_ref()));
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
