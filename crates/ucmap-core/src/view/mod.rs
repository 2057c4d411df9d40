//! Reconciles the filter output against a rendering surface.
//!
//! Every sync is a full rebuild: the new [`MarkerLayer`] is built off-surface
//! and handed over in a single [`MapSurface::replace_markers`] call, so the
//! surface only ever shows the previous layer, the new layer, or nothing.
//! Surface failures are reported in the returned [`SyncReport`] instead of
//! aborting the cycle.

pub mod cluster;
pub mod marker;
pub mod viewport;

use serde::Serialize;
use thiserror::Error;

use crate::overlay::BoundaryOverlay;
use crate::palette::Palette;
use crate::unit::Unit;

pub use cluster::{cluster_markers, Cluster};
pub use marker::{Bounds, LayerMode, Marker, MarkerLayer, Popup, MISSING_FIELD};
pub use viewport::{fit_viewport, ScreenSize, Viewport};

/// Padding, in pixels, kept around the markers when refitting the viewport.
pub const FIT_PADDING: [u32; 2] = [40, 40];

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("marker layer rejected: {0}")]
    LayerRejected(String),

    #[error("viewport fit failed: {0}")]
    Viewport(String),

    #[error("overlay rejected: {0}")]
    Overlay(String),
}

/// The map the pipeline draws on.
pub trait MapSurface {
    /// Swaps the current marker layer for `layer`. On error the surface must
    /// still hold its previous layer.
    fn replace_markers(&mut self, layer: MarkerLayer) -> Result<(), SurfaceError>;

    /// Removes every marker. Cannot fail.
    fn clear_markers(&mut self);

    fn fit_bounds(&mut self, bounds: Bounds, padding: [u32; 2]) -> Result<(), SurfaceError>;

    fn add_overlay(&mut self, overlay: BoundaryOverlay) -> Result<(), SurfaceError>;
}

/// Result of one best-effort surface operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum SurfaceOutcome {
    Applied,
    Skipped,
    Failed(String),
}

impl SurfaceOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, SurfaceOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Units handed in by the filter engine.
    pub visible: usize,
    /// Markers now on the surface.
    pub rendered: usize,
    /// Visible units dropped for lack of coordinates.
    pub skipped_unmappable: usize,
    pub mode: LayerMode,
    pub layer: SurfaceOutcome,
    pub viewport: SurfaceOutcome,
}

#[derive(Debug, Clone)]
pub struct ViewSynchronizer {
    palette: Palette,
    padding: [u32; 2],
}

impl Default for ViewSynchronizer {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl ViewSynchronizer {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            padding: FIT_PADDING,
        }
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Builds the marker layer for `units` without touching any surface.
    /// Returns the layer and how many units were skipped.
    #[must_use]
    pub fn build_layer(&self, units: &[&Unit], clustering: bool) -> (MarkerLayer, usize) {
        let markers: Vec<Marker> = units
            .iter()
            .filter_map(|u| Marker::for_unit(u, &self.palette))
            .collect();
        let skipped = units.len() - markers.len();
        (
            MarkerLayer {
                mode: LayerMode::from_clustering(clustering),
                markers,
            },
            skipped,
        )
    }

    /// Replaces the surface's markers with those for `units` and refits the
    /// viewport when at least one marker exists.
    pub fn sync<S>(&self, surface: &mut S, units: &[&Unit], clustering: bool) -> SyncReport
    where
        S: MapSurface + ?Sized,
    {
        let (layer, skipped_unmappable) = self.build_layer(units, clustering);
        let mode = layer.mode;
        let bounds = layer.bounds();
        let marker_count = layer.markers.len();

        let (layer_outcome, rendered) = match surface.replace_markers(layer) {
            Ok(()) => (SurfaceOutcome::Applied, marker_count),
            Err(err) => {
                tracing::warn!(error = %err, "surface rejected marker layer; clearing markers");
                surface.clear_markers();
                (SurfaceOutcome::Failed(err.to_string()), 0)
            }
        };

        let viewport = match bounds {
            Some(bounds) if rendered > 0 => match surface.fit_bounds(bounds, self.padding) {
                Ok(()) => SurfaceOutcome::Applied,
                Err(err) => {
                    tracing::warn!(error = %err, "viewport refit failed; keeping current view");
                    SurfaceOutcome::Failed(err.to_string())
                }
            },
            _ => SurfaceOutcome::Skipped,
        };

        tracing::debug!(
            visible = units.len(),
            rendered,
            skipped_unmappable,
            ?mode,
            "map synchronized"
        );

        SyncReport {
            visible: units.len(),
            rendered,
            skipped_unmappable,
            mode,
            layer: layer_outcome,
            viewport,
        }
    }
}

/// Attaches the boundary overlay; failure is logged and reported, never
/// propagated.
pub fn attach_overlay<S>(surface: &mut S, overlay: BoundaryOverlay) -> SurfaceOutcome
where
    S: MapSurface + ?Sized,
{
    let features = overlay.len();
    match surface.add_overlay(overlay) {
        Ok(()) => {
            tracing::debug!(features, "boundary overlay attached");
            SurfaceOutcome::Applied
        }
        Err(err) => {
            tracing::warn!(error = %err, "boundary overlay not attached");
            SurfaceOutcome::Failed(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
