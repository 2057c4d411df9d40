//! In-memory map surface that the CLI prints after each sync.

use ucmap_core::overlay::BoundaryOverlay;
use ucmap_core::view::{
    cluster_markers, fit_viewport, Bounds, Cluster, LayerMode, MapSurface, MarkerLayer,
    ScreenSize, SurfaceError, Viewport,
};

#[derive(Debug, Clone)]
pub struct SnapshotSurface {
    layer: MarkerLayer,
    viewport: Viewport,
    overlay: Option<BoundaryOverlay>,
    screen: ScreenSize,
}

impl Default for SnapshotSurface {
    fn default() -> Self {
        Self::new(ScreenSize::default())
    }
}

impl SnapshotSurface {
    #[must_use]
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            layer: MarkerLayer::empty(LayerMode::Clustered),
            viewport: Viewport::default(),
            overlay: None,
            screen,
        }
    }

    pub fn layer(&self) -> &MarkerLayer {
        &self.layer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn overlay(&self) -> Option<&BoundaryOverlay> {
        self.overlay.as_ref()
    }

    /// Marker groups as drawn at the current zoom. In individual mode every
    /// marker is its own group.
    pub fn clusters(&self) -> Vec<Cluster> {
        match self.layer.mode {
            LayerMode::Clustered => cluster_markers(&self.layer.markers, self.viewport.zoom),
            LayerMode::Individual => self
                .layer
                .markers
                .iter()
                .enumerate()
                .map(|(idx, m)| Cluster {
                    center: (m.latitude, m.longitude),
                    members: vec![idx],
                })
                .collect(),
        }
    }
}

impl MapSurface for SnapshotSurface {
    fn replace_markers(&mut self, layer: MarkerLayer) -> Result<(), SurfaceError> {
        if let Some(bad) = layer
            .markers
            .iter()
            .find(|m| !m.latitude.is_finite() || !m.longitude.is_finite())
        {
            return Err(SurfaceError::LayerRejected(format!(
                "non-finite marker position for '{}'",
                bad.popup.title
            )));
        }
        self.layer = layer;
        Ok(())
    }

    fn clear_markers(&mut self) {
        self.layer.markers.clear();
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: [u32; 2]) -> Result<(), SurfaceError> {
        let viewport = fit_viewport(&bounds, padding, self.screen).ok_or_else(|| {
            SurfaceError::Viewport(format!(
                "padding {padding:?} leaves no drawable area on a {}x{} map",
                self.screen.width, self.screen.height
            ))
        })?;
        self.viewport = viewport;
        Ok(())
    }

    fn add_overlay(&mut self, overlay: BoundaryOverlay) -> Result<(), SurfaceError> {
        if overlay.is_empty() {
            return Err(SurfaceError::Overlay(
                "overlay has no drawable features".to_string(),
            ));
        }
        self.overlay = Some(overlay);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ucmap_core::view::viewport::INITIAL_ZOOM;
    use ucmap_core::view::{Marker, Popup, FIT_PADDING};

    use super::*;

    fn marker(lat: f64, lon: f64) -> Marker {
        Marker {
            latitude: lat,
            longitude: lon,
            color: "#1f77b4".to_string(),
            popup: Popup {
                title: "Loja".to_string(),
                network: "Novo Mix".to_string(),
                address: "N/A".to_string(),
                tax_id: "N/A".to_string(),
            },
        }
    }

    #[test]
    fn starts_empty_at_initial_view() {
        let surface = SnapshotSurface::default();
        assert!(surface.layer().markers.is_empty());
        assert_eq!(surface.viewport().zoom, INITIAL_ZOOM);
        assert!(surface.overlay().is_none());
    }

    #[test]
    fn fit_moves_viewport_to_bounds() {
        let mut surface = SnapshotSurface::default();
        let bounds = Bounds {
            south: -13.0,
            west: -38.6,
            north: -12.8,
            east: -38.3,
        };
        surface.fit_bounds(bounds, FIT_PADDING).unwrap();
        let (lat, lon) = surface.viewport().center;
        assert!((lat - -12.9).abs() < 1e-9);
        assert!((lon - -38.45).abs() < 1e-9);
    }

    #[test]
    fn fit_fails_when_padding_swallows_screen() {
        let mut surface = SnapshotSurface::new(ScreenSize {
            width: 60,
            height: 60,
        });
        let before = surface.viewport();
        let bounds = Bounds {
            south: -13.0,
            west: -38.6,
            north: -12.8,
            east: -38.3,
        };
        assert!(surface.fit_bounds(bounds, FIT_PADDING).is_err());
        assert_eq!(surface.viewport(), before);
    }

    #[test]
    fn rejected_layer_keeps_previous_markers() {
        let mut surface = SnapshotSurface::default();
        surface
            .replace_markers(MarkerLayer {
                mode: LayerMode::Individual,
                markers: vec![marker(-12.9, -38.4)],
            })
            .unwrap();

        let result = surface.replace_markers(MarkerLayer {
            mode: LayerMode::Individual,
            markers: vec![marker(f64::NAN, -38.4)],
        });

        assert!(result.is_err());
        assert_eq!(surface.layer().markers.len(), 1);
    }

    #[test]
    fn individual_mode_yields_one_group_per_marker() {
        let mut surface = SnapshotSurface::default();
        surface
            .replace_markers(MarkerLayer {
                mode: LayerMode::Individual,
                markers: vec![marker(-12.9, -38.4), marker(-12.9, -38.4)],
            })
            .unwrap();
        assert_eq!(surface.clusters().len(), 2);
    }

    #[test]
    fn clustered_mode_merges_coincident_markers() {
        let mut surface = SnapshotSurface::default();
        surface
            .replace_markers(MarkerLayer {
                mode: LayerMode::Clustered,
                markers: vec![marker(-12.9, -38.4), marker(-12.9, -38.4)],
            })
            .unwrap();
        let clusters = surface.clusters();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }
}
