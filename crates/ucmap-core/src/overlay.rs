//! Administrative boundary overlay (state polygons) drawn under the markers.

use geojson::{GeoJson, Geometry};
use serde::Serialize;

use crate::CoreError;

/// Fixed translucent styling applied to every boundary feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayStyle {
    pub color: &'static str,
    pub weight: u8,
    pub fill_opacity: f64,
}

pub const BOUNDARY_STYLE: OverlayStyle = OverlayStyle {
    color: "#555",
    weight: 1,
    fill_opacity: 0.05,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFeature {
    /// `properties.name`, shown as the feature popup when present.
    pub popup: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryOverlay {
    pub style: OverlayStyle,
    pub features: Vec<OverlayFeature>,
}

impl BoundaryOverlay {
    /// Parses a GeoJSON `FeatureCollection`.
    ///
    /// Features without a geometry are dropped; anything else about a
    /// feature is taken as-is.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOverlay`] if the document is not valid
    /// GeoJSON or is some other GeoJSON object than a `FeatureCollection`.
    pub fn from_geojson(doc: &serde_json::Value) -> Result<Self, CoreError> {
        let collection = match GeoJson::from_json_value(doc.clone()) {
            Ok(GeoJson::FeatureCollection(collection)) => collection,
            Ok(_) => {
                return Err(CoreError::InvalidOverlay(
                    "expected a FeatureCollection".to_string(),
                ))
            }
            Err(e) => return Err(CoreError::InvalidOverlay(e.to_string())),
        };

        let features = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let popup = feature
                    .property("name")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string);
                Some(OverlayFeature {
                    popup,
                    geometry: feature.geometry?,
                })
            })
            .collect();

        Ok(Self {
            style: BOUNDARY_STYLE,
            features,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
