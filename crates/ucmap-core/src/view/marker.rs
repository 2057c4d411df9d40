use serde::Serialize;

use crate::palette::Palette;
use crate::unit::Unit;

/// Placeholder shown for any absent popup field.
pub const MISSING_FIELD: &str = "N/A";

/// Detail popup attached to a marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub network: String,
    pub address: String,
    pub tax_id: String,
}

impl Popup {
    #[must_use]
    pub fn for_unit(unit: &Unit) -> Self {
        fn or_missing(value: Option<&String>) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| MISSING_FIELD.to_string(), Clone::clone)
        }

        Self {
            title: or_missing(unit.name.as_ref()),
            network: or_missing(unit.network.as_ref()),
            address: or_missing(unit.original_address.as_ref()),
            tax_id: or_missing(unit.tax_id.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub color: String,
    pub popup: Popup,
}

impl Marker {
    /// Builds the marker for a unit, or `None` when it has no usable
    /// coordinates.
    #[must_use]
    pub fn for_unit(unit: &Unit, palette: &Palette) -> Option<Self> {
        let (latitude, longitude) = unit.coordinates()?;
        Some(Self {
            latitude,
            longitude,
            color: palette.color_for(unit.network.as_deref()).to_string(),
            popup: Popup::for_unit(unit),
        })
    }
}

/// How the marker layer is attached to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerMode {
    Clustered,
    Individual,
}

impl LayerMode {
    #[must_use]
    pub fn from_clustering(enabled: bool) -> Self {
        if enabled {
            LayerMode::Clustered
        } else {
            LayerMode::Individual
        }
    }
}

/// A fully built set of markers, swapped onto the surface in one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub mode: LayerMode,
    pub markers: Vec<Marker>,
}

impl MarkerLayer {
    #[must_use]
    pub fn empty(mode: LayerMode) -> Self {
        Self {
            mode,
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around(self.markers.iter().map(|m| (m.latitude, m.longitude)))
    }
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every point; `None` for an empty iterator.
    pub fn around<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (lat, lon)| {
            Some(match acc {
                None => Bounds {
                    south: lat,
                    west: lon,
                    north: lat,
                    east: lon,
                },
                Some(b) => Bounds {
                    south: b.south.min(lat),
                    west: b.west.min(lon),
                    north: b.north.max(lat),
                    east: b.east.max(lon),
                },
            })
        })
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.south, self.north),
            f64::midpoint(self.west, self.east),
        )
    }

    /// True when every point collapsed onto one coordinate.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_point(&self) -> bool {
        self.south == self.north && self.west == self.east
    }
}
