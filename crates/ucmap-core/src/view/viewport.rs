//! Viewport arithmetic for surfaces that do not bring their own map engine.
//!
//! Uses web-mercator tile math (256 px tiles) so zoom levels line up with
//! what a slippy-map client would pick for the same bounds.

use serde::Serialize;

use super::marker::Bounds;

pub const MAX_ZOOM: u8 = 18;
const TILE_SIZE: f64 = 256.0;

/// Where the session starts before any data arrives (central Salvador).
pub const INITIAL_CENTER: (f64, f64) = (-12.9777, -38.4764);
pub const INITIAL_ZOOM: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: (f64, f64),
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM,
        }
    }
}

/// Pixel size of the rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

/// Largest zoom at which `bounds` fits inside `screen` minus `padding` on
/// each side. Returns `None` when the padding leaves no drawable area.
#[must_use]
pub fn fit_viewport(bounds: &Bounds, padding: [u32; 2], screen: ScreenSize) -> Option<Viewport> {
    let usable_w = f64::from(screen.width) - 2.0 * f64::from(padding[0]);
    let usable_h = f64::from(screen.height) - 2.0 * f64::from(padding[1]);
    if usable_w <= 0.0 || usable_h <= 0.0 {
        return None;
    }

    let center = bounds.center();
    if bounds.is_point() {
        return Some(Viewport {
            center,
            zoom: MAX_ZOOM,
        });
    }

    // World size in pixels at zoom z is TILE_SIZE * 2^z.
    let x_span = (bounds.east - bounds.west) / 360.0;
    let y_span = (mercator_y(bounds.north) - mercator_y(bounds.south)).abs();

    let zoom_for = |usable: f64, span: f64| -> f64 {
        if span <= f64::EPSILON {
            f64::from(MAX_ZOOM)
        } else {
            (usable / (TILE_SIZE * span)).log2()
        }
    };

    let zoom = zoom_for(usable_w, x_span)
        .min(zoom_for(usable_h, y_span))
        .floor()
        .clamp(0.0, f64::from(MAX_ZOOM));

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let zoom = zoom as u8;

    Some(Viewport { center, zoom })
}

/// Normalized mercator y in `[0, 1]` for a latitude in degrees.
fn mercator_y(lat: f64) -> f64 {
    let clamped = lat.clamp(-85.051_128, 85.051_128).to_radians();
    (1.0 - (clamped.tan() + 1.0 / clamped.cos()).ln() / std::f64::consts::PI) / 2.0
}
