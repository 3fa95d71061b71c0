use serde::{Deserialize, Serialize};

/// Pan/zoom transform saved alongside a layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

/// Acceptance bounds for restored viewports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBounds {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_abs_translate: f64,
}

impl Default for ViewportBounds {
    fn default() -> Self {
        Self {
            min_zoom: 0.025,
            max_zoom: 6.0,
            max_abs_translate: 1_000_000.0,
        }
    }
}

/// Validate a restored viewport.
///
/// Non-finite fields reject it outright, the zoom is clamped into the bounds,
/// and translations at or beyond the absolute cap reject it (a clamped pan
/// would silently show a different part of the graph, so it is treated as
/// absent instead).
pub fn sanitize_viewport(viewport: Viewport, bounds: &ViewportBounds) -> Option<Viewport> {
    if !viewport.x.is_finite() || !viewport.y.is_finite() || !viewport.zoom.is_finite() {
        return None;
    }
    if viewport.x.abs() >= bounds.max_abs_translate || viewport.y.abs() >= bounds.max_abs_translate {
        return None;
    }
    Some(Viewport {
        x: viewport.x,
        y: viewport.y,
        zoom: viewport.zoom.clamp(bounds.min_zoom, bounds.max_zoom),
    })
}
