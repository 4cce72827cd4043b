//! Resize geometry.

use serde::{Deserialize, Serialize};

/// How a resize maps the source onto the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPolicy {
    /// Preserve aspect ratio and fit within the box.
    Inside,
    /// Stretch to the exact box, ignoring aspect ratio.
    Fill,
}

/// A resize request against a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    pub policy: FitPolicy,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// When false the output never exceeds the source in either dimension.
    pub allow_enlarge: bool,
}

impl ResizeSpec {
    /// Whether no target dimension was given.
    pub fn is_noop(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Computes output dimensions for a source image under a resize spec.
///
/// A single supplied dimension derives the other from the source aspect
/// ratio under both policies. Results are never smaller than 1x1.
pub fn fit_dimensions(source_width: u32, source_height: u32, spec: &ResizeSpec) -> (u32, u32) {
    if source_width == 0 || source_height == 0 {
        return (source_width, source_height);
    }

    let sw = source_width as f64;
    let sh = source_height as f64;

    let (width, height) = match (spec.width, spec.height) {
        (None, None) => return (source_width, source_height),
        (Some(w), None) => (w as f64, sh * w as f64 / sw),
        (None, Some(h)) => (sw * h as f64 / sh, h as f64),
        (Some(w), Some(h)) => match spec.policy {
            FitPolicy::Fill => (w as f64, h as f64),
            FitPolicy::Inside => {
                let scale_x = w as f64 / sw;
                let scale_y = h as f64 / sh;
                if scale_x <= scale_y {
                    (w as f64, sh * scale_x)
                } else {
                    (sw * scale_y, h as f64)
                }
            }
        },
    };

    let mut out = (to_pixels(width), to_pixels(height));

    if !spec.allow_enlarge {
        match spec.policy {
            FitPolicy::Inside => {
                if out.0 > source_width || out.1 > source_height {
                    out = (source_width, source_height);
                }
            }
            FitPolicy::Fill => {
                out = (out.0.min(source_width), out.1.min(source_height));
            }
        }
    }

    out
}

fn to_pixels(value: f64) -> u32 {
    (value.round() as u32).max(1)
}
