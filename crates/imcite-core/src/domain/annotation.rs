//! PDF highlight annotations stored on a paper

use serde::{Deserialize, Serialize};

/// A rectangle on a PDF page, in unscaled PDF coordinates
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A highlight on a PDF page. Multi-line highlights carry one rect per line.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub page: u32,
    pub rects: Vec<Rect>,
    /// Hex color, e.g. `#f59e0b`
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
