//! Image space to page space conversion.

use crate::ocr::Point;

/// A point in page space (origin bottom-left, y grows upward), in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

/// Converts OCR coordinates (top-left origin) to page coordinates
/// (bottom-left origin). The page uses one point per image pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    page_height: f32,
}

impl CoordinateMapper {
    /// Create a mapper for a page of the given height.
    pub fn new(page_height: f32) -> Self {
        Self { page_height }
    }

    /// Page height the mapper flips around.
    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    /// Map an image point to the page.
    pub fn map(&self, point: Point) -> PagePoint {
        map_point(point, self.page_height)
    }
}

/// `x' = x`, `y' = page_height - y`. Its own inverse for a fixed height.
pub fn map_point(point: Point, page_height: f32) -> PagePoint {
    PagePoint {
        x: point.x,
        y: page_height - point.y,
    }
}
