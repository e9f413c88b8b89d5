//! Conversion between PDF space and top-left page coordinates.
//!
//! PDF user space has its origin at the bottom-left of the MediaBox with y
//! growing upward. Extracted words and blocks use a top-left origin with y
//! growing downward, measured from the MediaBox corner.

use textmap_core::BBox;

/// Page frame derived from `/MediaBox` and `/Rotate`.
///
/// Rotation is recorded but not applied: rotated pages are reported in
/// their unrotated MediaBox frame.
///
/// ```
/// use textmap_core::BBox;
/// use textmap_parse::page_geometry::PageGeometry;
///
/// let geo = PageGeometry::new([0.0, 0.0, 612.0, 792.0], 0);
/// assert_eq!(geo.width(), 612.0);
/// assert_eq!(geo.to_top_left(72.0, 720.0), (72.0, 72.0));
/// assert_eq!(
///     geo.to_pdf_rect(&BBox::new(72.0, 72.0, 100.0, 84.0)),
///     [72.0, 708.0, 100.0, 720.0]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    rotation: i32,
}

impl PageGeometry {
    /// Build from a raw `[llx, lly, urx, ury]` box. Corners given in any
    /// order are normalized.
    pub fn new(media_box: [f64; 4], rotation: i32) -> Self {
        let [ax, ay, bx, by] = media_box;
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
            rotation: rotation.rem_euclid(360),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// `/Rotate` normalized to `0..360`.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Map a PDF space point to top-left coordinates.
    pub fn to_top_left(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.x0, self.y1 - y)
    }

    /// Map a top-left box back to a PDF `[llx, lly, urx, ury]` rectangle.
    pub fn to_pdf_rect(&self, bbox: &BBox) -> [f64; 4] {
        [
            self.x0 + bbox.x0,
            self.y1 - bbox.bottom,
            self.x0 + bbox.x1,
            self.y1 - bbox.top,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_media_box() {
        let geo = PageGeometry::new([10.0, 20.0, 110.0, 220.0], 0);
        assert_eq!(geo.width(), 100.0);
        assert_eq!(geo.height(), 200.0);
        assert_eq!(geo.to_top_left(10.0, 220.0), (0.0, 0.0));
        assert_eq!(geo.to_top_left(110.0, 20.0), (100.0, 200.0));
    }

    #[test]
    fn round_trip_through_pdf_rect() {
        let geo = PageGeometry::new([10.0, 20.0, 110.0, 220.0], 0);
        let bbox = BBox::new(5.0, 30.0, 50.0, 45.0);
        let [llx, lly, urx, ury] = geo.to_pdf_rect(&bbox);
        let (x0, top) = geo.to_top_left(llx, ury);
        let (x1, bottom) = geo.to_top_left(urx, lly);
        assert_eq!(BBox::new(x0, top, x1, bottom), bbox);
    }

    #[test]
    fn inverted_media_box_is_normalized() {
        let geo = PageGeometry::new([612.0, 792.0, 0.0, 0.0], 0);
        assert_eq!(geo.width(), 612.0);
        assert_eq!(geo.height(), 792.0);
    }

    #[test]
    fn rotation_normalized_but_ignored() {
        let geo = PageGeometry::new([0.0, 0.0, 612.0, 792.0], -90);
        assert_eq!(geo.rotation(), 270);
        assert_eq!(geo.width(), 612.0);
    }
}
