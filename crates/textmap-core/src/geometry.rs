use crate::error::GeometryError;

/// Areas below this are treated as zero when computing coverage ratios.
pub const AREA_EPSILON: f64 = 1e-10;

/// Bounding box with top-left origin coordinate system.
///
/// Coordinates follow the extraction convention:
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
///
/// A box is valid when all four coordinates are finite, `x1 > x0` and
/// `bottom > top`. Construction does not enforce this; call
/// [`BBox::validate`] before relying on it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Check that the box has finite coordinates and positive extent.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if ![self.x0, self.top, self.x1, self.bottom]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(GeometryError::NonFinite(*self));
        }
        if self.x1 <= self.x0 || self.bottom <= self.top {
            return Err(GeometryError::Degenerate {
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    /// Area of the box. Degenerate, inverted or non-finite boxes have area `0.0`.
    pub fn area(&self) -> f64 {
        let area = self.width().max(0.0) * self.height().max(0.0);
        if area.is_finite() { area } else { 0.0 }
    }

    /// Overlapping region of two boxes, if it has positive extent on both axes.
    fn overlap_region(&self, other: &BBox) -> Option<BBox> {
        let x0 = self.x0.max(other.x0);
        let top = self.top.max(other.top);
        let x1 = self.x1.min(other.x1);
        let bottom = self.bottom.min(other.bottom);

        // NaN comparisons are false, so non-finite input falls through to None.
        if x0 < x1 && top < bottom {
            Some(BBox::new(x0, top, x1, bottom))
        } else {
            None
        }
    }

    /// Whether the two boxes share a region of positive area.
    ///
    /// Boxes that only touch along an edge or at a corner do not intersect.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.overlap_region(other).is_some()
    }

    /// Area of the overlapping region, `0.0` when the boxes do not intersect.
    pub fn intersection_area(&self, other: &BBox) -> f64 {
        self.overlap_region(other).map_or(0.0, |r| r.area())
    }

    /// Fraction of the smaller box's area covered by the overlap.
    ///
    /// `intersection_area / min(area_a, area_b)`, in `[0.0, 1.0]`. A value of
    /// `1.0` means the smaller box lies entirely inside the larger one.
    /// Returns `0.0` when the boxes do not intersect or when either area is
    /// below [`AREA_EPSILON`].
    pub fn coverage_ratio(&self, other: &BBox) -> f64 {
        let min_area = self.area().min(other.area());
        if min_area < AREA_EPSILON {
            return 0.0;
        }
        let Some(region) = self.overlap_region(other) else {
            return 0.0;
        };
        (region.area() / min_area).min(1.0)
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Whether the box lies inside a `width` x `height` page anchored at the origin.
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.x0 >= 0.0 && self.top >= 0.0 && self.x1 <= width && self.bottom <= height
    }

    /// The box as an `[x0, top, x1, bottom]` array.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x0, self.top, self.x1, self.bottom]
    }
}
