//! Typed bounding boxes with compile-time coordinate-space markers.
//!
//! Label rows arrive as normalized center/size fractions; the record schema
//! wants normalized min/max corners. The `TSpace` parameter (either
//! [`Pixel`] or [`Normalized`]) keeps the two coordinate systems from being
//! mixed up at compile time.

use std::fmt;
use std::marker::PhantomData;

/// Marker type for pixel coordinates (absolute values).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for normalized coordinates (0.0 to 1.0).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Pixel has no variants
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Normalized has no variants
    }
}

/// Lower clamp bound for emitted normalized coordinates.
///
/// The training pipeline rejects boxes that touch the exact image border,
/// so emitted coordinates sit just inside `[0, 1]`.
pub const CLAMP_MIN: f64 = 0.0001;

/// Upper clamp bound for emitted normalized coordinates.
pub const CLAMP_MAX: f64 = 0.9999;

/// An axis-aligned bounding box in XYXY format (xmin, ymin, xmax, ymax).
///
/// Construction does not enforce `min <= max`; a malformed input row is
/// representable, and callers decide whether to reject or clamp it.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    /// Creates a new bounding box from explicit corner coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    /// Creates a bounding box from center/size form.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        let half_w = w / 2.0;
        let half_h = h / 2.0;
        Self::from_xyxy(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    /// Returns the box in center/size form.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
            self.width(),
            self.height(),
        )
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Width of the box. May be negative if the box is malformed.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the box. May be negative if the box is malformed.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite()
            && self.ymin.is_finite()
            && self.xmax.is_finite()
            && self.ymax.is_finite()
    }

    /// Returns true if the box is properly ordered (min <= max on both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }
}

impl<TSpace> fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.xmin)
            .field("ymin", &self.ymin)
            .field("xmax", &self.xmax)
            .field("ymax", &self.ymax)
            .finish()
    }
}

impl BBoxXYXY<Normalized> {
    /// Clamps every coordinate into `[CLAMP_MIN, CLAMP_MAX]`.
    #[inline]
    pub fn clamped(&self) -> Self {
        Self::from_xyxy(
            self.xmin.clamp(CLAMP_MIN, CLAMP_MAX),
            self.ymin.clamp(CLAMP_MIN, CLAMP_MAX),
            self.xmax.clamp(CLAMP_MIN, CLAMP_MAX),
            self.ymax.clamp(CLAMP_MIN, CLAMP_MAX),
        )
    }

    /// Converts normalized coordinates to pixel coordinates.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_xyxy(
            self.xmin * image_width,
            self.ymin * image_height,
            self.xmax * image_width,
            self.ymax * image_height,
        )
    }
}

impl BBoxXYXY<Pixel> {
    /// Converts pixel coordinates to normalized coordinates.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_xyxy(
            self.xmin / image_width,
            self.ymin / image_height,
            self.xmax / image_width,
            self.ymax / image_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cxcywh_produces_corners() {
        let bbox: BBoxXYXY<Normalized> = BBoxXYXY::from_cxcywh(0.5, 0.5, 0.4, 0.2);
        assert!((bbox.xmin() - 0.3).abs() < 1e-12);
        assert!((bbox.ymin() - 0.4).abs() < 1e-12);
        assert!((bbox.xmax() - 0.7).abs() < 1e-12);
        assert!((bbox.ymax() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn cxcywh_roundtrip() {
        let bbox: BBoxXYXY<Normalized> = BBoxXYXY::from_cxcywh(0.25, 0.75, 0.1, 0.3);
        let (cx, cy, w, h) = bbox.to_cxcywh();
        assert!((cx - 0.25).abs() < 1e-12);
        assert!((cy - 0.75).abs() < 1e-12);
        assert!((w - 0.1).abs() < 1e-12);
        assert!((h - 0.3).abs() < 1e-12);
    }

    #[test]
    fn clamped_pulls_spill_inside_bounds() {
        // Box centered near the corner spills past both edges.
        let bbox = BBoxXYXY::<Normalized>::from_cxcywh(0.0, 1.0, 0.5, 0.5).clamped();
        assert_eq!(bbox.xmin(), CLAMP_MIN);
        assert_eq!(bbox.ymax(), CLAMP_MAX);
        assert!(bbox.is_ordered());
    }

    #[test]
    fn clamped_leaves_interior_boxes_alone() {
        let bbox = BBoxXYXY::<Normalized>::from_cxcywh(0.5, 0.5, 0.2, 0.2);
        let clamped = bbox.clamped();
        assert_eq!(bbox, clamped);
    }

    #[test]
    fn pixel_conversion() {
        let norm: BBoxXYXY<Normalized> = BBoxXYXY::from_xyxy(0.1, 0.2, 0.5, 0.8);
        let px = norm.to_pixel(200.0, 100.0);
        assert!((px.xmin() - 20.0).abs() < 1e-9);
        assert!((px.ymin() - 20.0).abs() < 1e-9);
        assert!((px.xmax() - 100.0).abs() < 1e-9);
        assert!((px.ymax() - 80.0).abs() < 1e-9);

        let back = px.to_normalized(200.0, 100.0);
        assert!((back.xmin() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn malformed_boxes_are_representable() {
        let bbox: BBoxXYXY<Normalized> = BBoxXYXY::from_xyxy(0.9, 0.9, 0.1, 0.1);
        assert!(!bbox.is_ordered());
        assert!(bbox.width() < 0.0);
    }
}
