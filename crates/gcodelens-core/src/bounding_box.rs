//! Axis-aligned bounding box accumulation

use serde::{Deserialize, Serialize};

/// A point in machine coordinates (X, Y, Z)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Running min/max extent on three axes
///
/// Starts empty (min = +inf, max = -inf on every axis) and only ever grows:
/// a min never increases and a max never decreases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// An empty box that any point will extend
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True until the first point is observed
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to include `point`
    pub fn extend(&mut self, point: Point3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Extent along X
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y
    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along Z
    pub fn height(&self) -> f64 {
        self.max.z - self.min.z
    }

    /// Width x depth x height, or 0 if any extent is not strictly positive
    pub fn volume(&self) -> f64 {
        let (w, d, h) = (self.width(), self.depth(), self.height());
        if w > 0.0 && d > 0.0 && h > 0.0 {
            w * d * h
        } else {
            0.0
        }
    }
}
